use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use depgraph_core::{
    ConfigManager, DepGraphConfig, GraphDirection, GraphProperty, LoggingConfig, Snapshot,
};
use depgraph_graph::{
    BatchExecutor, CheckChildrenAction, GetChildrenAction, GraphNodeId, GraphRequest,
    IdentifierResolver, InMemorySnapshotStore, InputNodeAction, ViewProviderRegistry,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "depgraph")]
#[command(about = "DepGraph CLI - resolve dependency graph nodes against project snapshots", long_about = None)]
#[command(version)]
struct Cli {
    /// Output format (json, pretty)
    #[arg(short, long, global = true, default_value = "pretty")]
    output: OutputFormat,

    /// Configuration file (defaults to .depgraph.toml discovery)
    #[arg(long, global = true, env = "DEPGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a node to its dependency
    Resolve(NodeArgs),

    /// List the children of a node
    Children(NodeArgs),

    /// Report whether a node has children
    Check(NodeArgs),
}

#[derive(Args)]
struct NodeArgs {
    /// Snapshot documents (JSON) to load into the store
    #[arg(short, long = "snapshot", required = true)]
    snapshots: Vec<PathBuf>,

    /// Project file path of the node
    #[arg(short, long)]
    project: String,

    /// Full file path of a top-level dependency node
    #[arg(short, long)]
    file: Option<String>,

    /// Explicit id of a nested dependency node
    #[arg(long)]
    id: Option<String>,
}

impl NodeArgs {
    fn node(&self) -> GraphNodeId {
        GraphNodeId {
            project: Some(self.project.clone()),
            file: self.file.clone(),
            dependency_id: self.id.clone(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let manager = match &cli.config {
        Some(path) => ConfigManager::from_file(path),
        None => ConfigManager::load(),
    }
    .context("Failed to load configuration")?;
    let config = manager.into_config();

    init_logging(&config.logging, cli.verbose);

    match execute_command(&cli.command, &config) {
        Ok(output) => {
            print_output(&cli.output, &output)?;
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn init_logging(logging: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        "compact" => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init(),
        _ => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .init(),
    }
}

fn execute_command(command: &Commands, config: &DepGraphConfig) -> Result<serde_json::Value> {
    match command {
        Commands::Resolve(args) => execute_resolve(args, config),
        Commands::Children(args) => {
            let action = GetChildrenAction::new();
            let request = GraphRequest::new(GraphDirection::Contains, vec![args.node()]);
            let changed = run_action(args, config, &request, &action)?;
            Ok(json!({
                "changed": changed,
                "updates": action.drain_updates(),
            }))
        }
        Commands::Check(args) => {
            let action = CheckChildrenAction::new();
            let request = GraphRequest::new(GraphDirection::Self_, vec![args.node()])
                .with_property(GraphProperty::ContainsChildren)
                .with_property(GraphProperty::DependencyId)
                .with_property(GraphProperty::Resolved);
            let changed = run_action(args, config, &request, &action)?;
            Ok(json!({
                "changed": changed,
                "updates": action.drain_updates(),
            }))
        }
    }
}

fn load_store(paths: &[PathBuf]) -> Result<Arc<InMemorySnapshotStore>> {
    let store = Arc::new(InMemorySnapshotStore::new());
    for path in paths {
        let snapshot = Snapshot::from_file(path)
            .with_context(|| format!("Failed to load snapshot {}", path.display()))?;
        debug!(
            path = %path.display(),
            project = %snapshot.project(),
            version = snapshot.version(),
            dependencies = snapshot.len(),
            "loaded snapshot"
        );
        if !store.publish(snapshot) {
            warn!(path = %path.display(), "snapshot superseded by a newer version");
        }
    }
    Ok(store)
}

fn build_executor(
    args: &NodeArgs,
    config: &DepGraphConfig,
) -> Result<BatchExecutor<Arc<InMemorySnapshotStore>>> {
    let store = load_store(&args.snapshots)?;
    Ok(BatchExecutor::new(
        IdentifierResolver::with_config(store, config.resolver.clone()),
        Arc::new(ViewProviderRegistry::with_default_providers()),
    ))
}

fn execute_resolve(args: &NodeArgs, config: &DepGraphConfig) -> Result<serde_json::Value> {
    let executor = build_executor(args, config)?;

    let Some(resolved) = executor.resolver().resolve(&args.node()) else {
        return Ok(json!({ "found": false }));
    };

    let provider = executor
        .registry()
        .select(&resolved.dependency)
        .map(|provider| provider.name().to_string());

    Ok(json!({
        "found": true,
        "project": resolved.snapshot.project(),
        "snapshot_version": resolved.snapshot.version(),
        "provider": provider,
        "dependency": resolved.dependency.as_ref(),
    }))
}

fn run_action<A>(
    args: &NodeArgs,
    config: &DepGraphConfig,
    request: &GraphRequest,
    action: &A,
) -> Result<bool>
where
    A: InputNodeAction<GraphRequest>,
{
    build_executor(args, config)?
        .execute(request, action)
        .context("Failed to process graph query")
}

fn print_output(format: &OutputFormat, value: &serde_json::Value) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        OutputFormat::Pretty => {
            print_pretty(value)?;
        }
    }
    Ok(())
}

fn print_pretty(value: &serde_json::Value) -> Result<()> {
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map {
                let key_colored = key.cyan().bold();
                match val {
                    serde_json::Value::String(s) => {
                        println!("{}: {}", key_colored, s.green());
                    }
                    serde_json::Value::Number(n) => {
                        println!("{}: {}", key_colored, n.to_string().yellow());
                    }
                    serde_json::Value::Bool(b) => {
                        let val_colored = if *b { "true".green() } else { "false".red() };
                        println!("{}: {}", key_colored, val_colored);
                    }
                    serde_json::Value::Null => {
                        println!("{}: {}", key_colored, "none".dimmed());
                    }
                    _ => {
                        println!("{}: {}", key_colored, serde_json::to_string_pretty(val)?);
                    }
                }
            }
        }
        serde_json::Value::Array(arr) => {
            for (i, item) in arr.iter().enumerate() {
                println!("\n{}{}:", "Item ".cyan(), (i + 1).to_string().yellow());
                print_pretty(item)?;
            }
        }
        _ => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
    }
    Ok(())
}
