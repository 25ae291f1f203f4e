use depgraph_core::{
    Dependency, NodeIdentity, ProjectKey, ResolverConfig, Snapshot, SnapshotStore,
};
use std::sync::Arc;
use tracing::trace;

/// A dependency together with the snapshot instance it was found in.
///
/// A dependency is only meaningful relative to the snapshot that produced it,
/// so the two always travel together.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub dependency: Arc<Dependency>,
    pub snapshot: Arc<Snapshot>,
}

/// Maps host node identifiers to dependencies in the current project snapshots.
///
/// Resolution never fails loudly: every unresolvable identifier yields `None`.
pub struct IdentifierResolver<S> {
    store: S,
    config: ResolverConfig,
}

impl<S: SnapshotStore> IdentifierResolver<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, ResolverConfig::default())
    }

    pub fn with_config(store: S, config: ResolverConfig) -> Self {
        Self { store, config }
    }

    pub fn resolve<N: NodeIdentity + ?Sized>(&self, node: &N) -> Option<Resolved> {
        let project = ProjectKey::parse(node.project_path())?;
        self.resolve_in_project(node, &project)
    }

    /// Resolve `node` against the snapshot of an already extracted project key.
    pub fn resolve_in_project<N: NodeIdentity + ?Sized>(
        &self,
        node: &N,
        project: &ProjectKey,
    ) -> Option<Resolved> {
        let Some(directory) = project_directory(project.as_str(), &self.config) else {
            trace!(project = %project, "project path has no containing directory");
            return None;
        };

        let (id, top_level) = match node.dependency_id() {
            Some(id) => (id, false),
            None => {
                // Top-level nodes carry the full path instead of an id
                let Some(file) = node.file_path() else {
                    trace!(project = %project, "node has neither dependency id nor file path");
                    return None;
                };
                (relative_dependency_id(file, directory, &self.config), true)
            }
        };

        let Some(snapshot) = self
            .store
            .snapshot_provider(project)
            .and_then(|provider| provider.current_snapshot())
        else {
            trace!(project = %project, "no snapshot for project");
            return None;
        };

        let dependency = match snapshot.find_dependency(id, top_level) {
            Some(dependency) => Arc::clone(dependency),
            None => {
                trace!(project = %project, id, top_level, version = snapshot.version(), "dependency not in snapshot");
                return None;
            }
        };

        Some(Resolved {
            dependency,
            snapshot,
        })
    }
}

/// Directory containing the project file.
///
/// `None` for a bare root such as `C:\` or `/`. A path without any separator
/// lives in the empty directory.
pub fn project_directory<'a>(path: &'a str, config: &ResolverConfig) -> Option<&'a str> {
    let Some((index, separator)) = path
        .char_indices()
        .rev()
        .find(|(_, c)| config.is_separator(*c))
    else {
        return Some("");
    };

    let parent = &path[..index];
    if is_root(parent) {
        let file_name = &path[index + separator.len_utf8()..];
        if file_name.is_empty() {
            return None;
        }
        return Some(&path[..index + separator.len_utf8()]);
    }

    Some(parent)
}

fn is_root(parent: &str) -> bool {
    let bytes = parent.as_bytes();
    parent.is_empty() || (bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':')
}

/// Id of a top-level dependency: its file path relative to the project
/// directory, or the path unchanged when it lies elsewhere.
pub fn relative_dependency_id<'a>(
    file_path: &'a str,
    directory: &str,
    config: &ResolverConfig,
) -> &'a str {
    match strip_path_prefix(file_path, directory, config.case_insensitive_paths) {
        Some(rest) => rest.trim_start_matches(|c| config.is_separator(c)),
        None => file_path,
    }
}

fn strip_path_prefix<'a>(path: &'a str, prefix: &str, ignore_case: bool) -> Option<&'a str> {
    if !ignore_case {
        return path.strip_prefix(prefix);
    }

    let mut chars = path.char_indices();
    for expected in prefix.chars() {
        let (_, actual) = chars.next()?;
        if !chars_eq_ignore_case(expected, actual) {
            return None;
        }
    }

    let offset = chars.next().map_or(path.len(), |(index, _)| index);
    Some(&path[offset..])
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ResolverConfig {
        ResolverConfig::default()
    }

    #[test]
    fn directory_of_windows_project() {
        let c = config();
        assert_eq!(project_directory(r"C:\src\App\App.csproj", &c), Some(r"C:\src\App"));
        assert_eq!(project_directory(r"C:\App.csproj", &c), Some(r"C:\"));
        assert_eq!(project_directory(r"C:\", &c), None);
    }

    #[test]
    fn directory_of_unix_project() {
        let c = config();
        assert_eq!(project_directory("/src/app/app.csproj", &c), Some("/src/app"));
        assert_eq!(project_directory("/app.csproj", &c), Some("/"));
        assert_eq!(project_directory("/", &c), None);
        assert_eq!(project_directory("app.csproj", &c), Some(""));
    }

    #[test]
    fn strips_directory_and_separators_ignoring_case() {
        let c = config();
        assert_eq!(
            relative_dependency_id(r"c:\SRC\app\Foo.dll", r"C:\src\App", &c),
            "Foo.dll"
        );
        assert_eq!(
            relative_dependency_id(r"C:\src\App\\\lib\Bar.dll", r"C:\src\App", &c),
            r"lib\Bar.dll"
        );
        assert_eq!(relative_dependency_id(r"\\Foo.dll", "", &c), "Foo.dll");
    }

    #[test]
    fn foreign_paths_are_kept() {
        let c = config();
        assert_eq!(
            relative_dependency_id(r"D:\other\Foo.dll", r"C:\src\App", &c),
            r"D:\other\Foo.dll"
        );
        assert_eq!(relative_dependency_id(r"C:\src", r"C:\src\App", &c), r"C:\src");
    }

    #[test]
    fn case_sensitive_comparison_when_configured() {
        let c = ResolverConfig {
            case_insensitive_paths: false,
            ..ResolverConfig::default()
        };
        assert_eq!(
            relative_dependency_id(r"c:\src\app\Foo.dll", r"C:\src\App", &c),
            r"c:\src\app\Foo.dll"
        );
        assert_eq!(
            relative_dependency_id(r"C:\src\App\Foo.dll", r"C:\src\App", &c),
            "Foo.dll"
        );
    }

    #[test]
    fn only_configured_separators_are_trimmed() {
        let c = ResolverConfig {
            path_separators: vec!['\\'],
            ..ResolverConfig::default()
        };
        assert_eq!(project_directory("/src/app/app.csproj", &c), Some(""));
        assert_eq!(
            relative_dependency_id(r"C:\App\/Foo.dll", r"C:\App", &c),
            "/Foo.dll"
        );
    }

    #[test]
    fn non_ascii_prefix_compares_per_character() {
        let c = config();
        assert_eq!(
            relative_dependency_id("/Users/ÄNNE/app/Lib.dll", "/users/änne/app", &c),
            "Lib.dll"
        );
    }
}
