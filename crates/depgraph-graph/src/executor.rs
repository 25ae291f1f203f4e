use crate::{
    GraphContext, GraphTransactions, IdentifierResolver, NoopTransactions, Resolved,
    TransactionScope, ViewProviderRegistry,
};
use depgraph_core::{
    Dependency, NodeIdentity, ProjectKey, Result, Snapshot, SnapshotStore, ViewProvider,
};
use std::sync::Arc;
use tracing::debug;

/// Everything the executor learned about one input node.
pub struct NodeRequest<'a, N> {
    pub node: &'a N,
    pub dependency: &'a Arc<Dependency>,
    pub snapshot: &'a Arc<Snapshot>,
    pub view_provider: &'a Arc<dyn ViewProvider>,
    pub project: &'a ProjectKey,
}

/// Per-node action applied by [`BatchExecutor`].
pub trait InputNodeAction<C: GraphContext> {
    /// Whether this action applies to the query at all.
    fn can_handle(&self, context: &C) -> bool;

    /// Process one resolved node. Set `changed` when the host should keep
    /// observing updates for this query.
    fn process_input_node(
        &self,
        context: &C,
        request: NodeRequest<'_, C::Node>,
        changed: &mut bool,
    ) -> Result<()>;
}

/// Runs an [`InputNodeAction`] over every resolvable input node of a query.
///
/// Unresolvable nodes and nodes without a view provider are skipped. The
/// first action error aborts the batch.
pub struct BatchExecutor<S> {
    resolver: IdentifierResolver<S>,
    registry: Arc<ViewProviderRegistry>,
    transactions: Arc<dyn GraphTransactions>,
}

impl<S: SnapshotStore> BatchExecutor<S> {
    pub fn new(resolver: IdentifierResolver<S>, registry: Arc<ViewProviderRegistry>) -> Self {
        Self {
            resolver,
            registry,
            transactions: Arc::new(NoopTransactions),
        }
    }

    pub fn with_transactions(mut self, transactions: Arc<dyn GraphTransactions>) -> Self {
        self.transactions = transactions;
        self
    }

    pub fn resolver(&self) -> &IdentifierResolver<S> {
        &self.resolver
    }

    pub fn registry(&self) -> &ViewProviderRegistry {
        &self.registry
    }

    pub fn execute<C, A>(&self, context: &C, action: &A) -> Result<bool>
    where
        C: GraphContext,
        A: InputNodeAction<C> + ?Sized,
    {
        if !action.can_handle(context) {
            return Ok(false);
        }

        let mut changed = false;
        let cancel = context.cancel_token();

        for (index, node) in context.input_nodes().iter().enumerate() {
            if cancel.is_cancelled() {
                debug!(processed = index, changed, "graph query cancelled");
                return Ok(changed);
            }

            let Some(project) = ProjectKey::parse(node.project_path()) else {
                debug!(index, "skipping node without project path");
                continue;
            };

            let Some(Resolved {
                dependency,
                snapshot,
            }) = self.resolver.resolve_in_project(node, &project)
            else {
                debug!(index, project = %project, "skipping unresolved node");
                continue;
            };

            let Some(view_provider) = self.registry.select(&dependency) else {
                debug!(index, kind = %dependency.kind, id = %dependency.id, "no view provider for dependency kind");
                continue;
            };

            let scope = TransactionScope::begin(self.transactions.as_ref());
            action.process_input_node(
                context,
                NodeRequest {
                    node,
                    dependency: &dependency,
                    snapshot: &snapshot,
                    view_provider: &view_provider,
                    project: &project,
                },
                &mut changed,
            )?;
            scope.complete();
        }

        Ok(changed)
    }
}

/// A handler the host can offer a graph query to.
pub trait GraphActionHandler<C: GraphContext> {
    /// Handle the query if applicable. Returns whether the host should keep
    /// tracking changes for it.
    fn try_handle_request(&self, context: &C) -> Result<bool>;
}

/// Pairs an [`InputNodeAction`] with a shared executor.
pub struct InputNodeHandler<S, A> {
    executor: Arc<BatchExecutor<S>>,
    action: A,
}

impl<S, A> InputNodeHandler<S, A> {
    pub fn new(executor: Arc<BatchExecutor<S>>, action: A) -> Self {
        Self { executor, action }
    }

    pub fn action(&self) -> &A {
        &self.action
    }
}

impl<C, S, A> GraphActionHandler<C> for InputNodeHandler<S, A>
where
    C: GraphContext,
    S: SnapshotStore,
    A: InputNodeAction<C>,
{
    fn try_handle_request(&self, context: &C) -> Result<bool> {
        self.executor.execute(context, &self.action)
    }
}
