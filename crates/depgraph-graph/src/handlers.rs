use crate::{GraphActionHandler, GraphContext, InputNodeAction, NodeRequest};
use depgraph_core::{Dependency, GraphDirection, GraphProperty, ProjectKey, Result};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

/// Change to the host graph produced by an action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GraphUpdate {
    /// Attributes to set on an input node. Optional attributes are only
    /// present when the query requested them.
    Attributes {
        project: ProjectKey,
        #[serde(skip_serializing_if = "Option::is_none")]
        dependency_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        resolved: Option<bool>,
        contains_children: bool,
    },
    /// Children to attach below an input node.
    Children {
        project: ProjectKey,
        parent_id: String,
        snapshot_version: u64,
        provider: String,
        children: Vec<Dependency>,
    },
}

#[derive(Debug, Default)]
struct UpdateBuffer {
    updates: Mutex<Vec<GraphUpdate>>,
}

impl UpdateBuffer {
    fn push(&self, update: GraphUpdate) {
        self.updates.lock().push(update);
    }

    fn drain(&self) -> Vec<GraphUpdate> {
        std::mem::take(&mut *self.updates.lock())
    }
}

/// Answers "does this node have children?" queries, filling in the
/// dependency id and resolved state as well when those are requested.
#[derive(Debug, Default)]
pub struct CheckChildrenAction {
    buffer: UpdateBuffer,
}

impl CheckChildrenAction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain_updates(&self) -> Vec<GraphUpdate> {
        self.buffer.drain()
    }
}

impl<C: GraphContext> InputNodeAction<C> for CheckChildrenAction {
    fn can_handle(&self, context: &C) -> bool {
        context.direction() == GraphDirection::Self_
            && context.requests_property(GraphProperty::ContainsChildren)
    }

    fn process_input_node(
        &self,
        context: &C,
        request: NodeRequest<'_, C::Node>,
        _changed: &mut bool,
    ) -> Result<()> {
        let contains_children = request
            .view_provider
            .has_children(request.dependency, request.snapshot);

        let dependency_id = context
            .requests_property(GraphProperty::DependencyId)
            .then(|| request.dependency.id.clone());
        let resolved = context
            .requests_property(GraphProperty::Resolved)
            .then_some(request.dependency.resolved);

        self.buffer.push(GraphUpdate::Attributes {
            project: request.project.clone(),
            dependency_id,
            resolved,
            contains_children,
        });
        Ok(())
    }
}

/// Expands input nodes into their children.
///
/// Children depend on the snapshot, so every expansion asks the host to keep
/// tracking the query.
#[derive(Debug, Default)]
pub struct GetChildrenAction {
    buffer: UpdateBuffer,
}

impl GetChildrenAction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain_updates(&self) -> Vec<GraphUpdate> {
        self.buffer.drain()
    }
}

impl<C: GraphContext> InputNodeAction<C> for GetChildrenAction {
    fn can_handle(&self, context: &C) -> bool {
        context.direction() == GraphDirection::Contains
    }

    fn process_input_node(
        &self,
        _context: &C,
        request: NodeRequest<'_, C::Node>,
        changed: &mut bool,
    ) -> Result<()> {
        let children = request
            .view_provider
            .children(request.dependency, request.snapshot)
            .into_iter()
            .map(|child| child.as_ref().clone())
            .collect();

        self.buffer.push(GraphUpdate::Children {
            project: request.project.clone(),
            parent_id: request.dependency.id.clone(),
            snapshot_version: request.snapshot.version(),
            provider: request.view_provider.name().to_string(),
            children,
        });
        *changed = true;
        Ok(())
    }
}

/// Offers a query to every registered handler in order.
pub struct ActionDispatcher<C> {
    handlers: Vec<Arc<dyn GraphActionHandler<C> + Send + Sync>>,
}

impl<C> Default for ActionDispatcher<C> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }
}

impl<C: GraphContext> ActionDispatcher<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn GraphActionHandler<C> + Send + Sync>) {
        self.handlers.push(handler);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Returns whether any handler asked to keep tracking the query.
    pub fn dispatch(&self, context: &C) -> Result<bool> {
        let mut track_changes = false;
        for handler in &self.handlers {
            track_changes |= handler.try_handle_request(context)?;
        }
        Ok(track_changes)
    }
}
