use depgraph_core::{GraphDirection, GraphProperty, NodeIdentity};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// A graph query issued by the host for a batch of input nodes.
pub trait GraphContext {
    type Node: NodeIdentity;

    fn input_nodes(&self) -> &[Self::Node];

    fn cancel_token(&self) -> &CancellationToken;

    fn direction(&self) -> GraphDirection;

    fn requested_properties(&self) -> &[GraphProperty];

    fn requests_property(&self, property: GraphProperty) -> bool {
        self.requested_properties().contains(&property)
    }
}

/// Plain node identifier with the three components a host may supply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNodeId {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_id: Option<String>,
}

impl GraphNodeId {
    /// Identifier of a top-level dependency node, addressed by its full path.
    pub fn top_level(project: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            project: Some(project.into()),
            file: Some(file.into()),
            dependency_id: None,
        }
    }

    /// Identifier of a nested dependency node, addressed by an explicit id.
    pub fn nested(project: impl Into<String>, dependency_id: impl Into<String>) -> Self {
        Self {
            project: Some(project.into()),
            file: None,
            dependency_id: Some(dependency_id.into()),
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

impl NodeIdentity for GraphNodeId {
    fn project_path(&self) -> Option<&str> {
        self.project.as_deref()
    }

    fn file_path(&self) -> Option<&str> {
        self.file.as_deref()
    }

    fn dependency_id(&self) -> Option<&str> {
        self.dependency_id.as_deref()
    }
}

/// Owned [`GraphContext`] used by the CLI and tests.
#[derive(Debug, Clone, Default)]
pub struct GraphRequest<N = GraphNodeId> {
    nodes: Vec<N>,
    direction: GraphDirection,
    properties: Vec<GraphProperty>,
    cancel: CancellationToken,
}

impl<N: NodeIdentity> GraphRequest<N> {
    pub fn new(direction: GraphDirection, nodes: Vec<N>) -> Self {
        Self {
            nodes,
            direction,
            properties: Vec::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_property(mut self, property: GraphProperty) -> Self {
        if !self.properties.contains(&property) {
            self.properties.push(property);
        }
        self
    }

    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }
}

impl<N: NodeIdentity> GraphContext for GraphRequest<N> {
    type Node = N;

    fn input_nodes(&self) -> &[N] {
        &self.nodes
    }

    fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    fn direction(&self) -> GraphDirection {
        self.direction
    }

    fn requested_properties(&self) -> &[GraphProperty] {
        &self.properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_components_are_optional() {
        let node: GraphNodeId =
            serde_json::from_str(r#"{ "project": "/app/app.csproj", "dependency_id": "pkg:1.0" }"#)
                .unwrap();
        assert_eq!(node.project_path(), Some("/app/app.csproj"));
        assert_eq!(node.file_path(), None);
        assert_eq!(node.dependency_id(), Some("pkg:1.0"));

        let json = serde_json::to_string(&GraphNodeId::top_level("/a.csproj", "/Foo.dll")).unwrap();
        assert_eq!(json, r#"{"project":"/a.csproj","file":"/Foo.dll"}"#);
    }

    #[test]
    fn request_reports_properties_and_cancellation() {
        let token = CancellationToken::new();
        let request = GraphRequest::new(GraphDirection::Self_, vec![GraphNodeId::default()])
            .with_property(GraphProperty::ContainsChildren)
            .with_property(GraphProperty::ContainsChildren)
            .with_cancel_token(token.clone());

        assert_eq!(request.requested_properties(), &[GraphProperty::ContainsChildren]);
        assert!(request.requests_property(GraphProperty::ContainsChildren));
        assert!(!request.requests_property(GraphProperty::Resolved));

        assert!(!request.cancel_token().is_cancelled());
        token.cancel();
        assert!(request.cancel_token().is_cancelled());
    }
}
