use crate::DependencyKind;
use serde::{Deserialize, Serialize};

/// A node in a project's dependency tree.
///
/// Top-level dependencies are addressed by their path relative to the project
/// directory; nested ones by an explicit id. The pair `(id, top_level)` is
/// unique within a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub id: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub kind: DependencyKind,
    #[serde(default)]
    pub top_level: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default = "default_resolved")]
    pub resolved: bool,
    #[serde(default)]
    pub implicit: bool,
    /// Ids of nested dependencies reachable from this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependency_ids: Vec<String>,
}

fn default_resolved() -> bool {
    true
}

impl Dependency {
    pub fn top_level(id: impl Into<String>, kind: DependencyKind) -> Self {
        Self::new(id.into(), kind, true)
    }

    pub fn nested(id: impl Into<String>, kind: DependencyKind) -> Self {
        Self::new(id.into(), kind, false)
    }

    fn new(id: String, kind: DependencyKind, top_level: bool) -> Self {
        Self {
            caption: id.clone(),
            id,
            kind,
            top_level,
            path: None,
            resolved: true,
            implicit: false,
            dependency_ids: Vec::new(),
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_resolved(mut self, resolved: bool) -> Self {
        self.resolved = resolved;
        self
    }

    pub fn with_implicit(mut self, implicit: bool) -> Self {
        self.implicit = implicit;
        self
    }

    pub fn with_children<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependency_ids.extend(ids.into_iter().map(Into::into));
        self
    }
}
