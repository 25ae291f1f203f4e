use crate::{Dependency, ProjectKey, Snapshot};
use std::sync::Arc;

/// Read-only view of a host graph node identifier.
///
/// Each component may be absent independently of the others.
pub trait NodeIdentity {
    /// Path of the project file that owns the node.
    fn project_path(&self) -> Option<&str>;

    /// Full file path of the node, present on top-level dependency nodes.
    fn file_path(&self) -> Option<&str>;

    /// Explicit dependency id property, present on nested dependency nodes.
    fn dependency_id(&self) -> Option<&str>;
}

impl<T: NodeIdentity + ?Sized> NodeIdentity for &T {
    fn project_path(&self) -> Option<&str> {
        (**self).project_path()
    }

    fn file_path(&self) -> Option<&str> {
        (**self).file_path()
    }

    fn dependency_id(&self) -> Option<&str> {
        (**self).dependency_id()
    }
}

pub trait SnapshotProvider: Send + Sync {
    fn current_snapshot(&self) -> Option<Arc<Snapshot>>;
}

pub trait SnapshotStore: Send + Sync {
    fn snapshot_provider(&self, project: &ProjectKey) -> Option<Arc<dyn SnapshotProvider>>;
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for Arc<S> {
    fn snapshot_provider(&self, project: &ProjectKey) -> Option<Arc<dyn SnapshotProvider>> {
        (**self).snapshot_provider(project)
    }
}

/// Kind-specific strategy deciding how a dependency is shown in the graph.
pub trait ViewProvider: Send + Sync {
    fn name(&self) -> &str;

    fn has_children(&self, dependency: &Dependency, snapshot: &Snapshot) -> bool;

    fn children(&self, dependency: &Dependency, snapshot: &Snapshot) -> Vec<Arc<Dependency>>;
}
