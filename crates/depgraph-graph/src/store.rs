use arc_swap::ArcSwapOption;
use dashmap::DashMap;
use depgraph_core::{ProjectKey, Snapshot, SnapshotProvider, SnapshotStore};
use std::sync::Arc;
use tracing::{debug, warn};

/// Holds the current snapshot of one project.
///
/// Readers load the snapshot pointer without locking; writers replace it
/// wholesale, so a reader sees either the old or the new snapshot.
#[derive(Debug)]
pub struct ProjectSnapshotProvider {
    project: ProjectKey,
    current: ArcSwapOption<Snapshot>,
}

impl ProjectSnapshotProvider {
    pub fn new(project: ProjectKey) -> Self {
        Self {
            project,
            current: ArcSwapOption::empty(),
        }
    }

    pub fn project(&self) -> &ProjectKey {
        &self.project
    }

    /// Replace the current snapshot unless `snapshot` is not newer.
    pub fn publish(&self, snapshot: Arc<Snapshot>) -> bool {
        let version = snapshot.version();
        let mut accepted = false;

        // RCU-style update: retry on contention
        self.current.rcu(|current| match current {
            Some(existing) if existing.version() >= version => {
                accepted = false;
                Some(Arc::clone(existing))
            }
            _ => {
                accepted = true;
                Some(Arc::clone(&snapshot))
            }
        });

        accepted
    }
}

impl SnapshotProvider for ProjectSnapshotProvider {
    fn current_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.current.load_full()
    }
}

/// In-memory snapshot store keyed by project path.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    providers: DashMap<ProjectKey, Arc<ProjectSnapshotProvider>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a snapshot for its project. Returns `false` when a snapshot with
    /// the same or a newer version is already current.
    pub fn publish(&self, snapshot: Snapshot) -> bool {
        let project = snapshot.project().clone();
        let version = snapshot.version();

        // Hold the entry guard so `remove` waits for the publish.
        let accepted = self
            .providers
            .entry(project.clone())
            .or_insert_with(|| Arc::new(ProjectSnapshotProvider::new(project.clone())))
            .publish(Arc::new(snapshot));
        if accepted {
            debug!(project = %project, version, "published dependency snapshot");
        } else {
            warn!(project = %project, version, "ignoring stale dependency snapshot");
        }
        accepted
    }

    /// Forget a project, e.g. after it was unloaded.
    pub fn remove(&self, project: &ProjectKey) -> bool {
        self.providers.remove(project).is_some()
    }

    pub fn projects(&self) -> Vec<ProjectKey> {
        let mut projects: Vec<_> = self.providers.iter().map(|e| e.key().clone()).collect();
        projects.sort();
        projects
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn snapshot_provider(&self, project: &ProjectKey) -> Option<Arc<dyn SnapshotProvider>> {
        self.providers
            .get(project)
            .map(|e| Arc::clone(e.value()) as Arc<dyn SnapshotProvider>)
    }
}
