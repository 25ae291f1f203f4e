use crate::{DepGraphError, Dependency, ProjectKey, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Immutable point-in-time view of one project's dependency tree.
///
/// Top-level and nested dependencies live in separate namespaces, so the same
/// id may appear once in each.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SnapshotDocument", into = "SnapshotDocument")]
pub struct Snapshot {
    project: ProjectKey,
    version: u64,
    created_at: DateTime<Utc>,
    top_level: HashMap<String, Arc<Dependency>>,
    nested: HashMap<String, Arc<Dependency>>,
}

/// On-disk form of a [`Snapshot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotDocument {
    pub project: ProjectKey,
    pub version: u64,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl Snapshot {
    pub fn new<I>(project: ProjectKey, version: u64, dependencies: I) -> Self
    where
        I: IntoIterator<Item = Dependency>,
    {
        Self::with_timestamp(project, version, Utc::now(), dependencies)
    }

    fn with_timestamp<I>(
        project: ProjectKey,
        version: u64,
        created_at: DateTime<Utc>,
        dependencies: I,
    ) -> Self
    where
        I: IntoIterator<Item = Dependency>,
    {
        let mut top_level = HashMap::new();
        let mut nested = HashMap::new();

        for dependency in dependencies {
            let namespace = if dependency.top_level {
                &mut top_level
            } else {
                &mut nested
            };
            let id = dependency.id.clone();
            if namespace.insert(id, Arc::new(dependency)).is_some() {
                warn!(
                    project = %project,
                    version,
                    "duplicate dependency id in snapshot, keeping last"
                );
            }
        }

        Self {
            project,
            version,
            created_at,
            top_level,
            nested,
        }
    }

    /// Parse a snapshot document. Documents with blank ids or an id repeated
    /// within one namespace are rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        let document: SnapshotDocument = serde_json::from_str(json)?;
        Self::try_from(document)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn project(&self) -> &ProjectKey {
        &self.project
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Looks up a dependency in the namespace selected by `top_level`.
    pub fn find_dependency(&self, id: &str, top_level: bool) -> Option<&Arc<Dependency>> {
        if top_level {
            self.top_level.get(id)
        } else {
            self.nested.get(id)
        }
    }

    pub fn len(&self) -> usize {
        self.top_level.len() + self.nested.len()
    }

    pub fn is_empty(&self) -> bool {
        self.top_level.is_empty() && self.nested.is_empty()
    }
}

impl TryFrom<SnapshotDocument> for Snapshot {
    type Error = DepGraphError;

    fn try_from(doc: SnapshotDocument) -> Result<Self> {
        let mut seen = HashSet::new();
        for dependency in &doc.dependencies {
            if dependency.id.trim().is_empty() {
                return Err(DepGraphError::InvalidSnapshot(format!(
                    "{} v{}: dependency with blank id",
                    doc.project, doc.version
                )));
            }
            if !seen.insert((dependency.top_level, dependency.id.as_str())) {
                return Err(DepGraphError::InvalidSnapshot(format!(
                    "{} v{}: duplicate {} dependency id '{}'",
                    doc.project,
                    doc.version,
                    if dependency.top_level { "top-level" } else { "nested" },
                    dependency.id
                )));
            }
        }

        Ok(Snapshot::with_timestamp(
            doc.project,
            doc.version,
            doc.created_at,
            doc.dependencies,
        ))
    }
}

impl From<Snapshot> for SnapshotDocument {
    fn from(snapshot: Snapshot) -> Self {
        let mut dependencies: Vec<Dependency> = snapshot
            .top_level
            .values()
            .chain(snapshot.nested.values())
            .map(|d| d.as_ref().clone())
            .collect();
        dependencies.sort_by(|a, b| b.top_level.cmp(&a.top_level).then_with(|| a.id.cmp(&b.id)));

        SnapshotDocument {
            project: snapshot.project,
            version: snapshot.version,
            created_at: snapshot.created_at,
            dependencies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DependencyKind;

    fn project() -> ProjectKey {
        ProjectKey::parse(Some(r"C:\src\App\App.csproj")).unwrap()
    }

    #[test]
    fn namespaces_are_separate() {
        let snapshot = Snapshot::new(
            project(),
            1,
            vec![
                Dependency::top_level("X", DependencyKind::Assembly).with_caption("top"),
                Dependency::nested("X", DependencyKind::Package).with_caption("nested"),
            ],
        );

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.find_dependency("X", true).unwrap().caption, "top");
        assert_eq!(snapshot.find_dependency("X", false).unwrap().caption, "nested");
        assert!(snapshot.find_dependency("Y", true).is_none());
    }

    #[test]
    fn duplicate_ids_keep_last() {
        let snapshot = Snapshot::new(
            project(),
            1,
            vec![
                Dependency::nested("pkg:1.0", DependencyKind::Package).with_caption("first"),
                Dependency::nested("pkg:1.0", DependencyKind::Package).with_caption("second"),
            ],
        );

        assert_eq!(snapshot.len(), 1);
        assert_eq!(
            snapshot.find_dependency("pkg:1.0", false).unwrap().caption,
            "second"
        );
    }

    #[test]
    fn loads_document_json() {
        let json = r#"{
            "project": "/src/app/app.csproj",
            "version": 7,
            "dependencies": [
                { "id": "Newtonsoft.Json", "kind": "package", "top_level": true,
                  "dependency_ids": ["System.Memory/4.5.0"] },
                { "id": "System.Memory/4.5.0", "kind": "package", "resolved": false }
            ]
        }"#;

        let snapshot = Snapshot::from_json(json).unwrap();
        assert_eq!(snapshot.version(), 7);
        assert_eq!(snapshot.project().as_str(), "/src/app/app.csproj");

        let root = snapshot.find_dependency("Newtonsoft.Json", true).unwrap();
        assert!(root.resolved);
        assert_eq!(root.dependency_ids, vec!["System.Memory/4.5.0".to_string()]);

        let child = snapshot.find_dependency("System.Memory/4.5.0", false).unwrap();
        assert!(!child.resolved);
        assert_eq!(child.caption, "");
    }

    #[test]
    fn document_with_duplicate_ids_is_invalid() {
        let json = r#"{
            "project": "/src/app/app.csproj",
            "version": 1,
            "dependencies": [
                { "id": "pkg:1.0", "kind": "package" },
                { "id": "pkg:1.0", "kind": "package" }
            ]
        }"#;

        let err = Snapshot::from_json(json).unwrap_err();
        assert!(matches!(err, DepGraphError::InvalidSnapshot(_)));
        assert!(err.to_string().contains("pkg:1.0"));
    }

    #[test]
    fn document_may_reuse_an_id_across_namespaces() {
        let json = r#"{
            "project": "/src/app/app.csproj",
            "version": 1,
            "dependencies": [
                { "id": "X", "top_level": true },
                { "id": "X" }
            ]
        }"#;

        let snapshot = Snapshot::from_json(json).unwrap();
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn document_with_blank_id_is_invalid() {
        let json = r#"{
            "project": "/src/app/app.csproj",
            "version": 1,
            "dependencies": [{ "id": "  ", "kind": "assembly", "top_level": true }]
        }"#;

        assert!(matches!(
            Snapshot::from_json(json),
            Err(DepGraphError::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        assert!(matches!(
            Snapshot::from_json(r#"{ "version": 1 }"#),
            Err(DepGraphError::Serialization(_))
        ));
    }

    #[test]
    fn optional_fields_survive_serialization() {
        let snapshot = Snapshot::new(
            project(),
            2,
            vec![Dependency::top_level("Foo.dll", DependencyKind::Assembly)
                .with_path(r"C:\src\App\Foo.dll")
                .with_implicit(true)],
        );

        let json = serde_json::to_string(&snapshot).unwrap();
        let reloaded = Snapshot::from_json(&json).unwrap();
        let foo = reloaded.find_dependency("Foo.dll", true).unwrap();
        assert_eq!(foo.path.as_deref(), Some(r"C:\src\App\Foo.dll"));
        assert!(foo.implicit);
    }

    #[test]
    fn document_lists_top_level_first() {
        let snapshot = Snapshot::new(
            project(),
            3,
            vec![
                Dependency::nested("a", DependencyKind::Package),
                Dependency::top_level("b", DependencyKind::Package),
            ],
        );

        let doc = SnapshotDocument::from(snapshot);
        let ids: Vec<_> = doc.dependencies.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }
}
