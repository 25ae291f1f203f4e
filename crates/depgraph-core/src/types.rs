use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Project file path used to index the snapshot store.
///
/// The path is kept verbatim; a key can only be built from a non-blank string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectKey(String);

impl ProjectKey {
    /// Returns `None` for missing, empty or whitespace-only paths.
    pub fn parse(path: Option<&str>) -> Option<Self> {
        match path {
            Some(p) if !p.trim().is_empty() => Some(ProjectKey(p.to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ProjectKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProjectKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            Err("project path must not be blank".to_string())
        } else {
            Ok(ProjectKey(value))
        }
    }
}

impl From<ProjectKey> for String {
    fn from(key: ProjectKey) -> Self {
        key.0
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    Package,
    Project,
    Assembly,
    Com,
    Analyzer,
    Framework,
    Sdk,
    SharedProject,
    #[default]
    Unknown,
}

impl DependencyKind {
    pub const ALL: [DependencyKind; 9] = [
        DependencyKind::Package,
        DependencyKind::Project,
        DependencyKind::Assembly,
        DependencyKind::Com,
        DependencyKind::Analyzer,
        DependencyKind::Framework,
        DependencyKind::Sdk,
        DependencyKind::SharedProject,
        DependencyKind::Unknown,
    ];
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DependencyKind::Package => "package",
            DependencyKind::Project => "project",
            DependencyKind::Assembly => "assembly",
            DependencyKind::Com => "com",
            DependencyKind::Analyzer => "analyzer",
            DependencyKind::Framework => "framework",
            DependencyKind::Sdk => "sdk",
            DependencyKind::SharedProject => "shared_project",
            DependencyKind::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

impl FromStr for DependencyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "package" => Ok(DependencyKind::Package),
            "project" => Ok(DependencyKind::Project),
            "assembly" => Ok(DependencyKind::Assembly),
            "com" => Ok(DependencyKind::Com),
            "analyzer" => Ok(DependencyKind::Analyzer),
            "framework" => Ok(DependencyKind::Framework),
            "sdk" => Ok(DependencyKind::Sdk),
            "shared_project" | "sharedproject" => Ok(DependencyKind::SharedProject),
            "unknown" => Ok(DependencyKind::Unknown),
            other => Err(format!("unknown dependency kind: {}", other)),
        }
    }
}

/// Direction of a graph query issued by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphDirection {
    /// Query about the input nodes themselves (attributes only).
    #[default]
    #[serde(rename = "self")]
    Self_,
    /// Query for the children contained by the input nodes.
    Contains,
    Source,
    Target,
}

/// Node properties a host may ask to have populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphProperty {
    ContainsChildren,
    DependencyId,
    Resolved,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_key_rejects_blank_paths() {
        assert!(ProjectKey::parse(None).is_none());
        assert!(ProjectKey::parse(Some("")).is_none());
        assert!(ProjectKey::parse(Some("   \t")).is_none());
        let key = ProjectKey::parse(Some(r"C:\src\App\App.csproj")).unwrap();
        assert_eq!(key.as_str(), r"C:\src\App\App.csproj");
    }

    #[test]
    fn project_key_deserialization_rejects_blank() {
        let ok: ProjectKey = serde_json::from_str(r#""/src/app/app.csproj""#).unwrap();
        assert_eq!(ok.as_str(), "/src/app/app.csproj");
        assert!(serde_json::from_str::<ProjectKey>(r#""  ""#).is_err());
    }

    #[test]
    fn dependency_kind_parses_display_form() {
        for kind in DependencyKind::ALL {
            assert_eq!(kind.to_string().parse::<DependencyKind>().unwrap(), kind);
        }
        assert!("nuget".parse::<DependencyKind>().is_err());
    }

    #[test]
    fn graph_direction_uses_self_on_the_wire() {
        let json = serde_json::to_string(&GraphDirection::Self_).unwrap();
        assert_eq!(json, r#""self""#);

        let target: GraphDirection = serde_json::from_str(r#""target""#).unwrap();
        assert_eq!(target, GraphDirection::Target);
        assert_eq!(GraphDirection::default(), GraphDirection::Self_);
        assert_eq!(DependencyKind::default(), DependencyKind::Unknown);
    }
}
