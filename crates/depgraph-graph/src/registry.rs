use depgraph_core::{Dependency, DependencyKind, Snapshot, ViewProvider};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Selects the view provider responsible for a dependency, by kind.
#[derive(Default, Clone)]
pub struct ViewProviderRegistry {
    providers: HashMap<DependencyKind, Arc<dyn ViewProvider>>,
}

impl ViewProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with [`ChildrenViewProvider`] registered for every kind.
    pub fn with_default_providers() -> Self {
        let mut registry = Self::new();
        registry.register_all(DependencyKind::ALL, Arc::new(ChildrenViewProvider));
        registry
    }

    /// Register `provider` for `kind`, returning the provider it replaced.
    pub fn register(
        &mut self,
        kind: DependencyKind,
        provider: Arc<dyn ViewProvider>,
    ) -> Option<Arc<dyn ViewProvider>> {
        self.providers.insert(kind, provider)
    }

    pub fn register_all<I>(&mut self, kinds: I, provider: Arc<dyn ViewProvider>)
    where
        I: IntoIterator<Item = DependencyKind>,
    {
        for kind in kinds {
            self.providers.insert(kind, Arc::clone(&provider));
        }
    }

    pub fn select(&self, dependency: &Dependency) -> Option<Arc<dyn ViewProvider>> {
        self.providers.get(&dependency.kind).cloned()
    }

    pub fn supports(&self, kind: DependencyKind) -> bool {
        self.providers.contains_key(&kind)
    }
}

impl fmt::Debug for ViewProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self
            .providers
            .iter()
            .map(|(kind, provider)| (*kind, provider.name().to_string()))
            .collect();
        kinds.sort();
        f.debug_struct("ViewProviderRegistry")
            .field("providers", &kinds)
            .finish()
    }
}

/// Shows the nested dependencies listed in `dependency_ids` as children.
///
/// Ids missing from the snapshot are skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChildrenViewProvider;

impl ViewProvider for ChildrenViewProvider {
    fn name(&self) -> &str {
        "children"
    }

    fn has_children(&self, dependency: &Dependency, snapshot: &Snapshot) -> bool {
        dependency
            .dependency_ids
            .iter()
            .any(|id| snapshot.find_dependency(id, false).is_some())
    }

    fn children(&self, dependency: &Dependency, snapshot: &Snapshot) -> Vec<Arc<Dependency>> {
        dependency
            .dependency_ids
            .iter()
            .filter_map(|id| snapshot.find_dependency(id, false).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depgraph_core::ProjectKey;

    struct Named(&'static str);

    impl ViewProvider for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn has_children(&self, _: &Dependency, _: &Snapshot) -> bool {
            false
        }

        fn children(&self, _: &Dependency, _: &Snapshot) -> Vec<Arc<Dependency>> {
            Vec::new()
        }
    }

    #[test]
    fn selects_by_kind() {
        let mut registry = ViewProviderRegistry::new();
        registry.register(DependencyKind::Package, Arc::new(Named("packages")));
        registry.register_all(
            [DependencyKind::Assembly, DependencyKind::Com],
            Arc::new(Named("references")),
        );

        let package = Dependency::top_level("Newtonsoft.Json", DependencyKind::Package);
        let assembly = Dependency::top_level("Foo.dll", DependencyKind::Assembly);
        let sdk = Dependency::top_level("Microsoft.NET.Sdk", DependencyKind::Sdk);

        assert_eq!(registry.select(&package).unwrap().name(), "packages");
        assert_eq!(registry.select(&assembly).unwrap().name(), "references");
        assert!(registry.select(&sdk).is_none());
        assert!(!registry.supports(DependencyKind::Sdk));
    }

    #[test]
    fn register_replaces_previous_provider() {
        let mut registry = ViewProviderRegistry::new();
        assert!(registry
            .register(DependencyKind::Package, Arc::new(Named("old")))
            .is_none());
        let replaced = registry
            .register(DependencyKind::Package, Arc::new(Named("new")))
            .unwrap();
        assert_eq!(replaced.name(), "old");
    }

    #[test]
    fn default_registry_is_total() {
        let registry = ViewProviderRegistry::with_default_providers();
        for kind in DependencyKind::ALL {
            assert!(registry.supports(kind), "{} unsupported", kind);
        }
    }

    #[test]
    fn children_provider_skips_unknown_ids() {
        let project = ProjectKey::parse(Some("/src/app/app.csproj")).unwrap();
        let root = Dependency::top_level("Newtonsoft.Json", DependencyKind::Package)
            .with_children(["System.Memory", "Missing"]);
        let leaf = Dependency::nested("Missing", DependencyKind::Package);
        let snapshot = Snapshot::new(
            project,
            1,
            vec![
                root.clone(),
                Dependency::nested("System.Memory", DependencyKind::Package),
            ],
        );

        let provider = ChildrenViewProvider;
        assert!(provider.has_children(&root, &snapshot));
        let children = provider.children(&root, &snapshot);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, "System.Memory");
        assert!(!provider.has_children(&leaf, &snapshot));
    }
}
