use std::collections::HashSet;

use crate::backend::Backend;
use crate::feedback::Feedback;
use crate::plugin::PluginDescriptor;

/// Errors that can occur while fetching the plugin catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{0}")]
    Unavailable(String),
}

/// The formats offered by the backend, fetched once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginCatalog {
    plugins: Vec<PluginDescriptor>,
}

impl PluginCatalog {
    /// A catalog with no formats. Format-dependent actions stay disabled.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a catalog from descriptors, keeping the first of any duplicate name.
    pub fn from_plugins(plugins: Vec<PluginDescriptor>) -> Self {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(plugins.len());
        for plugin in plugins {
            if seen.insert(plugin.name.clone()) {
                unique.push(plugin);
            } else {
                tracing::warn!(plugin = %plugin.name, "duplicate plugin name ignored");
            }
        }
        Self { plugins: unique }
    }

    /// Query the backend's plugin registry.
    pub async fn fetch(backend: &dyn Backend) -> Result<Self, CatalogError> {
        let plugins = backend
            .list_plugins()
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;
        tracing::info!(backend = backend.label(), count = plugins.len(), "plugin catalog loaded");
        Ok(Self::from_plugins(plugins))
    }

    /// Startup variant of [`PluginCatalog::fetch`]: a failure leaves the
    /// catalog empty and comes back as a warning instead of an error.
    pub async fn load(backend: &dyn Backend) -> (Self, Option<Feedback>) {
        match Self::fetch(backend).await {
            Ok(catalog) => (catalog, None),
            Err(e) => {
                tracing::warn!(backend = backend.label(), error = %e, "plugin catalog unavailable");
                (Self::empty(), Some(crate::notify::catalog_feedback(&e)))
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&PluginDescriptor> {
        self.plugins.iter().find(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PluginDescriptor> {
        self.plugins.iter()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::ScriptedBackend;
    use crate::BackendError;

    use super::*;

    #[tokio::test]
    async fn fetch_returns_backend_plugins() {
        let backend = ScriptedBackend::with_plugins(&["zip", "7z"]);
        let catalog = PluginCatalog::fetch(&backend).await.unwrap();
        assert_eq!(catalog.names(), vec!["zip", "7z"]);
        assert!(catalog.contains("7z"));
        assert!(!catalog.contains("rar"));
    }

    #[tokio::test]
    async fn load_failure_leaves_catalog_empty_with_warning() {
        let backend = ScriptedBackend::with_plugins(&[]);
        backend.fail_list_plugins(BackendError::Other("registry offline".into()));

        let (catalog, feedback) = PluginCatalog::load(&backend).await;
        assert!(catalog.is_empty());
        let feedback = feedback.unwrap();
        assert!(feedback.is_warning());
        assert_eq!(feedback.message(), "Failed to load plugins: registry offline");
    }

    #[tokio::test]
    async fn load_success_has_no_feedback() {
        let backend = ScriptedBackend::with_plugins(&["zip"]);
        let (catalog, feedback) = PluginCatalog::load(&backend).await;
        assert_eq!(catalog.len(), 1);
        assert!(feedback.is_none());
    }

    #[test]
    fn duplicate_names_keep_first() {
        let catalog = PluginCatalog::from_plugins(vec![
            PluginDescriptor::new("zip", "1.0.0"),
            PluginDescriptor::new("zip", "2.0.0"),
        ]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("zip").unwrap().version, "1.0.0");
    }
}
