use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use dynlist_types::{ApplicationConfig, ConfigError};

/// An immutable set of application definitions.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    applications: HashMap<String, Arc<ApplicationConfig>>,
    default_app: Option<Arc<ApplicationConfig>>,
}

impl RegistrySnapshot {
    /// Indexes applications by id. The first application becomes the default.
    pub fn from_applications(
        applications: impl IntoIterator<Item = ApplicationConfig>,
    ) -> Result<Self, ConfigError> {
        let mut snapshot = Self::default();
        for app in applications {
            if snapshot.applications.contains_key(&app.app_id) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate application id {}",
                    app.app_id
                )));
            }
            let app = Arc::new(app);
            if snapshot.default_app.is_none() {
                snapshot.default_app = Some(Arc::clone(&app));
            }
            snapshot.applications.insert(app.app_id.clone(), app);
        }
        Ok(snapshot)
    }

    /// Makes a registered application the default.
    pub fn with_default(mut self, app_id: &str) -> Result<Self, ConfigError> {
        let app = self.applications.get(app_id).cloned().ok_or_else(|| {
            ConfigError::Invalid(format!("default application {app_id} is not registered"))
        })?;
        self.default_app = Some(app);
        Ok(self)
    }

    /// Installs a default application that is served only under its own id and
    /// is not part of the indexed set.
    #[must_use]
    pub fn with_fallback(mut self, app: ApplicationConfig) -> Self {
        self.default_app = Some(Arc::new(app));
        self
    }

    #[must_use]
    pub fn default_app(&self) -> Option<&Arc<ApplicationConfig>> {
        self.default_app.as_ref()
    }

    /// Looks up an indexed application by id.
    #[must_use]
    pub fn get(&self, app_id: &str) -> Option<Arc<ApplicationConfig>> {
        self.applications.get(app_id).cloned()
    }

    pub fn applications(&self) -> impl Iterator<Item = &Arc<ApplicationConfig>> {
        self.applications.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.applications.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.applications.is_empty()
    }
}

/// Holds the current [`RegistrySnapshot`].
///
/// Readers clone the `Arc` and keep using that snapshot for the rest of their
/// request; [`ConfigRegistry::reload`] swaps in a new one without waiting for
/// them.
#[derive(Debug, Default)]
pub struct ConfigRegistry {
    current: RwLock<Arc<RegistrySnapshot>>,
}

impl ConfigRegistry {
    pub fn new(snapshot: RegistrySnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// The snapshot in effect right now.
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Atomically replaces the snapshot.
    pub fn reload(&self, snapshot: RegistrySnapshot) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
    }

    /// Resolves an application by id.
    ///
    /// A code that is not registered under its own id but names the default
    /// application resolves to the default.
    pub fn get_application(&self, app_code: &str) -> Option<Arc<ApplicationConfig>> {
        let snapshot = self.snapshot();
        snapshot.get(app_code).or_else(|| {
            snapshot
                .default_app()
                .filter(|default| default.app_id == app_code)
                .cloned()
        })
    }
}

impl From<RegistrySnapshot> for ConfigRegistry {
    fn from(snapshot: RegistrySnapshot) -> Self {
        Self::new(snapshot)
    }
}
