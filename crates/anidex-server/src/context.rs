//! Application context shared by every handler via axum state.

use std::sync::Arc;

use anidex_core::config::SiteConfig;
use anidex_core::{Catalog, Config, CoverResolver, IntakeService};

/// Cheaply cloneable: everything is behind an `Arc` and read-only except the
/// record documents on disk.
#[derive(Clone)]
pub struct AppContext {
    /// Immutable configuration snapshot taken at startup.
    pub config: Arc<Config>,
    pub covers: Arc<CoverResolver>,
    pub intake: Arc<IntakeService>,
}

impl AppContext {
    pub fn new(config: Config) -> Self {
        let covers = CoverResolver::new(config.covers_dir());
        let intake = IntakeService::new(&config);
        Self {
            config: Arc::new(config),
            covers: Arc::new(covers),
            intake: Arc::new(intake),
        }
    }

    /// Fresh catalog snapshot; the document is re-read on every call.
    pub fn catalog(&self) -> Catalog {
        Catalog::load(&self.config.catalog_path())
    }

    pub fn site(&self) -> &SiteConfig {
        &self.config.site
    }

    /// Key used to sign flash cookies.
    pub fn session_key(&self) -> &[u8] {
        self.config
            .secrets
            .session_key
            .as_deref()
            .unwrap_or_default()
            .as_bytes()
    }
}
