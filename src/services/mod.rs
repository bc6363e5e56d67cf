//! Business logic services

pub mod auth;
pub mod catalog;
pub mod lending;
pub mod reports;

use std::sync::Arc;

use crate::{config::AuthConfig, jobs::JobQueue, store::Store};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub lending: lending::LendingService,
    pub reports: reports::ReportsService,
    pub jobs: JobQueue,
}

impl Services {
    /// Create all services over the given store
    pub fn new(
        store: Arc<dyn Store>,
        auth_config: AuthConfig,
        reports_dir: String,
        jobs: JobQueue,
    ) -> Self {
        Self {
            auth: auth::AuthService::new(store.clone(), auth_config),
            catalog: catalog::CatalogService::new(store.clone()),
            lending: lending::LendingService::new(store.clone()),
            reports: reports::ReportsService::new(store, reports_dir),
            jobs,
        }
    }
}
