//! Libris Library Management Service
//!
//! A REST JSON API for managing a small library: authors, books and
//! borrow/return records, with JWT authentication and asynchronous report
//! generation.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod jobs;
pub mod models;
pub mod services;
pub mod store;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
