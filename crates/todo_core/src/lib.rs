//! Core domain logic for the to-do list app.
//! This crate is the single source of truth for task invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{ConfigError, CoreConfig, DEFAULT_DB_FILE_NAME};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::task::{Task, TaskDraft, TaskId, TaskValidationError};
pub use repo::task_repo::{RepoError, RepoResult, SqliteTaskRepository, TaskRepository};
pub use service::task_controller::{ControllerError, ControllerResult, TaskController};
pub use store::item_store::{ItemStore, StoreError, StoreResult, TaskStore, TaskSubscription};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
