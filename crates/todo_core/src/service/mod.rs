//! Core use-case services.
//!
//! # Responsibility
//! - Turn UI intents into store calls.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod task_controller;
