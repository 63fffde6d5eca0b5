//! Domain model for the to-do list.
//!
//! # Responsibility
//! - Define canonical data structures used by the store and controller.
//!
//! # Invariants
//! - Every persisted task is identified by a store-assigned `TaskId`.
//! - Only `is_checked` changes after creation.

pub mod task;
