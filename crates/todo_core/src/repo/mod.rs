//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define data access contracts for the task table.
//! - Isolate SQLite query details from the store and controller.
//!
//! # Invariants
//! - Repository APIs never publish snapshots; that is the item store's job.
//! - Stale-id mutations report "nothing changed" instead of an error.

pub mod task_repo;
