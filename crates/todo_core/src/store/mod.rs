//! Durable task storage with a live snapshot view.
//!
//! # Responsibility
//! - Own the task table for the lifetime of the process.
//! - Publish the full table contents after every committed mutation.
//!
//! # Invariants
//! - One store instance per process, created at startup and injected.
//! - Subscribers only ever see committed, fully materialized snapshots.

pub mod item_store;
