//! Flutter bridge for the to-do core.
//!
//! Functions under [`api`] are the whole surface the Dart UI sees.

pub mod api;
