//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `todo_core` linkage.
//! - Exercise store and controller wiring against a throwaway in-memory store.
//! - Keep output deterministic for quick local sanity checks.

use std::process::ExitCode;
use std::sync::Arc;
use todo_core::{ItemStore, TaskController};

fn main() -> ExitCode {
    println!("todo_core ping={}", todo_core::ping());
    println!("todo_core version={}", todo_core::core_version());

    match smoke_store() {
        Ok(remaining) => {
            println!("todo_core store=ok remaining={remaining}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("todo_core store=error error={err}");
            ExitCode::FAILURE
        }
    }
}

fn smoke_store() -> Result<usize, Box<dyn std::error::Error>> {
    let store = Arc::new(ItemStore::open_in_memory()?);
    let mut controller = TaskController::new(store);

    let smoke = controller.add_item("smoke", "smoke check")?;
    controller.check_item(&smoke)?;
    controller.delete_checked_items()?;
    Ok(controller.items().len())
}
