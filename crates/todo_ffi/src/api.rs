//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the to-do intents (list/add/check/delete-checked) to Dart via FRB.
//! - Own the one store/controller pair of the running app process.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - The store is opened once by `store_init` (or `core_init`); every other task call fails
//!   with a message until then.
//! - Every task envelope carries the controller's view after the call.

use log::{error, info};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use todo_core::{
    core_version as core_version_inner, init_logging as init_logging_inner,
    init_logging_from_config, ping as ping_inner, ControllerError, CoreConfig, ItemStore, Task,
    TaskController, TaskId,
};

static APP_STATE: OnceLock<AppState> = OnceLock::new();

struct AppState {
    data_dir: PathBuf,
    controller: Mutex<TaskController<ItemStore>>,
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Row shape rendered by the task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    /// Store-assigned task id.
    pub id: i64,
    pub name: String,
    pub detail: String,
    /// Rendered with strike-through when `true`.
    pub is_checked: bool,
}

/// Envelope returned by every task call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    /// Whether the call succeeded.
    pub ok: bool,
    /// Empty on success; inline error text otherwise.
    pub message: String,
    /// Current view in insertion order (last known view on failure).
    pub items: Vec<TaskItem>,
}

/// Opens the app task store under `data_dir` (app-private, absolute).
///
/// # FFI contract
/// - Sync call; may create the directory and database file.
/// - Repeated calls with the same directory are idempotent.
/// - A different directory after a successful init is rejected.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn store_init(data_dir: String) -> String {
    let config = CoreConfig::new(data_dir.trim());
    if let Err(err) = config.validate() {
        return err.to_string();
    }

    if let Some(state) = APP_STATE.get() {
        return same_dir_or_conflict(state, &config.data_dir);
    }

    let store = match ItemStore::open(config.db_path()) {
        Ok(store) => store,
        Err(err) => {
            error!("event=store_init module=ffi status=error error={err}");
            return format!("store_init failed: {err}");
        }
    };

    let state = AppState {
        data_dir: config.data_dir.clone(),
        controller: Mutex::new(TaskController::new(Arc::new(store))),
    };
    // A concurrent init may have won; its directory decides.
    match APP_STATE.set(state) {
        Ok(()) => {
            info!("event=store_init module=ffi status=ok");
            String::new()
        }
        Err(_) => match APP_STATE.get() {
            Some(active) => same_dir_or_conflict(active, &config.data_dir),
            None => "store_init failed: state unavailable".to_string(),
        },
    }
}

/// App startup entry: logging under `<data_dir>/logs`, then the task store.
///
/// Input semantics:
/// - `data_dir`: app-private absolute directory.
/// - `log_level`: optional `trace|debug|info|warn|error`; build-mode default when `None`.
///
/// # FFI contract
/// - Same idempotence and conflict rules as `init_logging` and `store_init`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn core_init(data_dir: String, log_level: Option<String>) -> String {
    let mut config = CoreConfig::new(data_dir.trim());
    if let Some(level) = log_level {
        config.log_level = level;
    }
    if let Err(err) = config.validate() {
        return err.to_string();
    }
    if let Err(err) = init_logging_from_config(&config) {
        return err;
    }
    store_init(data_dir)
}

/// Returns the current task view.
///
/// # FFI contract
/// - Sync call, picks up any pending store emission first.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_list() -> TaskListResponse {
    with_controller(|controller| {
        controller.sync();
        Ok(())
    })
}

/// Adds a task from the add dialog.
///
/// # FFI contract
/// - Blank `name` or `detail` returns `ok=false` with inline form text and
///   leaves storage untouched.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_add(name: String, detail: String) -> TaskListResponse {
    with_controller(|controller| controller.add_item(name, detail).map(|_| ()))
}

/// Toggles the checked flag of the task with `id`.
///
/// Ids no longer in the view are ignored, matching store update semantics.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_check(id: i64) -> TaskListResponse {
    with_controller(|controller| {
        match find_item(controller.items(), id) {
            Some(task) => controller.check_item(&task).map(|_| ()),
            None => Ok(()),
        }
    })
}

/// Removes every checked task.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_delete_checked() -> TaskListResponse {
    with_controller(|controller| controller.delete_checked_items())
}

fn same_dir_or_conflict(state: &AppState, requested: &Path) -> String {
    if state.data_dir.as_path() == requested {
        String::new()
    } else {
        format!(
            "store already initialized at `{}`; refusing to switch to `{}`",
            state.data_dir.display(),
            requested.display()
        )
    }
}

fn with_controller(
    f: impl FnOnce(&mut TaskController<ItemStore>) -> Result<(), ControllerError>,
) -> TaskListResponse {
    let Some(state) = APP_STATE.get() else {
        return TaskListResponse {
            ok: false,
            message: "store not initialized; call store_init first".to_string(),
            items: Vec::new(),
        };
    };
    let mut controller = match state.controller.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };

    let outcome = f(&mut controller);
    let items = controller.items().iter().map(to_task_item).collect();
    match outcome {
        Ok(()) => TaskListResponse {
            ok: true,
            message: String::new(),
            items,
        },
        Err(err) => {
            if let ControllerError::Store(store_err) = &err {
                error!("event=task_intent module=ffi status=error error={store_err}");
            }
            TaskListResponse {
                ok: false,
                message: err.to_string(),
                items,
            }
        }
    }
}

fn find_item(items: &[Task], id: TaskId) -> Option<Task> {
    items.iter().find(|task| task.id == id).cloned()
}

fn to_task_item(task: &Task) -> TaskItem {
    TaskItem {
        id: task.id,
        name: task.name.clone(),
        detail: task.detail.clone(),
        is_checked: task.is_checked,
    }
}
