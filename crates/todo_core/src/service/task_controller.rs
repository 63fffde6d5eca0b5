//! Task controller between the UI surface and the item store.
//!
//! # Responsibility
//! - Validate add intents before they reach storage.
//! - Forward check and bulk-delete intents to the store.
//! - Hold the latest store snapshot for rendering.
//!
//! # Invariants
//! - `items` is never edited in place; it is replaced by store emissions only.
//! - Blank input never reaches the store.
//! - Store failures are returned to the caller unchanged.

use crate::model::task::{Task, TaskDraft, TaskValidationError};
use crate::store::item_store::{StoreError, TaskStore, TaskSubscription};
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type ControllerResult<T> = Result<T, ControllerError>;

/// Failure of a user intent.
#[derive(Debug)]
pub enum ControllerError {
    /// Input rejected before any store call. Display text is user-facing.
    Validation(TaskValidationError),
    /// Store fault, propagated as is.
    Store(StoreError),
}

impl Display for ControllerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ControllerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<TaskValidationError> for ControllerError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for ControllerError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Mediator holding the UI-facing view of tasks.
pub struct TaskController<S: TaskStore> {
    store: Arc<S>,
    updates: TaskSubscription,
    items: Vec<Task>,
}

impl<S: TaskStore> TaskController<S> {
    /// Subscribes to `store` and takes its current snapshot as the first view.
    pub fn new(store: Arc<S>) -> Self {
        let updates = store.observe_all();
        let mut controller = Self {
            store,
            updates,
            items: Vec::new(),
        };
        controller.items = controller.updates.borrow_and_update().clone();
        controller
    }

    /// Current view, in insertion order.
    pub fn items(&self) -> &[Task] {
        &self.items
    }

    /// Adds a task after checking both fields are non-blank.
    ///
    /// # Errors
    /// - `Validation` for blank `name` or `detail`; the store is not touched.
    /// - `Store` when persistence fails.
    pub fn add_item(
        &mut self,
        name: impl Into<String>,
        detail: impl Into<String>,
    ) -> ControllerResult<Task> {
        let draft = TaskDraft::validated(name, detail).map_err(|err| {
            warn!(
                "event=task_add module=controller status=rejected reason={}",
                validation_reason(err)
            );
            err
        })?;
        let task = self.store.insert(draft)?;
        self.sync();
        Ok(task)
    }

    /// Flips `is_checked` on `task` and stores the full record.
    ///
    /// Returns the record that was written.
    pub fn check_item(&mut self, task: &Task) -> ControllerResult<Task> {
        let toggled = task.toggled();
        self.store.update(&toggled)?;
        self.sync();
        Ok(toggled)
    }

    /// Removes every checked task. No confirmation step.
    pub fn delete_checked_items(&mut self) -> ControllerResult<()> {
        self.store.delete_where_checked()?;
        self.sync();
        Ok(())
    }

    /// Applies a pending store emission, if any.
    ///
    /// Returns `true` when the view was replaced.
    pub fn sync(&mut self) -> bool {
        match self.updates.has_changed() {
            Ok(true) => {
                self.items = self.updates.borrow_and_update().clone();
                true
            }
            Ok(false) | Err(_) => false,
        }
    }

    /// Waits for the next store emission and applies it.
    ///
    /// Returns `false` if the store side of the channel is gone.
    pub async fn changed(&mut self) -> bool {
        if self.updates.changed().await.is_err() {
            return false;
        }
        self.items = self.updates.borrow_and_update().clone();
        true
    }
}

fn validation_reason(err: TaskValidationError) -> &'static str {
    match err {
        TaskValidationError::EmptyName => "empty_name",
        TaskValidationError::EmptyDetail => "empty_detail",
    }
}
