//! Task domain model.
//!
//! # Responsibility
//! - Define the persisted `Task` row and the `TaskDraft` insert input.
//! - Provide the non-blank validation applied before a draft reaches storage.
//!
//! # Invariants
//! - `id` is assigned by the store and never reused for another task.
//! - `name`/`detail` are immutable after creation; only `is_checked` flips.
//! - Drafts have no checked flag; new rows always start unchecked.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned row identifier (`tasks.id`).
pub type TaskId = i64;

/// A persisted to-do entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Primary key assigned on insert.
    pub id: TaskId,
    /// Short label shown as the row title.
    pub name: String,
    /// Free-text description shown under the name.
    pub detail: String,
    /// Completion flag. Checked rows are removed by bulk delete.
    pub is_checked: bool,
}

impl Task {
    /// Returns a copy with `is_checked` flipped.
    ///
    /// Name, detail and id are carried over unchanged.
    pub fn toggled(&self) -> Self {
        Self {
            is_checked: !self.is_checked,
            ..self.clone()
        }
    }
}

/// Validation failures for user-provided task input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    /// `name` is empty or whitespace only.
    EmptyName,
    /// `detail` is empty or whitespace only.
    EmptyDetail,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // Both cases share the same inline form message.
        match self {
            Self::EmptyName | Self::EmptyDetail => write!(f, "Please fill in all fields"),
        }
    }
}

impl Error for TaskValidationError {}

/// Insert input for a new task. Has no id until the store assigns one.
///
/// Carries no checked flag: every task is created unchecked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub name: String,
    pub detail: String,
}

impl TaskDraft {
    /// Creates an unchecked draft without validating its fields.
    ///
    /// The store accepts empty text; use [`TaskDraft::validated`] on user input.
    pub fn new(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: detail.into(),
        }
    }

    /// Creates an unchecked draft after rejecting blank fields.
    ///
    /// # Errors
    /// - `EmptyName` when `name` is blank (checked first).
    /// - `EmptyDetail` when `detail` is blank.
    pub fn validated(
        name: impl Into<String>,
        detail: impl Into<String>,
    ) -> Result<Self, TaskValidationError> {
        let draft = Self::new(name, detail);
        draft.validate()?;
        Ok(draft)
    }

    /// Checks the non-blank rule for both text fields.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.name.trim().is_empty() {
            return Err(TaskValidationError::EmptyName);
        }
        if self.detail.trim().is_empty() {
            return Err(TaskValidationError::EmptyDetail);
        }
        Ok(())
    }

    /// Materializes the draft as a fresh, unchecked row with the store-assigned id.
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            name: self.name,
            detail: self.detail,
            is_checked: false,
        }
    }
}
