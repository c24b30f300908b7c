//! Per-form state shared between the orchestration core and the UI.
//!
//! Each UI form (connect, download, upload) owns one [`FormState`]. The
//! orchestration functions take it by `&mut`, so exactly one attempt can
//! mutate a form at a time and no state lives outside it.

use serde::{Deserialize, Serialize};

/// Lifecycle of the most recent submission of a form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormStatus {
    /// Never submitted.
    #[default]
    Idle,
    /// An attempt is in flight.
    Submitting,
    /// The last attempt succeeded.
    Succeeded,
    /// The last attempt failed; `error` holds the message.
    Failed,
}

/// Input value, inline error line and status of one form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    value: String,
    error: Option<String>,
    status: FormStatus,
}

impl FormState {
    /// Create an idle form holding `value`.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Default::default()
        }
    }

    /// The text currently entered in the form.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the entered text.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// The active error message, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn status(&self) -> FormStatus {
        self.status
    }

    /// Start a new attempt: the previous error is discarded.
    pub(crate) fn begin(&mut self) {
        self.error = None;
        self.status = FormStatus::Submitting;
    }

    pub(crate) fn succeed(&mut self) {
        self.error = None;
        self.status = FormStatus::Succeeded;
    }

    /// Finish the attempt with `message` as the single active error.
    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.status = FormStatus::Failed;
    }
}
