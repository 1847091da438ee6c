//! Aggregated outcomes of reconcile, audit and batch runs

use serde::{Deserialize, Serialize};

use crate::errors::{DirectoryError, DirectoryResult, SyncError};
use crate::models::SettingsRecord;

/// Outcome of a single mutating call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    Succeeded,
    Failed(String),
}

impl OperationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, OperationOutcome::Succeeded)
    }
}

impl<T> From<DirectoryResult<T>> for OperationOutcome {
    fn from(result: DirectoryResult<T>) -> Self {
        match result {
            Ok(_) => OperationOutcome::Succeeded,
            Err(e) => OperationOutcome::Failed(e.to_string()),
        }
    }
}

/// Classified result of an existence probe
///
/// `Indeterminate` is never folded into either terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExistenceState {
    Exists,
    NotExists,
    Indeterminate(String),
}

impl ExistenceState {
    /// Classify a `get_group` response: "not found" means absent, any other
    /// error leaves existence undetermined.
    pub fn classify<T>(probe: &DirectoryResult<T>) -> Self {
        match probe {
            Ok(_) => ExistenceState::Exists,
            Err(DirectoryError::NotFound(_)) => ExistenceState::NotExists,
            Err(e) => ExistenceState::Indeterminate(e.to_string()),
        }
    }
}

/// One entry in a result's message list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
    /// Free-form status text
    Text(String),
    /// A specific member, user or group that failed, and why
    Item { item: String, detail: String },
    /// A failure not tied to one item: a missing definition, no batch
    /// targets, or an existence probe that could not decide
    Error { error: String },
    /// Settings drift found by an audit
    Settings {
        group: String,
        desired: SettingsRecord,
        observed: SettingsRecord,
    },
}

impl Message {
    pub fn text(text: impl Into<String>) -> Self {
        Message::Text(text.into())
    }

    pub fn error(error: impl Into<String>) -> Self {
        Message::Error {
            error: error.into(),
        }
    }

    pub fn item(item: impl Into<String>, detail: impl Into<String>) -> Self {
        Message::Item {
            item: item.into(),
            detail: detail.into(),
        }
    }

    /// Whether this message names a failed item
    pub fn is_item_failure(&self) -> bool {
        matches!(self, Message::Item { .. })
    }
}

/// Uniform `{changed, failed, messages}` result of every top-level operation
///
/// `failed` is set by any failure recorded through [`RunResult::fail`] or
/// [`RunResult::record_error`]; `changed` only by [`RunResult::mark_changed`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub changed: bool,
    pub failed: bool,
    pub messages: Vec<Message>,
}

/// Result of a group reconciliation
pub type ReconciliationResult = RunResult;
/// Result of a settings audit
pub type AuditResult = RunResult;
/// Result of a per-user batch
pub type BatchResult = RunResult;

impl RunResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// A result that failed before doing anything
    pub fn aborted(error: &SyncError) -> Self {
        let mut result = Self::new();
        result.record_error(error);
        result
    }

    pub fn mark_changed(&mut self) {
        self.changed = true;
    }

    /// Append an informational message without touching the flags
    pub fn note(&mut self, text: impl Into<String>) {
        self.messages.push(Message::text(text));
    }

    /// Record a failure with an explicit message
    pub fn fail(&mut self, message: Message) {
        self.failed = true;
        self.messages.push(message);
    }

    /// Record an engine error; per-item failures keep their item attribution
    pub fn record_error(&mut self, error: &SyncError) {
        let message = match error {
            SyncError::PerItemFailure { item, detail } => Message::item(item, detail),
            other => Message::error(other.to_string()),
        };
        self.fail(message);
    }

    /// Fold one item's outcome into the aggregate
    pub fn record_outcome(&mut self, item: &str, outcome: OperationOutcome) {
        match outcome {
            OperationOutcome::Succeeded => self.mark_changed(),
            OperationOutcome::Failed(detail) => self.fail(Message::item(item, detail)),
        }
    }

    /// Combine with another run, keeping message order
    pub fn merge(&mut self, other: RunResult) {
        self.changed |= other.changed;
        self.failed |= other.failed;
        self.messages.extend(other.messages);
    }

    /// Number of messages that name a failed item
    pub fn item_failures(&self) -> usize {
        self.messages.iter().filter(|m| m.is_item_failure()).count()
    }
}
