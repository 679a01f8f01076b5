//! Typed error hierarchy for boardsync.
//!
//! One enum per subsystem:
//! - `BoardError`: invalid board transitions and invalid fetched payloads
//! - `ClientError`: REST client failures
//! - `ControllerError`: failures reported by the board controller
//! - `BackendError`: rejections from the development backend
//! - `ValidationErrors`: per-field form validation failures

use std::fmt;

use thiserror::Error;

/// Errors from the board state container.
///
/// Index and column errors are caller bugs: the gesture interpreter only
/// produces in-range commands for the snapshot it was given.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("Column {column_id} is not on the board")]
    UnknownColumn { column_id: i64 },

    #[error("Index {index} out of range for {what} of length {len}")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Invalid column id '{0}': expected an integer")]
    InvalidColumnId(String),

    #[error("Column {column_id} is ordered but missing from the column map")]
    MissingColumn { column_id: i64 },

    #[error("Column {column_id} is in the column map but not in the column order")]
    OrphanColumn { column_id: i64 },

    #[error("Column {column_id} appears more than once in the column order")]
    DuplicateColumn { column_id: i64 },

    #[error("Column map key {key} does not match its column id {column_id}")]
    MismatchedColumnKey { key: i64, column_id: i64 },

    #[error("Card {card_id} appears in more than one column")]
    DuplicateCard { card_id: i64 },

    #[error("Card key '{key}' is used by more than one card")]
    DuplicateCardKey { key: String },
}

/// How a failure should be surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Form input problem; shown inline, nothing is sent.
    Validation,
    /// Network or backend failure; the board resyncs.
    Transient,
    /// Not-found or authorization failure; shown, never retried.
    Rejected,
}

/// Errors from the board REST client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rejected by backend: {0}")]
    Validation(String),

    #[error("Backend error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid board payload: {0}")]
    InvalidBoard(#[from] BoardError),

    #[error("Invalid input: {0}")]
    Invalid(#[from] ValidationErrors),
}

impl ClientError {
    pub fn severity(&self) -> Severity {
        match self {
            ClientError::Unauthorized(_) | ClientError::Forbidden(_) | ClientError::NotFound(_) => {
                Severity::Rejected
            }
            ClientError::Validation(_) | ClientError::Invalid(_) => Severity::Validation,
            ClientError::Conflict(_)
            | ClientError::Api { .. }
            | ClientError::Transport(_)
            | ClientError::Decode(_)
            | ClientError::InvalidBoard(_) => Severity::Transient,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err)
        }
    }
}

/// Errors talking to the board controller task.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ControllerError {
    #[error("Board controller has stopped")]
    Stopped,

    #[error("Board is not loaded")]
    NotLoaded,

    #[error("Board failed to load: {0}")]
    LoadFailed(String),

    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Errors from the in-memory development backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),
}

/// One failed form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Form validation failures, one entry per offending field.
#[derive(Debug, Error, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}
