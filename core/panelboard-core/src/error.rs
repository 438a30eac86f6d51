//! Error types for wrapper-core operations.
//!
//! `NoLongerValid` is the caller-visible face of the host's `Unregistered`
//! signal: once a node or its board dies, every wrapper operation on it is
//! rejected here instead of silently running against stale state. Listener
//! cancellation is deliberately *not* an error; see `WriteOutcome`.

use std::path::PathBuf;

use panelboard_host::HostError;

/// All errors that can occur in wrapper-core operations.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    // ─────────────────────────────────────────────────────────────────────
    // Validity Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("{kind} '{name}' is no longer valid")]
    NoLongerValid { kind: &'static str, name: String },

    #[error("the main board cannot be unregistered")]
    CannotUnregisterMain,

    // ─────────────────────────────────────────────────────────────────────
    // Argument Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("label is {len} chars, limit is {max}")]
    LabelTooLong { len: usize, max: usize },

    #[error("code name must not be empty")]
    EmptyName,

    #[error("a {kind} named '{name}' already exists")]
    NameTaken { kind: &'static str, name: String },

    #[error("no panel field with id {0}")]
    UnknownField(u64),

    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("configuration write failed: {path}: {source}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration serialization failed: {source}")]
    ConfigSerialize {
        #[source]
        source: serde_json::Error,
    },

    // ─────────────────────────────────────────────────────────────────────
    // Host Boundary
    // ─────────────────────────────────────────────────────────────────────
    #[error("host rejected the operation: {0}")]
    Host(#[from] HostError),
}

impl BoardError {
    pub(crate) fn no_longer_valid(kind: &'static str, name: impl Into<String>) -> Self {
        BoardError::NoLongerValid {
            kind,
            name: name.into(),
        }
    }

    /// Maps a host failure surfaced through a wrapper method. The expected
    /// `Unregistered` signal becomes `NoLongerValid` for the node the caller
    /// was actually talking to; host argument rejections keep their argument
    /// shape; anything else passes through.
    pub(crate) fn from_host(kind: &'static str, name: &str, err: HostError) -> Self {
        match err {
            HostError::Unregistered { .. } => BoardError::no_longer_valid(kind, name),
            HostError::NameTaken { kind, name } => BoardError::NameTaken { kind, name },
            HostError::LabelTooLong { len, max } => BoardError::LabelTooLong { len, max },
            other => BoardError::Host(other),
        }
    }
}

/// Convenience type alias for Results using BoardError.
pub type Result<T> = std::result::Result<T, BoardError>;
