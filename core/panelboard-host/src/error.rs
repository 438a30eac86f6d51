//! Error signals crossing the host boundary.
//!
//! `Unregistered` is load-bearing: the wrapper core treats it as the
//! authoritative "this node no longer exists" signal and must be able to
//! distinguish it from every other failure.

/// Failures reported by a host scoreboard implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The node was unregistered; the handle is permanently dead.
    #[error("{kind} '{name}' is no longer registered")]
    Unregistered { kind: &'static str, name: String },

    #[error("{kind} '{name}' is already registered")]
    NameTaken { kind: &'static str, name: String },

    #[error("label is {len} chars, host limit is {max}")]
    LabelTooLong { len: usize, max: usize },

    #[error("no board registered under label '{0}'")]
    NoSuchBoard(String),
}

impl HostError {
    pub fn unregistered(kind: &'static str, name: impl Into<String>) -> Self {
        HostError::Unregistered {
            kind,
            name: name.into(),
        }
    }

    /// True when the failure is the expected end-of-life signal rather than
    /// a genuine error.
    pub fn is_unregistered(&self) -> bool {
        matches!(self, HostError::Unregistered { .. })
    }
}

/// Convenience type alias for Results using HostError.
pub type Result<T> = std::result::Result<T, HostError>;
