//! Error types for the typing sequence.

use crate::markup::MarkupError;
use crate::target::TargetState;

/// Errors raised while capturing, revealing or wiring document elements.
#[derive(Debug, thiserror::Error)]
pub enum TypingError {
    /// A required element is missing from the document
    #[error("element not found: {0}")]
    ElementNotFound(String),
    /// A target's original markup could not be parsed
    #[error(transparent)]
    Markup(#[from] MarkupError),
    /// A target was asked to move backwards or skip a lifecycle state
    #[error("invalid transition from {from:?} to {to:?}")]
    InvalidTransition { from: TargetState, to: TargetState },
    /// The sequence was cancelled while this target was in flight
    #[error("typing cancelled")]
    Cancelled,
    /// The document backend rejected an operation
    #[error("document operation failed: {0}")]
    Dom(String),
}

/// Result type for typing operations.
pub type TypingResult<T> = Result<T, TypingError>;
