use thiserror::Error;

use crate::gate::Phase;

/// The Checkout Provider rejected a session request — bad configuration,
/// invalid parameters, or a transient provider-side failure. Recoverable:
/// the gate stays in `Requested` and the caller may retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("checkout session creation failed: {message}")]
pub struct CheckoutCreationError {
    pub message: String,
}

impl CheckoutCreationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The Content Generator failed or is rate-limited. Recoverable: callers
/// display an inline error and may re-request generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("content generation failed: {message}")]
pub struct GenerationError {
    pub message: String,
}

impl GenerationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors surfaced by [`crate::gate::GateState`] operations.
///
/// Every variant is recoverable and local: the gate is left in its pre-call
/// phase, so the caller can report the error inline and let the user retry.
#[derive(Debug, Error)]
pub enum GateError {
    /// An operation was called in a phase where its precondition does not hold.
    #[error("{operation} is not allowed in phase {phase:?}")]
    PhaseViolation {
        operation: &'static str,
        phase: Phase,
    },

    /// A success marker was observed while the gate had no pending checkout.
    /// Replayed or forged completion links land here; access is never granted
    /// from the signal alone.
    #[error("completion signal observed in phase {phase:?} — untrusted, ignoring")]
    UntrustedCompletionSignal { phase: Phase },

    #[error(transparent)]
    Checkout(#[from] CheckoutCreationError),
}
