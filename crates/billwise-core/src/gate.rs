use serde::Serialize;
use url::Url;

use crate::checkout::{CheckoutProvider, CheckoutRequest};
use crate::error::GateError;
use crate::signal::CompletionSignal;

/// Position in the unlock lifecycle. Ordered; advances monotonically under
/// the normal flow and only `reset` moves it backwards past `decline`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Requested,
    Confirmed,
    Unlocked,
}

/// Finite-state controller gating premium content behind an external payment
/// confirmation.
///
/// One `GateState` is owned per user session and discarded with it — it is
/// never persisted, so a new session always restarts at `Idle` regardless of
/// prior payment. Isolation between sessions is achieved by scoping, not
/// locking: the value is mutated only through the operations below, each of
/// which runs to completion within one user interaction.
///
/// ```text
/// Idle --request_unlock--> Requested --confirm_and_pay--> Confirmed
///                              |                              |
///                           decline                observe_completion_signal
///                              v                    (payment=success)
///                            Idle                             v
///                                                         Unlocked
/// ```
///
/// `Unlocked` is terminal for the session; only `reset` leaves it.
#[derive(Debug, Default)]
pub struct GateState {
    phase: Phase,
    completion_token: Option<String>,
}

impl GateState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Opaque token captured from the completion signal at unlock time.
    /// Informational only — it is never validated cryptographically.
    pub fn completion_token(&self) -> Option<&str> {
        self.completion_token.as_deref()
    }

    /// `Idle → Requested`. Idempotent while already `Requested`; rejected
    /// once a checkout session exists or content is unlocked.
    pub fn request_unlock(&mut self) -> Result<(), GateError> {
        match self.phase {
            Phase::Idle | Phase::Requested => {
                self.phase = Phase::Requested;
                Ok(())
            }
            phase => Err(GateError::PhaseViolation {
                operation: "request_unlock",
                phase,
            }),
        }
    }

    /// `Requested → Idle`. The user opted out at the confirmation step.
    pub fn decline(&mut self) -> Result<(), GateError> {
        match self.phase {
            Phase::Requested => {
                self.phase = Phase::Idle;
                Ok(())
            }
            phase => Err(GateError::PhaseViolation {
                operation: "decline",
                phase,
            }),
        }
    }

    /// `Requested → Confirmed`, via the Checkout Provider.
    ///
    /// The precondition is checked before the provider is called: a violation
    /// neither contacts the provider nor mutates state. A provider failure
    /// leaves the gate in `Requested` so the user can retry — the gate never
    /// infers success from the mere act of constructing a checkout session.
    /// Returns the provider-issued redirect URL for the caller to present.
    pub async fn confirm_and_pay(
        &mut self,
        provider: &dyn CheckoutProvider,
        request: &CheckoutRequest,
    ) -> Result<Url, GateError> {
        if self.phase != Phase::Requested {
            return Err(GateError::PhaseViolation {
                operation: "confirm_and_pay",
                phase: self.phase,
            });
        }
        let session = provider.create_session(request).await?;
        self.phase = Phase::Confirmed;
        Ok(session.session_url)
    }

    /// Inspect an externally observed signal for the success marker.
    /// Callable in any phase, typically on every page load.
    ///
    /// - Marker absent: state unchanged, returns `false`.
    /// - Marker present while `Confirmed`: transitions to `Unlocked`, captures
    ///   the signal's token, returns `true`.
    /// - Marker present while already `Unlocked`: no-op, returns `true`
    ///   (the session did pay; re-observing its own redirect is harmless).
    /// - Marker present in any other phase: a replayed or forged link —
    ///   state unchanged, raises [`GateError::UntrustedCompletionSignal`].
    ///   Access is never granted solely from the signal.
    pub fn observe_completion_signal(
        &mut self,
        signal: &CompletionSignal,
    ) -> Result<bool, GateError> {
        if !signal.has_success_marker() {
            return Ok(false);
        }
        match self.phase {
            Phase::Confirmed => {
                self.completion_token = signal.token().map(str::to_string);
                self.phase = Phase::Unlocked;
                Ok(true)
            }
            Phase::Unlocked => Ok(true),
            phase => Err(GateError::UntrustedCompletionSignal { phase }),
        }
    }

    /// Pure query: is premium content visible now?
    pub fn is_unlocked(&self) -> bool {
        self.phase == Phase::Unlocked
    }

    /// Force `Idle` from any phase, including `Unlocked`. Backs "start over"
    /// affordances.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.completion_token = None;
    }
}
