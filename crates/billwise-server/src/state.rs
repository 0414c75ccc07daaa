use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::info;

use billwise_core::{
    checkout::CheckoutProvider, config::Config, estimate::SavingsProfile, gate::GateState,
    generator::ContentGenerator,
};

/// Everything the server keeps for one user session.
///
/// Discarded wholesale by the sweep loop once idle past the configured TTL —
/// the gate is never persisted, so an expired session restarts at `Idle`
/// regardless of prior payment.
pub struct Session {
    pub gate: GateState,
    /// Last submitted calculator inputs; the premium prompt is built from
    /// these at generation time.
    pub profile: Option<SavingsProfile>,
    pub last_seen: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            gate: GateState::new(),
            profile: None,
            last_seen: Utc::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_seen = Utc::now();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
///
/// Sessions are stored as individually locked slots behind a map lock. The
/// map lock is held only long enough to fetch or insert a slot; slow work
/// (the checkout-provider call, content generation) runs under the slot's
/// own lock. A session's requests stay serialised against each other, and
/// one session's provider call never blocks another session's.
pub struct AppState {
    pub config: Arc<Config>,
    pub checkout: Arc<dyn CheckoutProvider>,
    pub generator: Arc<dyn ContentGenerator>,
    sessions: Mutex<HashMap<String, Arc<Mutex<Session>>>>,
}

impl AppState {
    pub fn new(
        config: Config,
        checkout: Arc<dyn CheckoutProvider>,
        generator: Arc<dyn ContentGenerator>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            checkout,
            generator,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch (or create) the slot for `sid`.
    ///
    /// The map lock is released before returning; the caller locks the slot
    /// itself and may hold that lock across provider calls.
    pub async fn session(&self, sid: &str) -> Arc<Mutex<Session>> {
        let mut sessions = self.sessions.lock().await;
        Arc::clone(sessions.entry(sid.to_string()).or_default())
    }

    /// Number of live session slots; reported by the health endpoint.
    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Background loop: discard sessions idle past the TTL.
    ///
    /// Spawned as a `tokio::spawn` task in `main.rs`. Eviction is the
    /// session-end of the gate lifecycle — a user who abandoned payment in
    /// `Confirmed` simply ages out here.
    pub async fn run_session_sweep_loop(self: Arc<Self>) {
        let ttl = chrono::Duration::seconds(self.config.session_ttl().as_secs() as i64);
        let mut ticker = tokio::time::interval(self.config.session_sweep_interval());
        loop {
            ticker.tick().await;
            let cutoff = Utc::now() - ttl;
            let mut sessions = self.sessions.lock().await;
            let before = sessions.len();
            sessions.retain(|_, slot| match slot.try_lock() {
                Ok(session) => session.last_seen > cutoff,
                // A locked slot is mid-request, so by definition not idle.
                Err(_) => true,
            });
            let evicted = before - sessions.len();
            if evicted > 0 {
                info!(evicted, remaining = sessions.len(), "Idle sessions discarded");
            }
        }
    }
}
