use std::cmp;
use std::time::Duration;

use tracing::{info, warn};

use coursegrab_core::{DesiredCourses, PortalError, Transport};

use crate::round::{RegistrationEngine, RoundError};

/// Exponential backoff applied only to rejected logins. Everything else
/// retries immediately: registration windows are short and congested,
/// and the server coming back a moment later is the common case.
#[derive(Debug)]
pub struct AuthBackoff {
    base: Duration,
    cap: Duration,
    attempt: u32,
}

impl AuthBackoff {
    pub fn new(base: Duration, cap: Duration) -> Self {
        Self {
            base,
            cap,
            attempt: 0,
        }
    }

    pub fn next_delay(&mut self) -> Duration {
        let factor = 1u32.checked_shl(self.attempt).unwrap_or(u32::MAX);
        let delay = cmp::min(self.base.saturating_mul(factor), self.cap);
        self.attempt = self.attempt.saturating_add(1);
        delay
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

/// What a finished run looked like.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub rounds: u32,
    pub registered: Vec<String>,
}

/// Repeats rounds until the desired set is empty.
pub struct Scheduler {
    delay: Duration,
    backoff: AuthBackoff,
}

impl Scheduler {
    pub fn new(delay: Duration, backoff: AuthBackoff) -> Self {
        Self { delay, backoff }
    }

    /// Drive rounds to completion. Every round gets a fresh session from
    /// `make_session` (cookies never leak across rounds), and the whole
    /// future is safe to drop at any await point, so the caller owns
    /// cancellation.
    pub async fn run<T, F>(
        mut self,
        engine: &RegistrationEngine,
        mut desired: DesiredCourses,
        mut make_session: F,
    ) -> anyhow::Result<RunSummary>
    where
        T: Transport,
        F: FnMut() -> Result<T, PortalError>,
    {
        let mut rounds = 0u32;
        let mut registered = Vec::new();

        loop {
            rounds += 1;
            let transport = make_session()?;

            match engine.run_round(&transport, &mut desired).await {
                Ok(report) => {
                    self.backoff.reset();
                    registered.extend(report.confirmed.iter().cloned());
                    if report.complete {
                        info!(rounds, "✓ every desired course is registered");
                        return Ok(RunSummary { rounds, registered });
                    }
                    info!(
                        deferred = ?report.deferred,
                        delay_ms = self.delay.as_millis() as u64,
                        "courses still pending, sleeping before next round"
                    );
                    tokio::time::sleep(self.delay).await;
                }
                Err(e) if e.source.is_auth_rejected() => {
                    let delay = self.backoff.next_delay();
                    warn!(
                        delay_ms = delay.as_millis() as u64,
                        "login rejected, backing off before retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    // Reached the portal, so credentials are fine; the
                    // failure is transient and worth retrying fast.
                    self.backoff.reset();
                    warn!(error = %e, "round failed, retrying immediately");
                }
            }
        }
    }
}
