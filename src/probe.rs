//! Backend readiness probing.
//!
//! Before anyone logs in, the client polls the login route until the gateway
//! and identity service both answer. Polling uses a fixed delay with no
//! attempt limit, and stops for good once a session exists.

use crate::api::{ApiClient, ProbeResponse};
use crate::session::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Readiness as seen by the login form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    WarmingUp,
    Ready,
    /// A session was established before the backend was seen ready.
    Superseded,
}

/// How a probe run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Ready { attempts: u32 },
    Superseded { attempts: u32 },
}

impl ProbeOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            ProbeOutcome::Ready { attempts } | ProbeOutcome::Superseded { attempts } => *attempts,
        }
    }

    /// Retries performed after the first attempt.
    pub fn retries(&self) -> u32 {
        self.attempts().saturating_sub(1)
    }

    pub fn readiness(&self) -> Readiness {
        match self {
            ProbeOutcome::Ready { .. } => Readiness::Ready,
            ProbeOutcome::Superseded { .. } => Readiness::Superseded,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReadinessProbe {
    api: ApiClient,
    session: Arc<SessionStore>,
    retry_delay: Duration,
}

impl ReadinessProbe {
    pub fn new(api: ApiClient, session: Arc<SessionStore>) -> Self {
        Self {
            api,
            session,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Probe until the backend is ready or a session makes probing moot.
    pub async fn await_ready(&self) -> ProbeOutcome {
        let mut session_rx = self.session.subscribe();
        let mut attempts = 0u32;

        loop {
            if self.session.is_authenticated() {
                return ProbeOutcome::Superseded { attempts };
            }

            attempts += 1;
            let response = self.api.probe().await;

            // A login may have completed while the request was in flight.
            if self.session.is_authenticated() {
                debug!(attempt = attempts, "discarding probe result after login");
                return ProbeOutcome::Superseded { attempts };
            }

            if response.is_ready() {
                info!(attempt = attempts, ?response, "backend ready");
                return ProbeOutcome::Ready { attempts };
            }
            match response {
                ProbeResponse::ServerError(status) => {
                    debug!(attempt = attempts, status, "backend warming up");
                }
                _ => debug!(attempt = attempts, "gateway unreachable"),
            }

            tokio::select! {
                _ = tokio::time::sleep(self.retry_delay) => {}
                _ = session_established(&mut session_rx) => {
                    return ProbeOutcome::Superseded { attempts };
                }
            }
        }
    }

    /// Run the probe in the background, publishing readiness on a watch channel.
    pub fn spawn(self) -> ReadinessHandle {
        let (tx, rx) = watch::channel(Readiness::WarmingUp);
        let task = tokio::spawn(async move {
            let outcome = self.await_ready().await;
            tx.send_replace(outcome.readiness());
            outcome
        });
        ReadinessHandle { rx, task }
    }
}

async fn session_established(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|authenticated| *authenticated).await.is_err() {
        // The store is gone; only the sleep arm can fire from here on.
        std::future::pending::<()>().await;
    }
}

/// Handle to a background probe.
#[derive(Debug)]
pub struct ReadinessHandle {
    rx: watch::Receiver<Readiness>,
    task: JoinHandle<ProbeOutcome>,
}

impl ReadinessHandle {
    /// Current readiness without waiting.
    pub fn current(&self) -> Readiness {
        *self.rx.borrow()
    }

    /// Whether the login form may be submitted.
    pub fn login_enabled(&self) -> bool {
        self.current() == Readiness::Ready
    }

    pub fn subscribe(&self) -> watch::Receiver<Readiness> {
        self.rx.clone()
    }

    /// Wait for the probe to finish.
    pub async fn finished(self) -> Option<ProbeOutcome> {
        self.task.await.ok()
    }
}
