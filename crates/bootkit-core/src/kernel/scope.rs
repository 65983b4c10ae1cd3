use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation and deadline carried into every lifecycle call.
///
/// A scope is done once its token is cancelled or its deadline passes,
/// whichever comes first. Entries are expected to watch [`Scope::done`] in
/// long-running work; nothing forces them to.
///
/// Child scopes (from [`Scope::child`] or [`Scope::with_timeout`]) are
/// cancelled together with their parent and never outlive its deadline.
#[derive(Debug, Clone)]
pub struct Scope {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Scope {
    /// Root scope: never cancelled unless asked, no deadline.
    pub fn background() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Child scope sharing this scope's deadline.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Child scope whose deadline is `timeout` from now, capped by ours.
    /// A timeout too large to represent as an instant adds no deadline of its own.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let deadline = match (self.deadline, Instant::now().checked_add(timeout)) {
            (Some(current), Some(candidate)) => Some(current.min(candidate)),
            (current, None) => current,
            (None, candidate) => candidate,
        };
        Self {
            token: self.token.child_token(),
            deadline,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Cancel this scope and all of its children.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.deadline, Some(d) if Instant::now() >= d)
    }

    pub fn is_done(&self) -> bool {
        self.is_cancelled() || self.is_expired()
    }

    /// Resolves once the scope is cancelled or its deadline passes.
    pub async fn done(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }

    /// Token for handing to background tasks that only care about cancellation.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::background()
    }
}
