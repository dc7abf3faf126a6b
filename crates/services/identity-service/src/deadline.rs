//! Per-request time budget.

use std::future::Future;
use std::time::Duration;

use tokio::time::{timeout_at, Instant};

use common::{AppError, AppResult};

/// Longest budget a deadline will honour; larger budgets are clamped to it
pub const MAX_BUDGET: Duration = Duration::from_secs(24 * 60 * 60);

/// Point in time after which a request's remaining work is abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    /// Deadline `budget` from now, clamped to `MAX_BUDGET`.
    pub fn after(budget: Duration) -> Self {
        let now = Instant::now();
        let at = now.checked_add(budget.min(MAX_BUDGET)).unwrap_or(now);
        Self { at }
    }

    pub fn at(instant: Instant) -> Self {
        Self { at: instant }
    }

    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.at
    }

    /// Await `fut`, failing with `AppError::Timeout(op)` once the deadline passes.
    pub async fn run<F, T, E>(&self, op: &str, fut: F) -> AppResult<T>
    where
        F: Future<Output = Result<T, E>>,
        AppError: From<E>,
    {
        match timeout_at(self.at, fut).await {
            Ok(result) => result.map_err(AppError::from),
            Err(_) => Err(AppError::timeout(op)),
        }
    }

    /// Run CPU-bound work on the blocking pool under the deadline.
    ///
    /// On expiry the caller stops waiting; the blocking task runs to completion
    /// in the background and its result is dropped.
    pub async fn run_blocking<F, T>(&self, op: &str, f: F) -> AppResult<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let handle = tokio::task::spawn_blocking(f);
        match timeout_at(self.at, handle).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(join)) => Err(AppError::internal(format!("{} task failed: {}", op, join))),
            Err(_) => Err(AppError::timeout(op)),
        }
    }
}
