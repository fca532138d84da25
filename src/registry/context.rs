//! Per-request cancellation and deadlines
//!
//! Every registry operation takes a [`RequestContext`]. Cancelling its token or
//! passing its deadline aborts the in-flight request and drops the underlying
//! connection.

use crate::error::{RegistryError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// Context that is never cancelled and has no deadline
    pub fn new() -> Self {
        Self::default()
    }

    /// Context tied to an existing cancellation token
    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            deadline: None,
        }
    }

    /// Tighten the deadline to `timeout` from now. An earlier deadline wins.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// Child context: cancelled with this one, but cancelling it leaves the parent alone
    pub fn child(&self) -> Self {
        Self {
            cancel: self.cancel.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Error if the context is already cancelled or past its deadline
    pub fn check(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(RegistryError::Cancelled);
        }
        if self.deadline.is_some_and(|d| d <= Instant::now()) {
            return Err(RegistryError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Resolves once the context is cancelled or its deadline passes
    pub async fn done(&self) -> RegistryError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = self.cancel.cancelled() => RegistryError::Cancelled,
                _ = tokio::time::sleep_until(deadline) => RegistryError::DeadlineExceeded,
            },
            None => {
                self.cancel.cancelled().await;
                RegistryError::Cancelled
            }
        }
    }

    /// Drive `fut` to completion unless the context finishes first.
    /// `fut` is dropped on cancellation, which aborts any request it owns.
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check()?;
        tokio::select! {
            biased;
            err = self.done() => Err(err),
            result = fut => result,
        }
    }
}
