// Copyright 2026 the Barrage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Asynchronous position polling.
//!
//! [`spawn`] starts a task that asks a [`MediaSource`] for the current sample
//! at a fixed interval and posts each result into the mailbox. Failures and
//! timeouts post nothing and widen the interval through [`Backoff`]; the task
//! keeps retrying until [`PollerHandle::shutdown`].

use std::sync::Arc;
use std::time::Duration;

use barrage_core::source::MediaSource;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::mailbox::{MailboxSender, Report};

/// Largest power of two applied to the base interval.
const MAX_DOUBLINGS: u32 = 16;

/// Polling cadence and failure handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollerConfig {
    /// Interval between polls while the source is healthy.
    pub interval: Duration,
    /// Upper bound for the widened interval.
    pub max_interval: Duration,
    /// Consecutive failures tolerated before the interval widens.
    pub failure_threshold: u32,
    /// Time allowed for a single poll.
    pub poll_timeout: Duration,
}

impl PollerConfig {
    /// Ten polls per second, backing off to one every two seconds.
    #[must_use]
    pub const fn desktop() -> Self {
        Self {
            interval: Duration::from_millis(100),
            max_interval: Duration::from_secs(2),
            failure_threshold: 3,
            poll_timeout: Duration::from_secs(1),
        }
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self::desktop()
    }
}

/// Consecutive-failure counter that doubles the retry interval.
///
/// Below the threshold the base interval is used. Each failure from the
/// threshold on doubles it, up to the maximum. A success resets it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    threshold: u32,
    failures: u32,
}

impl Backoff {
    /// Creates a counter with no failures.
    #[must_use]
    pub const fn new(config: &PollerConfig) -> Self {
        Self {
            base: config.interval,
            max: config.max_interval,
            threshold: config.failure_threshold,
            failures: 0,
        }
    }

    /// Consecutive failures so far.
    #[must_use]
    pub const fn failures(&self) -> u32 {
        self.failures
    }

    /// Interval before the next poll.
    #[must_use]
    pub fn interval(&self) -> Duration {
        if self.failures < self.threshold {
            return self.base;
        }
        let doublings = (self.failures - self.threshold + 1).min(MAX_DOUBLINGS);
        self.base.saturating_mul(1 << doublings).min(self.max.max(self.base))
    }

    /// Records a failure and returns the new interval.
    pub fn on_failure(&mut self) -> Duration {
        self.failures = self.failures.saturating_add(1);
        self.interval()
    }

    /// Records a success.
    pub fn on_success(&mut self) {
        self.failures = 0;
    }
}

/// How a poller task ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// The task observed the stop signal and returned.
    Clean,
    /// The grace period elapsed and the task was aborted.
    Forced,
    /// The task had panicked.
    Panicked,
}

/// Owner of a running poller task.
///
/// Dropping the handle aborts the task.
#[derive(Debug)]
pub struct PollerHandle {
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Whether the task has returned.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Signals the task, cancelling any in-flight poll, and waits up to
    /// `grace` for it to return before aborting it.
    pub async fn shutdown(mut self, grace: Duration) -> ShutdownOutcome {
        if let Some(stop) = self.stop.take() {
            // The task may already be gone; that is a clean stop too.
            let _ = stop.send(());
        }
        match tokio::time::timeout(grace, &mut self.task).await {
            Ok(Ok(())) => ShutdownOutcome::Clean,
            Ok(Err(err)) if err.is_panic() => {
                log::warn!("position poller panicked: {err}");
                ShutdownOutcome::Panicked
            }
            Ok(Err(_)) => ShutdownOutcome::Clean,
            Err(_) => {
                self.task.abort();
                log::warn!("position poller did not stop within {grace:?}, aborting it");
                ShutdownOutcome::Forced
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Starts polling `media` on `handle`, posting results to `sender`.
pub fn spawn<M: MediaSource>(
    handle: &Handle,
    media: Arc<M>,
    sender: MailboxSender,
    config: PollerConfig,
) -> PollerHandle {
    let (stop_tx, stop_rx) = oneshot::channel();
    let task = handle.spawn(run(media, sender, config, stop_rx));
    PollerHandle {
        stop: Some(stop_tx),
        task,
    }
}

async fn run<M: MediaSource>(
    media: Arc<M>,
    sender: MailboxSender,
    config: PollerConfig,
    mut stop: oneshot::Receiver<()>,
) {
    let mut backoff = Backoff::new(&config);
    log::debug!("position poller started, every {:?}", config.interval);
    loop {
        let polled = tokio::select! {
            biased;
            _ = &mut stop => break,
            polled = tokio::time::timeout(config.poll_timeout, media.current_sample()) => polled,
        };
        let wait = match polled {
            Ok(Ok(sample)) => {
                backoff.on_success();
                sender.post(sample.map_or(Report::NoSession, Report::Sample));
                backoff.interval()
            }
            Ok(Err(err)) => {
                let wait = backoff.on_failure();
                log::debug!(
                    "position poll failed ({} in a row): {err}; next in {wait:?}",
                    backoff.failures()
                );
                wait
            }
            Err(_) => {
                let wait = backoff.on_failure();
                log::debug!(
                    "position poll timed out after {:?} ({} in a row); next in {wait:?}",
                    config.poll_timeout,
                    backoff.failures()
                );
                wait
            }
        };
        tokio::select! {
            biased;
            _ = &mut stop => break,
            () = tokio::time::sleep(wait) => {}
        }
    }
    log::debug!("position poller stopped");
}
