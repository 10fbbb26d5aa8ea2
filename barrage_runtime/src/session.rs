// Copyright 2026 the Barrage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session lifecycle.
//!
//! A [`Session`] owns the [`SyncController`], a small tokio runtime for the
//! position poller, and the mailbox between them. Everything that mutates the
//! lane tables and pool runs on the thread calling [`Session::tick`]; the
//! poller only posts reports.
//!
//! ```text
//!   Idle ──start──► Running ──stop──► Stopping ──poller joined──► Idle
//!                                                                  │
//!   restart = stop, then start with the retained timeline ◄────────┘
//! ```
//!
//! The runtime has two workers, so a media source that blocks one of them
//! inside a call cannot also stall the timers that bound discovery and
//! shutdown.
//!
//! `start`, `stop`, and `restart` block on the runtime and must not be
//! called from inside an async context. Dropping a session aborts the poller
//! and releases the runtime without waiting for its workers.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use barrage_core::config::EngineConfig;
use barrage_core::controller::{Frame, SyncController};
use barrage_core::error::StartError;
use barrage_core::glyph::GlyphSource;
use barrage_core::source::{ForegroundProbe, MediaSource, SourceInfo};
use barrage_core::time::Clock;
use barrage_core::timeline::Timeline;
use tokio::runtime::{Handle, Runtime};

use crate::error::SessionError;
use crate::mailbox::{self, MailboxReceiver};
use crate::poller::{self, PollerConfig, PollerHandle, ShutdownOutcome};

/// Lifecycle phase of a [`Session`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No session; `start` is allowed.
    Idle,
    /// Polling and ticking.
    Running,
    /// Waiting for the poller to finish.
    Stopping,
}

/// Runtime settings that are not part of the engine snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionOptions {
    /// Poller cadence and back-off.
    pub poller: PollerConfig,
    /// How long `stop` waits for the poller before aborting it.
    pub shutdown_grace: Duration,
}

impl SessionOptions {
    /// Desktop poller settings and a 500 ms shutdown grace.
    #[must_use]
    pub const fn desktop() -> Self {
        Self {
            poller: PollerConfig::desktop(),
            shutdown_grace: Duration::from_millis(500),
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::desktop()
    }
}

/// Runtime workers: one for the poller, one left free for timers.
const WORKER_THREADS: usize = 2;

/// A danmaku session bound to a media source, a focus probe, and a clock.
pub struct Session<M, F, G, C> {
    /// Only taken on drop.
    runtime: Option<Runtime>,
    handle: Handle,
    media: Arc<M>,
    probe: F,
    clock: C,
    controller: SyncController<G>,
    options: SessionOptions,
    phase: Phase,
    poller: Option<PollerHandle>,
    mailbox: Option<MailboxReceiver>,
    retained: Option<(Arc<Timeline>, EngineConfig)>,
}

impl<M, F, G, C> fmt::Debug for Session<M, F, G, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("phase", &self.phase)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<M, F, G, C> Session<M, F, G, C>
where
    M: MediaSource,
    F: ForegroundProbe,
    G: GlyphSource,
    C: Clock,
{
    /// Creates an idle session.
    pub fn new(
        media: M,
        probe: F,
        glyphs: G,
        clock: C,
        options: SessionOptions,
    ) -> Result<Self, SessionError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(WORKER_THREADS)
            .thread_name("barrage-poller")
            .enable_time()
            .build()
            .map_err(SessionError::Runtime)?;
        Ok(Self {
            handle: runtime.handle().clone(),
            runtime: Some(runtime),
            media: Arc::new(media),
            probe,
            clock,
            controller: SyncController::new(glyphs),
            options,
            phase: Phase::Idle,
            poller: None,
            mailbox: None,
            retained: None,
        })
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// The controller, for inspecting state and metrics.
    #[must_use]
    pub const fn controller(&self) -> &SyncController<G> {
        &self.controller
    }

    /// The clock ticks are stamped with.
    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Animation tick interval of the current (or last) configuration.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        match &self.retained {
            Some((_, config)) => config.frame_interval(),
            None => EngineConfig::desktop().frame_interval(),
        }
    }

    /// Starts the controller, logs the available media sources, and starts
    /// polling.
    pub fn start(
        &mut self,
        timeline: Arc<Timeline>,
        config: EngineConfig,
    ) -> Result<(), SessionError> {
        if self.phase != Phase::Idle {
            return Err(StartError::AlreadyRunning.into());
        }
        self.controller.start(Arc::clone(&timeline), config.clone())?;
        self.discover_sources(config.target_source.as_deref());

        let (sender, receiver) = mailbox::channel();
        self.poller = Some(poller::spawn(
            &self.handle,
            Arc::clone(&self.media),
            sender,
            self.options.poller,
        ));
        self.mailbox = Some(receiver);
        self.retained = Some((timeline, config));
        self.phase = Phase::Running;
        Ok(())
    }

    fn discover_sources(&self, target: Option<&str>) {
        let media = Arc::clone(&self.media);
        let timeout = self.options.poller.poll_timeout;
        let mut listing = self.handle.spawn(async move { media.list_sources().await });
        let listed = self.handle.block_on(async { tokio::time::timeout(timeout, &mut listing).await });
        let sources: Vec<SourceInfo> = match listed {
            Ok(Ok(Ok(sources))) => sources,
            Ok(Ok(Err(err))) => {
                log::warn!("could not list media sources: {err}");
                return;
            }
            Ok(Err(err)) => {
                log::warn!("media source listing failed: {err}");
                return;
            }
            Err(_) => {
                listing.abort();
                log::warn!("listing media sources timed out after {timeout:?}");
                return;
            }
        };
        for source in &sources {
            log::info!("media source {:?}: {}", source.id, source.label);
        }
        match target {
            Some(target) if sources.iter().any(|s| s.id == target) => {
                log::info!("following media source {target:?}");
            }
            Some(target) => log::info!("media source {target:?} is not active yet"),
            None => log::info!("following any media source ({} found)", sources.len()),
        }
    }

    /// Applies the newest poll report, if any, then runs one animation tick.
    pub fn tick(&mut self) -> Frame {
        let now = self.clock.now();
        if let Some(report) = self.mailbox.as_mut().and_then(MailboxReceiver::take) {
            let outcome = self.controller.on_sample(report.sample(), &self.probe, now);
            log::trace!("{report:?} -> {outcome:?}");
        }
        self.controller.tick(now)
    }

    /// Stops polling and tears down the controller's session state.
    ///
    /// Waits up to the configured grace for the poller, then aborts it.
    /// Returns `None` when already idle.
    pub fn stop(&mut self) -> Option<ShutdownOutcome> {
        if self.phase == Phase::Idle {
            return None;
        }
        self.phase = Phase::Stopping;
        let grace = self.options.shutdown_grace;
        let outcome = match self.poller.take() {
            Some(poller) => self.handle.block_on(poller.shutdown(grace)),
            None => ShutdownOutcome::Clean,
        };
        self.mailbox = None;
        self.controller.stop();
        self.phase = Phase::Idle;
        log::info!("session stopped ({outcome:?})");
        Some(outcome)
    }

    /// Stops, then starts again with the retained timeline and either
    /// `config` or the previous configuration.
    pub fn restart(&mut self, config: Option<EngineConfig>) -> Result<(), SessionError> {
        let Some((timeline, previous)) = self.retained.clone() else {
            return Err(SessionError::NeverStarted);
        };
        self.stop();
        self.start(timeline, config.unwrap_or(previous))
    }
}

impl<M, F, G, C> Drop for Session<M, F, G, C> {
    fn drop(&mut self) {
        drop(self.poller.take());
        if let Some(runtime) = self.runtime.take() {
            // A worker may still be inside a blocking media call.
            runtime.shutdown_background();
        }
    }
}
