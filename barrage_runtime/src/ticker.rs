// Copyright 2026 the Barrage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-rate animation thread.
//!
//! [`Ticker`] moves a [`Session`] onto a dedicated thread and calls
//! [`Session::tick`] at the configured animation rate, publishing each
//! [`Frame`] into a [`FrameSlot`] for the renderer. A tick that runs late is
//! not made up with a burst; the schedule restarts from the late tick.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use barrage_core::controller::Frame;
use barrage_core::glyph::GlyphSource;
use barrage_core::source::{ForegroundProbe, MediaSource};
use barrage_core::time::Clock;
use parking_lot::Mutex;

use crate::error::SessionError;
use crate::session::Session;

/// Latest frame, shared between the ticker and the renderer.
#[derive(Clone, Debug, Default)]
pub struct FrameSlot(Arc<Mutex<Option<Frame>>>);

impl FrameSlot {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored frame.
    pub fn publish(&self, frame: Frame) {
        *self.0.lock() = Some(frame);
    }

    /// A copy of the newest frame.
    #[must_use]
    pub fn latest(&self) -> Option<Frame> {
        self.0.lock().clone()
    }

    /// Removes and returns the newest frame.
    #[must_use]
    pub fn take(&self) -> Option<Frame> {
        self.0.lock().take()
    }
}

/// A running animation thread.
pub struct Ticker<M, F, G, C> {
    stop: Arc<AtomicBool>,
    interval: Duration,
    thread: JoinHandle<Session<M, F, G, C>>,
}

impl<M, F, G, C> fmt::Debug for Ticker<M, F, G, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ticker")
            .field("interval", &self.interval)
            .field("stopping", &self.stop.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<M, F, G, C> Ticker<M, F, G, C>
where
    M: MediaSource,
    F: ForegroundProbe + Send + 'static,
    G: GlyphSource + Send + 'static,
    C: Clock,
{
    /// Starts ticking `session` at its frame interval.
    pub fn spawn(session: Session<M, F, G, C>, slot: FrameSlot) -> Result<Self, SessionError> {
        let interval = session.frame_interval();
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let thread = thread::Builder::new()
            .name("barrage-ticker".into())
            .spawn(move || run(session, &slot, interval, &flag))
            .map_err(SessionError::Spawn)?;
        log::debug!("ticker started at {interval:?}");
        Ok(Self {
            stop,
            interval,
            thread,
        })
    }

    /// Tick interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Stops ticking and hands the session back to the caller.
    ///
    /// The session is returned still running; call [`Session::stop`] to end
    /// it.
    pub fn stop(self) -> Result<Session<M, F, G, C>, SessionError> {
        self.stop.store(true, Ordering::Release);
        self.thread.join().map_err(|_| SessionError::TickerPanicked)
    }
}

fn run<M, F, G, C>(
    mut session: Session<M, F, G, C>,
    slot: &FrameSlot,
    interval: Duration,
    stop: &AtomicBool,
) -> Session<M, F, G, C>
where
    M: MediaSource,
    F: ForegroundProbe,
    G: GlyphSource,
    C: Clock,
{
    let mut next = Instant::now();
    while !stop.load(Ordering::Acquire) {
        slot.publish(session.tick());
        next += interval;
        let now = Instant::now();
        if next > now {
            thread::sleep(next - now);
        } else {
            next = now;
        }
    }
    session
}
