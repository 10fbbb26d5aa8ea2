// Copyright 2026 the Barrage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable diagnostics output.
//!
//! [`PrettyWriter`] writes one line per [`OverlayStats`] snapshot to a
//! [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use barrage_core::controller::{ControllerState, Playback, Visibility};

use crate::overlay::OverlayStats;

/// Writes human-readable stats lines to a [`Write`](std::io::Write) destination.
pub struct PrettyWriter<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyWriter").finish_non_exhaustive()
    }
}

impl PrettyWriter {
    /// Creates a writer to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a writer to a boxed destination.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyWriter<W> {
    /// Creates a writer to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the writer and returns the destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Writes one line for `stats`. Write errors are ignored.
    pub fn write_stats(&mut self, stats: &OverlayStats) {
        let _ = writeln!(
            self.writer,
            "[{:>9.3}s] {} {} fps={:.1} cpu={:.1}% mem={:.1}MB total={} active={} free={} \
             painted={} dropped={}/{} seeks={}",
            stats.at,
            state_name(stats.state),
            visibility_name(stats.visibility),
            stats.fps,
            stats.cpu_percent,
            stats.memory_mb,
            stats.total,
            stats.active,
            stats.free,
            stats.painted,
            stats.dropped_no_lane,
            stats.dropped_exhausted,
            stats.seeks,
        );
    }
}

fn state_name(state: ControllerState) -> &'static str {
    match state {
        ControllerState::Stopped => "stopped",
        ControllerState::Starting => "starting",
        ControllerState::Running(Playback::Playing) => "playing",
        ControllerState::Running(Playback::Paused) => "paused",
        ControllerState::Hidden => "hidden",
    }
}

fn visibility_name(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::OnTop => "on-top",
        Visibility::Normal => "shown",
        Visibility::Hidden => "off",
    }
}
