// Copyright 2026 the Barrage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diagnostics overlay model.
//!
//! [`DebugOverlay::observe`] is called with every frame. It keeps the last
//! [`FPS_WINDOW`] tick timestamps to compute a rolling tick rate, refreshes
//! process usage every [`USAGE_EVERY`] frames, and returns an
//! [`OverlayStats`] snapshot that a renderer can draw as text in the
//! configured [`OverlayCorner`].

use barrage_core::controller::{ControllerState, Frame, Visibility};
use barrage_core::time::HostTime;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

use crate::usage::{ProcessUsage, SysinfoUsage, USAGE_EVERY, UsageSource};

/// Tick timestamps kept for the rate estimate.
pub const FPS_WINDOW: usize = 60;

/// Viewport corner the overlay panel is anchored to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverlayCorner {
    /// Upper left.
    TopLeft,
    /// Upper right.
    TopRight,
    /// Lower left.
    #[default]
    BottomLeft,
    /// Lower right.
    BottomRight,
}

impl OverlayCorner {
    /// Top-left position of a `panel` in `viewport`, inset by `margin`.
    #[must_use]
    pub fn anchor(self, viewport: Size, panel: Size, margin: f64) -> Point {
        let left = margin;
        let right = viewport.width - panel.width - margin;
        let top = margin;
        let bottom = viewport.height - panel.height - margin;
        match self {
            Self::TopLeft => Point::new(left, top),
            Self::TopRight => Point::new(right, top),
            Self::BottomLeft => Point::new(left, bottom),
            Self::BottomRight => Point::new(right, bottom),
        }
    }
}

/// Overlay settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Draw the overlay at all.
    pub enabled: bool,
    /// Anchor corner.
    pub corner: OverlayCorner,
    /// Inset from the viewport edges, in pixels.
    pub margin: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            corner: OverlayCorner::BottomLeft,
            margin: 10.0,
        }
    }
}

/// Rolling tick-rate estimate over the last `N` timestamps.
#[derive(Clone, Debug)]
pub struct FpsTracker<const N: usize> {
    stamps: [HostTime; N],
    cursor: usize,
    filled: usize,
}

impl<const N: usize> Default for FpsTracker<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> FpsTracker<N> {
    /// Creates an empty tracker.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stamps: [HostTime::ZERO; N],
            cursor: 0,
            filled: 0,
        }
    }

    /// Records one tick.
    pub fn observe(&mut self, now: HostTime) {
        if N == 0 {
            return;
        }
        self.stamps[self.cursor] = now;
        self.cursor = (self.cursor + 1) % N;
        self.filled = (self.filled + 1).min(N);
    }

    /// Ticks per second across the window, or zero with fewer than two
    /// samples or no elapsed time.
    #[must_use]
    pub fn fps(&self) -> f64 {
        if self.filled < 2 {
            return 0.0;
        }
        let newest = self.stamps[(self.cursor + N - 1) % N];
        let oldest = self.stamps[(self.cursor + N - self.filled) % N];
        let span = newest.saturating_duration_since(oldest).as_secs_f64();
        if span > 0.0 {
            (self.filled - 1) as f64 / span
        } else {
            0.0
        }
    }

    /// Recorded samples, at most `N`.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.filled
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.filled == 0
    }
}

/// One diagnostics snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct OverlayStats {
    /// Tick time in seconds.
    pub at: f64,
    /// Rolling tick rate.
    pub fps: f64,
    /// Process CPU use, in percent of one core, as of the last refresh.
    pub cpu_percent: f32,
    /// Process resident memory in MiB, as of the last refresh.
    pub memory_mb: f64,
    /// Entries in the timeline.
    pub total: usize,
    /// Active entities.
    pub active: usize,
    /// Free pool slots.
    pub free: usize,
    /// Entities painted this tick.
    pub painted: usize,
    /// Spawns dropped for lack of a lane.
    pub dropped_no_lane: u64,
    /// Spawns dropped for lack of a slot.
    pub dropped_exhausted: u64,
    /// Seeks since start.
    pub seeks: u64,
    /// Controller state.
    pub state: ControllerState,
    /// Window presentation.
    pub visibility: Visibility,
}

impl OverlayStats {
    /// Panel text, one entry per line.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("FPS: {:.1}", self.fps),
            format!("CPU: {:.1}%", self.cpu_percent),
            format!("Mem: {:.1} MB", self.memory_mb),
            format!("Total: {}", self.total),
            format!("Active: {}", self.active),
            format!("Free: {}", self.free),
            format!(
                "Dropped: {} (no lane) / {} (pool)",
                self.dropped_no_lane, self.dropped_exhausted
            ),
            format!("Seeks: {}", self.seeks),
        ]
    }
}

/// Collects per-frame diagnostics.
#[derive(Debug)]
pub struct DebugOverlay<U = SysinfoUsage> {
    config: OverlayConfig,
    fps: FpsTracker<FPS_WINDOW>,
    usage: U,
    frames_since_usage: u32,
    last_usage: ProcessUsage,
}

impl Default for DebugOverlay {
    fn default() -> Self {
        Self::new(OverlayConfig::default())
    }
}

impl DebugOverlay {
    /// Creates an overlay with `config`, reading this process's usage.
    #[must_use]
    pub fn new(config: OverlayConfig) -> Self {
        Self::with_usage(config, SysinfoUsage::new())
    }
}

impl<U: UsageSource> DebugOverlay<U> {
    /// Creates an overlay with `config` and a custom usage source.
    #[must_use]
    pub fn with_usage(config: OverlayConfig, usage: U) -> Self {
        Self {
            config,
            fps: FpsTracker::new(),
            usage,
            frames_since_usage: 0,
            last_usage: ProcessUsage::default(),
        }
    }

    /// Settings.
    #[must_use]
    pub const fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// The usage source.
    #[must_use]
    pub const fn usage(&self) -> &U {
        &self.usage
    }

    /// Records `frame` and returns the resulting snapshot.
    ///
    /// Usage is refreshed on every [`USAGE_EVERY`]th call; other snapshots
    /// repeat the last reading, which starts at zero.
    pub fn observe(&mut self, frame: &Frame) -> OverlayStats {
        self.fps.observe(frame.now);
        self.frames_since_usage += 1;
        if self.frames_since_usage >= USAGE_EVERY {
            self.frames_since_usage = 0;
            if let Some(reading) = self.usage.refresh() {
                self.last_usage = reading;
            }
        }
        let metrics = &frame.metrics;
        OverlayStats {
            at: frame.now.as_secs_f64(),
            fps: self.fps.fps(),
            cpu_percent: self.last_usage.cpu_percent,
            memory_mb: self.last_usage.memory_mb,
            total: metrics.total_entries,
            active: metrics.active,
            free: metrics.free,
            painted: frame.items.len(),
            dropped_no_lane: metrics.dropped_no_lane,
            dropped_exhausted: metrics.dropped_exhausted,
            seeks: metrics.seeks,
            state: frame.state,
            visibility: frame.visibility,
        }
    }

    /// Where to draw a panel of `lines` text lines of `line_height` pixels
    /// and `width` pixels in `viewport`.
    #[must_use]
    pub fn panel_origin(
        &self,
        viewport: Size,
        width: f64,
        lines: usize,
        line_height: f64,
    ) -> Point {
        let panel = Size::new(width, lines as f64 * line_height);
        self.config.corner.anchor(viewport, panel, self.config.margin)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use barrage_core::controller::Metrics;

    use super::*;

    /// Counts refreshes and reports a reading derived from the count.
    #[derive(Debug, Default)]
    struct Counting {
        refreshes: u32,
    }

    impl UsageSource for Counting {
        fn refresh(&mut self) -> Option<ProcessUsage> {
            self.refreshes += 1;
            Some(ProcessUsage {
                cpu_percent: 12.5 * self.refreshes as f32,
                memory_mb: 100.0 + f64::from(self.refreshes),
            })
        }
    }

    fn overlay() -> DebugOverlay<Counting> {
        DebugOverlay::with_usage(OverlayConfig::default(), Counting::default())
    }

    fn frame(now: HostTime) -> Frame {
        Frame {
            now,
            items: Vec::new(),
            visibility: Visibility::OnTop,
            state: ControllerState::Starting,
            metrics: Metrics {
                total_entries: 120,
                active: 7,
                free: 193,
                spawned: 9,
                dropped_no_lane: 2,
                dropped_exhausted: 0,
                seeks: 1,
            },
        }
    }

    #[test]
    fn fps_over_steady_ticks() {
        let mut tracker = FpsTracker::<8>::new();
        assert_eq!(tracker.fps(), 0.0);
        let mut now = HostTime::ZERO;
        for _ in 0..20 {
            tracker.observe(now);
            now = now.saturating_add(Duration::from_millis(20));
        }
        assert_eq!(tracker.len(), 8);
        assert!((tracker.fps() - 50.0).abs() < 1e-9, "fps = {}", tracker.fps());
    }

    #[test]
    fn fps_needs_two_distinct_samples() {
        let mut tracker = FpsTracker::<4>::new();
        tracker.observe(HostTime::ZERO);
        assert_eq!(tracker.fps(), 0.0);
        tracker.observe(HostTime::ZERO);
        assert_eq!(tracker.fps(), 0.0, "no elapsed time");
    }

    #[test]
    fn observe_copies_counters() {
        let mut overlay = overlay();
        let _ = overlay.observe(&frame(HostTime::ZERO));
        let stats = overlay.observe(&frame(HostTime::from_secs_f64(0.5)));
        assert!((stats.fps - 2.0).abs() < 1e-9, "fps = {}", stats.fps);
        assert_eq!((stats.total, stats.active, stats.free), (120, 7, 193));
        assert_eq!(stats.dropped_no_lane, 2);
        assert_eq!(stats.seeks, 1);
        let lines = stats.lines();
        assert_eq!(lines[0], "FPS: 2.0");
        assert_eq!(lines[1], "CPU: 0.0%");
        assert_eq!(lines[2], "Mem: 0.0 MB");
        assert_eq!(lines[4], "Active: 7");
    }

    #[test]
    fn usage_is_refreshed_every_thirty_frames() {
        let mut overlay = overlay();
        let mut now = HostTime::ZERO;
        let mut observe = |overlay: &mut DebugOverlay<Counting>| {
            now = now.saturating_add(Duration::from_millis(16));
            overlay.observe(&frame(now))
        };

        for _ in 1..USAGE_EVERY {
            let stats = observe(&mut overlay);
            assert_eq!(stats.cpu_percent, 0.0, "no reading before the first refresh");
        }
        assert_eq!(overlay.usage().refreshes, 0);

        let stats = observe(&mut overlay);
        assert_eq!(overlay.usage().refreshes, 1);
        assert_eq!((stats.cpu_percent, stats.memory_mb), (12.5, 101.0));
        assert_eq!(stats.lines()[1], "CPU: 12.5%");
        assert_eq!(stats.lines()[2], "Mem: 101.0 MB");

        for _ in 1..USAGE_EVERY {
            let stats = observe(&mut overlay);
            assert_eq!(stats.cpu_percent, 12.5, "last reading is repeated");
        }
        assert_eq!(overlay.usage().refreshes, 1);
        let stats = observe(&mut overlay);
        assert_eq!(overlay.usage().refreshes, 2);
        assert_eq!(stats.memory_mb, 102.0);
    }

    #[test]
    fn failed_refresh_keeps_last_reading() {
        #[derive(Debug)]
        struct Gone;
        impl UsageSource for Gone {
            fn refresh(&mut self) -> Option<ProcessUsage> {
                None
            }
        }
        let mut overlay = DebugOverlay::with_usage(OverlayConfig::default(), Gone);
        let mut stats = overlay.observe(&frame(HostTime::ZERO));
        for _ in 1..USAGE_EVERY {
            stats = overlay.observe(&frame(HostTime::ZERO));
        }
        assert_eq!((stats.cpu_percent, stats.memory_mb), (0.0, 0.0));
    }

    #[test]
    fn default_corner_is_bottom_left() {
        let overlay = DebugOverlay::with_usage(OverlayConfig::default(), Counting::default());
        assert_eq!(overlay.config().corner, OverlayCorner::BottomLeft);
        let origin = overlay.panel_origin(Size::new(800.0, 600.0), 200.0, 6, 20.0);
        assert_eq!(origin, Point::new(10.0, 600.0 - 120.0 - 10.0));
    }

    #[test]
    fn corners_anchor_inside_viewport() {
        let viewport = Size::new(100.0, 50.0);
        let panel = Size::new(40.0, 20.0);
        let at = |corner: OverlayCorner| corner.anchor(viewport, panel, 5.0);
        assert_eq!(at(OverlayCorner::TopLeft), Point::new(5.0, 5.0));
        assert_eq!(at(OverlayCorner::TopRight), Point::new(55.0, 5.0));
        assert_eq!(at(OverlayCorner::BottomRight), Point::new(55.0, 25.0));
    }
}
