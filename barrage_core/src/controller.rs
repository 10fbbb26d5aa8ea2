// Copyright 2026 the Barrage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session orchestration.
//!
//! [`SyncController`] owns the per-session state (timeline cursor, lane
//! tables, entity pool) and drives it from two inputs:
//!
//! - [`on_sample`](SyncController::on_sample): a playback observation. Decides
//!   visibility and pause state, detects seeks, and spawns due entries.
//! - [`tick`](SyncController::tick): a fixed-rate animation tick. Steps and
//!   expires entities while playing and returns the [`Frame`] to paint.
//!
//! ```text
//!   start ──► Starting ──sample──► Running(Playing) ◄──► Running(Paused)
//!                 │                     ▲      │
//!                 └──────sample─────► Hidden ◄─┘
//!
//!   stop (from any state) ──► Stopped
//! ```
//!
//! All mutation happens on the caller's thread; the controller has no
//! interior synchronization.

use std::sync::Arc;
use std::time::Duration;

use kurbo::{Point, Size};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::animate;
use crate::config::EngineConfig;
use crate::entry::{Entry, Mode};
use crate::error::StartError;
use crate::glyph::GlyphSource;
use crate::lanes::TrackScheduler;
use crate::pool::{EntityPool, SlotId, SlotInit};
use crate::render::{RenderCache, RenderItem, RenderStyle};
use crate::source::{ForegroundProbe, PlaybackStatus, PositionSample};
use crate::time::HostTime;
use crate::timeline::{Advance, Cursor, Timeline};

/// Vertical padding between the top edge and the first lane's ascent line.
const TOP_PADDING: f64 = 5.0;

/// Characters of text that add one base speed to a scroll entity.
const CHARS_PER_SPEED_STEP: f64 = 20.0;

/// Whether animation advances while running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Playback {
    /// Entities move and expire.
    Playing,
    /// Entities are retained as-is.
    Paused,
}

/// Lifecycle state of a [`SyncController`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ControllerState {
    /// No session.
    Stopped,
    /// Started, waiting for the first sample.
    Starting,
    /// Following the media session.
    Running(Playback),
    /// Neither the player nor the overlay has focus. Nothing spawns, moves,
    /// or paints.
    Hidden,
}

/// How the renderer should present the overlay window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Visibility {
    /// Shown and kept above the player.
    OnTop,
    /// Shown without staying on top (the overlay itself has focus).
    Normal,
    /// Not shown.
    #[default]
    Hidden,
}

/// Counters sampled once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    /// Entries in the timeline.
    pub total_entries: usize,
    /// Active entities.
    pub active: usize,
    /// Free pool slots.
    pub free: usize,
    /// Entities spawned since start.
    pub spawned: u64,
    /// Spawns dropped because every lane of the mode was busy.
    pub dropped_no_lane: u64,
    /// Spawns dropped because the pool had no free slot.
    pub dropped_exhausted: u64,
    /// Seeks detected since start.
    pub seeks: u64,
}

/// Output of one [`SyncController::tick`].
#[derive(Clone, Debug)]
pub struct Frame {
    /// Tick time.
    pub now: HostTime,
    /// Entities to paint, back to front.
    pub items: Vec<RenderItem>,
    /// Window presentation.
    pub visibility: Visibility,
    /// Controller state after the tick.
    pub state: ControllerState,
    /// Counters after the tick.
    pub metrics: Metrics,
}

/// What a sample did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleOutcome {
    /// No session is running.
    Ignored,
    /// Neither window has focus.
    Hidden,
    /// No session, another source, or not playing.
    Paused,
    /// A seek cleared every entity.
    Seeked {
        /// New cursor index.
        index: usize,
    },
    /// Due entries were processed.
    Advanced {
        /// Entities spawned.
        spawned: usize,
        /// Spawns dropped for lack of a lane or slot.
        dropped: usize,
    },
}

/// Lane geometry derived from the font and viewport.
#[derive(Clone, Copy, Debug)]
struct Placement {
    viewport: Size,
    track_height: f64,
    y_offset: f64,
}

impl Placement {
    fn new<G: GlyphSource>(config: &EngineConfig, glyphs: &G) -> Self {
        let line = glyphs.line_height();
        Self {
            viewport: Size::new(config.viewport_width, config.viewport_height),
            track_height: line + line * config.line_spacing_ratio,
            y_offset: glyphs.ascent() + TOP_PADDING,
        }
    }

    /// Left edge and baseline for a new entity.
    fn origin(&self, mode: Mode, lane: usize, width: f64) -> Point {
        let lane = lane as f64;
        match mode {
            Mode::Scroll => Point::new(
                self.viewport.width,
                lane * self.track_height + self.y_offset,
            ),
            Mode::Top => Point::new(
                (self.viewport.width - width) / 2.0,
                lane * self.track_height + self.y_offset,
            ),
            Mode::Bottom => Point::new(
                (self.viewport.width - width) / 2.0,
                self.viewport.height - (lane + 1.0) * self.track_height,
            ),
        }
    }
}

/// Why a due entry did not become an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Dropped {
    NoLane,
    Exhausted,
}

/// Lanes, pool, and counters: everything a spawn touches.
#[derive(Debug)]
struct Stage {
    lanes: TrackScheduler,
    pool: EntityPool,
    placement: Placement,
    scroll_speed: f64,
    fixed_duration: Duration,
    delta_time: f64,
    opacity: f32,
    spawned: u64,
    dropped_no_lane: u64,
    dropped_exhausted: u64,
    seeks: u64,
}

impl Stage {
    fn spawn<G: GlyphSource>(
        &mut self,
        entry: &Entry,
        now: HostTime,
        glyphs: &G,
    ) -> Result<SlotId, Dropped> {
        // Check the pool first so that a full pool does not burn a lane.
        if self.pool.free_count() == 0 {
            self.dropped_exhausted += 1;
            log::debug!("pool exhausted, dropping {:?}", entry.text);
            return Err(Dropped::Exhausted);
        }
        let width = glyphs.measure(&entry.text).width;
        let Some(lane) = self.lanes.allocate(entry.mode, width, now) else {
            self.dropped_no_lane += 1;
            log::debug!("no free {:?} lane, dropping {:?}", entry.mode, entry.text);
            return Err(Dropped::NoLane);
        };
        let id = match self.pool.acquire() {
            Ok(id) => id,
            Err(err) => {
                self.dropped_exhausted += 1;
                log::debug!("{err}, dropping {:?}", entry.text);
                return Err(Dropped::Exhausted);
            }
        };

        let (velocity, expire_at) = match entry.mode {
            Mode::Scroll => {
                let scale = 1.0 + entry.char_count() as f64 / CHARS_PER_SPEED_STEP;
                (self.scroll_speed * scale, None)
            }
            Mode::Top | Mode::Bottom => (0.0, Some(now.saturating_add(self.fixed_duration))),
        };
        self.pool.init(
            id,
            SlotInit {
                text: Arc::clone(&entry.text),
                color: entry.color,
                mode: entry.mode,
                lane,
                position: self.placement.origin(entry.mode, lane.index, width),
                width,
                velocity,
                spawn_time: now,
                expire_at,
            },
        );
        self.spawned += 1;
        Ok(id)
    }

    fn clear(&mut self) {
        self.pool.release_all();
        self.lanes.clear();
    }
}

/// State that exists only between `start` and `stop`.
#[derive(Debug)]
struct Run {
    timeline: Arc<Timeline>,
    cursor: Cursor,
    stage: Stage,
    target_source: Option<String>,
}

impl Run {
    fn metrics(&self) -> Metrics {
        Metrics {
            total_entries: self.timeline.len(),
            active: self.stage.pool.active_count(),
            free: self.stage.pool.free_count(),
            spawned: self.stage.spawned,
            dropped_no_lane: self.stage.dropped_no_lane,
            dropped_exhausted: self.stage.dropped_exhausted,
            seeks: self.stage.seeks,
        }
    }

    fn accepts(&self, sample: &PositionSample) -> bool {
        self.target_source
            .as_deref()
            .is_none_or(|target| target == sample.source_id)
    }
}

/// Drives timeline, lanes, pool, animation, and rendering from position
/// samples and animation ticks.
#[derive(Debug)]
pub struct SyncController<G> {
    render: RenderCache<G>,
    state: ControllerState,
    visibility: Visibility,
    run: Option<Run>,
}

impl<G: GlyphSource> SyncController<G> {
    /// Creates a stopped controller drawing with `glyphs`.
    #[must_use]
    pub fn new(glyphs: G) -> Self {
        Self {
            render: RenderCache::new(glyphs, RenderStyle::default()),
            state: ControllerState::Stopped,
            visibility: Visibility::Hidden,
            run: None,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ControllerState {
        self.state
    }

    /// Current window presentation.
    #[must_use]
    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// The render cache, for rasterizing outside the tick.
    #[must_use]
    pub const fn render_cache(&self) -> &RenderCache<G> {
        &self.render
    }

    /// The entity pool of the running session.
    #[must_use]
    pub fn pool(&self) -> Option<&EntityPool> {
        self.run.as_ref().map(|run| &run.stage.pool)
    }

    /// The timeline cursor of the running session.
    #[must_use]
    pub fn cursor(&self) -> Option<&Cursor> {
        self.run.as_ref().map(|run| &run.cursor)
    }

    /// Current counters. All zero when stopped.
    #[must_use]
    pub fn metrics(&self) -> Metrics {
        self.run.as_ref().map(Run::metrics).unwrap_or_default()
    }

    /// Starts a session over `timeline`.
    ///
    /// Fails without side effects if a session is running, the configuration
    /// is invalid, or the timeline is empty.
    pub fn start(
        &mut self,
        timeline: Arc<Timeline>,
        config: EngineConfig,
    ) -> Result<(), StartError> {
        if self.run.is_some() {
            return Err(StartError::AlreadyRunning);
        }
        config.validate()?;
        if timeline.is_empty() {
            return Err(StartError::EmptyTimeline);
        }

        let rng = match config.lane_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        self.render.set_style(RenderStyle {
            stroke_width: config.stroke_width,
            ..self.render.style()
        });
        let stage = Stage {
            lanes: TrackScheduler::new(config.lane_config(), rng),
            pool: EntityPool::with_capacity(config.max_pool_size),
            placement: Placement::new(&config, self.render.glyphs()),
            scroll_speed: config.scroll_speed,
            fixed_duration: config.fixed_duration(),
            delta_time: config.delta_time(),
            opacity: config.opacity,
            spawned: 0,
            dropped_no_lane: 0,
            dropped_exhausted: 0,
            seeks: 0,
        };
        log::info!(
            "starting session: {} entries, {} lanes per mode, pool of {}, target {:?}",
            timeline.len(),
            config.track_count,
            config.max_pool_size,
            config.target_source
        );
        self.run = Some(Run {
            timeline,
            cursor: Cursor::with_jump_threshold(config.jump_threshold),
            stage,
            target_source: config.target_source,
        });
        self.state = ControllerState::Starting;
        Ok(())
    }

    /// Applies one position observation.
    ///
    /// `sample` is `None` when the media collaborator reports no session.
    pub fn on_sample(
        &mut self,
        sample: Option<&PositionSample>,
        probe: &impl ForegroundProbe,
        now: HostTime,
    ) -> SampleOutcome {
        let Some(run) = self.run.as_mut() else {
            return SampleOutcome::Ignored;
        };

        self.visibility = if probe.is_target_foreground() {
            Visibility::OnTop
        } else if probe.is_self_foreground() {
            Visibility::Normal
        } else {
            Visibility::Hidden
        };
        if self.visibility == Visibility::Hidden {
            if self.state != ControllerState::Hidden {
                log::debug!("overlay hidden");
            }
            self.state = ControllerState::Hidden;
            return SampleOutcome::Hidden;
        }

        let playing = sample
            .filter(|s| run.accepts(s))
            .filter(|s| s.status == PlaybackStatus::Playing);
        let Some(sample) = playing else {
            self.state = ControllerState::Running(Playback::Paused);
            return SampleOutcome::Paused;
        };
        self.state = ControllerState::Running(Playback::Playing);

        match run.cursor.advance(&run.timeline, sample.position) {
            Advance::Seek { index } => {
                run.stage.clear();
                run.stage.seeks += 1;
                log::info!("seek to {:.3}s, resuming at entry {index}", sample.position);
                SampleOutcome::Seeked { index }
            }
            Advance::Due(due) => {
                let mut spawned = 0;
                let mut dropped = 0;
                for entry in due {
                    match run.stage.spawn(entry, now, self.render.glyphs()) {
                        Ok(_) => spawned += 1,
                        Err(_) => dropped += 1,
                    }
                }
                if spawned + dropped > 0 {
                    log::trace!(
                        "position {:.3}s: spawned {spawned}, dropped {dropped}",
                        sample.position
                    );
                }
                SampleOutcome::Advanced { spawned, dropped }
            }
        }
    }

    /// Runs one animation tick and returns what to paint.
    pub fn tick(&mut self, now: HostTime) -> Frame {
        let Some(run) = self.run.as_mut() else {
            return Frame {
                now,
                items: Vec::new(),
                visibility: self.visibility,
                state: self.state,
                metrics: Metrics::default(),
            };
        };

        if self.state == ControllerState::Running(Playback::Playing) {
            let report = animate::step(&mut run.stage.pool, now, run.stage.delta_time);
            if !report.expired.is_empty() {
                log::trace!("{} entities expired", report.expired.len());
            }
        }
        let items = match self.state {
            ControllerState::Running(_) => {
                self.render.render_set(&mut run.stage.pool, run.stage.opacity)
            }
            ControllerState::Starting | ControllerState::Hidden | ControllerState::Stopped => {
                Vec::new()
            }
        };
        Frame {
            now,
            items,
            visibility: self.visibility,
            state: self.state,
            metrics: run.metrics(),
        }
    }

    /// Ends the session, releasing every entity and clearing the lanes,
    /// timeline, and cursor. Does nothing when already stopped.
    pub fn stop(&mut self) {
        if let Some(mut run) = self.run.take() {
            run.stage.clear();
            log::info!(
                "session stopped after {} spawns ({} dropped, {} seeks)",
                run.stage.spawned,
                run.stage.dropped_no_lane + run.stage.dropped_exhausted,
                run.stage.seeks
            );
        }
        self.state = ControllerState::Stopped;
        self.visibility = Visibility::Hidden;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Rgb8;
    use crate::glyph::BlockGlyphs;

    #[derive(Clone, Copy)]
    struct Probe {
        target: bool,
        own: bool,
    }

    impl ForegroundProbe for Probe {
        fn is_target_foreground(&self) -> bool {
            self.target
        }

        fn is_self_foreground(&self) -> bool {
            self.own
        }
    }

    const TARGET: Probe = Probe {
        target: true,
        own: false,
    };

    const NOBODY: Probe = Probe {
        target: false,
        own: false,
    };

    fn secs(s: f64) -> HostTime {
        HostTime::from_secs_f64(s)
    }

    fn playing(position: f64) -> PositionSample {
        PositionSample::new(position, PlaybackStatus::Playing, "player")
    }

    fn config() -> EngineConfig {
        EngineConfig {
            track_count: 4,
            max_pool_size: 8,
            viewport_width: 800.0,
            viewport_height: 600.0,
            lane_seed: Some(42),
            ..EngineConfig::desktop()
        }
    }

    fn timeline(entries: &[(f64, Mode, &str)]) -> Arc<Timeline> {
        Arc::new(
            entries
                .iter()
                .map(|&(t, mode, text)| Entry::new(t, mode, text, Rgb8::WHITE))
                .collect(),
        )
    }

    fn scenario() -> Arc<Timeline> {
        timeline(&[
            (1.0, Mode::Scroll, "a"),
            (1.0, Mode::Scroll, "b"),
            (5.0, Mode::Top, "c"),
        ])
    }

    fn started(timeline: Arc<Timeline>, config: EngineConfig) -> SyncController<BlockGlyphs> {
        let mut controller = SyncController::new(BlockGlyphs::new(20.0));
        assert_eq!(controller.start(timeline, config), Ok(()));
        controller
    }

    fn active_texts(controller: &SyncController<BlockGlyphs>) -> Vec<String> {
        let Some(pool) = controller.pool() else {
            return Vec::new();
        };
        pool.active()
            .filter_map(|id| pool.text(id).map(str::to_owned))
            .collect()
    }

    #[test]
    fn start_rejects_empty_timeline() {
        let mut controller = SyncController::new(BlockGlyphs::default());
        let result = controller.start(Arc::new(Timeline::default()), config());
        assert_eq!(result, Err(StartError::EmptyTimeline));
        assert_eq!(controller.state(), ControllerState::Stopped);
        assert!(controller.pool().is_none());
    }

    #[test]
    fn start_rejects_invalid_config_and_double_start() {
        let mut controller = SyncController::new(BlockGlyphs::default());
        let bad = EngineConfig {
            track_count: 0,
            ..config()
        };
        assert!(matches!(
            controller.start(scenario(), bad),
            Err(StartError::InvalidConfig(_))
        ));
        assert_eq!(controller.start(scenario(), config()), Ok(()));
        assert_eq!(controller.state(), ControllerState::Starting);
        assert_eq!(
            controller.start(scenario(), config()),
            Err(StartError::AlreadyRunning)
        );
    }

    #[test]
    fn due_entries_spawn_in_order_once() {
        let mut controller = started(scenario(), config());
        let outcome = controller.on_sample(Some(&playing(1.0)), &TARGET, secs(0.0));
        assert_eq!(
            outcome,
            SampleOutcome::Advanced {
                spawned: 2,
                dropped: 0
            }
        );
        assert_eq!(controller.state(), ControllerState::Running(Playback::Playing));
        assert_eq!(controller.cursor().map(Cursor::next_index), Some(2));
        assert_eq!(active_texts(&controller), ["a", "b"]);

        let again = controller.on_sample(Some(&playing(1.0)), &TARGET, secs(0.1));
        assert_eq!(
            again,
            SampleOutcome::Advanced {
                spawned: 0,
                dropped: 0
            }
        );
        assert_eq!(controller.metrics().active, 2);
    }

    #[test]
    fn seek_releases_every_entity() {
        let entries: Vec<(f64, Mode, &str)> = (0..100)
            .map(|i| (f64::from(i), Mode::Scroll, "x"))
            .collect();
        let mut controller = started(timeline(&entries), config());
        let _ = controller.on_sample(Some(&playing(1.0)), &TARGET, secs(0.0));
        assert_eq!(controller.metrics().active, 2, "entries at 0.0 and 1.0");

        let outcome = controller.on_sample(Some(&playing(50.0)), &TARGET, secs(0.1));
        assert_eq!(outcome, SampleOutcome::Seeked { index: 50 });
        let metrics = controller.metrics();
        assert_eq!(metrics.active, 0);
        assert_eq!(metrics.free, 8);
        assert_eq!(metrics.seeks, 1);

        // The next small step resumes from the new cursor.
        let outcome = controller.on_sample(Some(&playing(50.5)), &TARGET, secs(0.2));
        assert_eq!(
            outcome,
            SampleOutcome::Advanced {
                spawned: 1,
                dropped: 0
            }
        );
    }

    #[test]
    fn pool_exhaustion_drops_without_burning_lanes() {
        let config = EngineConfig {
            max_pool_size: 2,
            ..config()
        };
        let mut controller = started(
            timeline(&[
                (1.0, Mode::Top, "a"),
                (1.0, Mode::Top, "b"),
                (1.0, Mode::Top, "c"),
            ]),
            config,
        );
        let outcome = controller.on_sample(Some(&playing(1.0)), &TARGET, secs(0.0));
        assert_eq!(
            outcome,
            SampleOutcome::Advanced {
                spawned: 2,
                dropped: 1
            }
        );
        let metrics = controller.metrics();
        assert_eq!(metrics.free, 0);
        assert_eq!(metrics.dropped_exhausted, 1);
        assert_eq!(metrics.dropped_no_lane, 0);
    }

    #[test]
    fn lane_exhaustion_drops_without_consuming_slots() {
        let config = EngineConfig {
            track_count: 1,
            ..config()
        };
        let mut controller = started(
            timeline(&[(1.0, Mode::Bottom, "a"), (1.0, Mode::Bottom, "b")]),
            config,
        );
        let _ = controller.on_sample(Some(&playing(1.0)), &TARGET, secs(0.0));
        let metrics = controller.metrics();
        assert_eq!(metrics.active, 1);
        assert_eq!(metrics.free, 7);
        assert_eq!(metrics.dropped_no_lane, 1);
    }

    #[test]
    fn placement_follows_mode() {
        let mut controller = started(
            timeline(&[
                (1.0, Mode::Top, "top"),
                (1.0, Mode::Bottom, "bot"),
                (1.0, Mode::Scroll, "scroll"),
            ]),
            config(),
        );
        let _ = controller.on_sample(Some(&playing(1.0)), &TARGET, secs(0.0));
        let Some(pool) = controller.pool() else {
            panic!("running controller has a pool");
        };
        let ids: Vec<SlotId> = pool.active().collect();
        // 20px line, 0.2 spacing -> 24px tracks; ascent 16 + 5 padding.
        assert_eq!(pool.position(ids[0]), Some(Point::new(385.0, 21.0)));
        assert_eq!(pool.position(ids[1]), Some(Point::new(385.0, 576.0)));
        let Some(scroll) = pool.position(ids[2]) else {
            panic!("scroll entity is active");
        };
        assert_eq!(scroll.x, 800.0);
        let lane = pool.lane(ids[2]).map(|l| l.index as f64);
        assert_eq!(lane.map(|i| i * 24.0 + 21.0), Some(scroll.y));
        assert_eq!(pool.expire_at(ids[0]), Some(secs(5.0)));
        assert_eq!(pool.expire_at(ids[2]), None);
    }

    #[test]
    fn scroll_speed_scales_with_text_length() {
        let mut controller = started(
            timeline(&[(1.0, Mode::Scroll, "0123456789")]),
            EngineConfig {
                scroll_speed: 100.0,
                animation_rate: 10.0,
                ..config()
            },
        );
        let _ = controller.on_sample(Some(&playing(1.0)), &TARGET, secs(0.0));
        let frame = controller.tick(secs(0.1));
        assert_eq!(frame.items.len(), 1);
        let Some(pool) = controller.pool() else {
            panic!("running controller has a pool");
        };
        let id = frame.items[0].slot;
        // 100 * (1 + 10 / 20) px/s for 0.1s.
        let x = pool.position(id).map(|p| p.x);
        assert!(x.is_some_and(|x| (x - (800.0 - 15.0)).abs() < 1e-9), "x = {x:?}");
    }

    #[test]
    fn pause_retains_and_freezes_entities() {
        let mut controller = started(scenario(), config());
        let _ = controller.on_sample(Some(&playing(1.0)), &TARGET, secs(0.0));
        let paused = PositionSample::new(1.0, PlaybackStatus::Paused, "player");
        assert_eq!(
            controller.on_sample(Some(&paused), &TARGET, secs(0.1)),
            SampleOutcome::Paused
        );
        let before = controller.tick(secs(0.2));
        let after = controller.tick(secs(10.0));
        assert_eq!(after.state, ControllerState::Running(Playback::Paused));
        assert_eq!(after.items.len(), 2, "paused entities are still painted");
        assert_eq!(before.items[0].origin, after.items[0].origin, "no motion while paused");
    }

    #[test]
    fn missing_session_or_foreign_source_pauses() {
        let mut controller = started(
            scenario(),
            EngineConfig {
                target_source: Some("player".into()),
                ..config()
            },
        );
        assert_eq!(controller.on_sample(None, &TARGET, secs(0.0)), SampleOutcome::Paused);
        let foreign = PositionSample::new(1.0, PlaybackStatus::Playing, "browser");
        assert_eq!(
            controller.on_sample(Some(&foreign), &TARGET, secs(0.0)),
            SampleOutcome::Paused
        );
        assert_eq!(controller.metrics().active, 0);
        assert!(matches!(
            controller.on_sample(Some(&playing(1.0)), &TARGET, secs(0.0)),
            SampleOutcome::Advanced { spawned: 2, .. }
        ));
    }

    #[test]
    fn hidden_suspends_everything() {
        let mut controller = started(scenario(), config());
        let _ = controller.on_sample(Some(&playing(1.0)), &TARGET, secs(0.0));
        assert_eq!(
            controller.on_sample(Some(&playing(1.1)), &NOBODY, secs(0.1)),
            SampleOutcome::Hidden
        );
        let frame = controller.tick(secs(0.2));
        assert_eq!(frame.state, ControllerState::Hidden);
        assert_eq!(frame.visibility, Visibility::Hidden);
        assert!(frame.items.is_empty());
        assert_eq!(frame.metrics.active, 2, "entities are kept while hidden");
    }

    #[test]
    fn focus_decides_visibility() {
        let mut controller = started(scenario(), config());
        let _ = controller.on_sample(Some(&playing(0.5)), &TARGET, secs(0.0));
        assert_eq!(controller.visibility(), Visibility::OnTop);
        let own = Probe {
            target: false,
            own: true,
        };
        let _ = controller.on_sample(Some(&playing(0.6)), &own, secs(0.0));
        assert_eq!(controller.visibility(), Visibility::Normal);
        assert_eq!(controller.state(), ControllerState::Running(Playback::Playing));
    }

    #[test]
    fn fixed_entities_expire_after_duration() {
        let mut controller = started(scenario(), config());
        let _ = controller.on_sample(Some(&playing(1.0)), &TARGET, secs(0.0));
        let _ = controller.on_sample(Some(&playing(3.0)), &TARGET, secs(2.0));
        let _ = controller.on_sample(Some(&playing(5.0)), &TARGET, secs(4.0));
        assert_eq!(active_texts(&controller), ["a", "b", "c"]);

        let _ = controller.tick(secs(8.9));
        assert!(active_texts(&controller).contains(&"c".to_owned()), "expired early");
        let deadline = secs(4.0).saturating_add(Duration::from_millis(5_000));
        let _ = controller.tick(deadline);
        assert_eq!(active_texts(&controller), ["a", "b"]);
    }

    #[test]
    fn stop_is_idempotent_and_allows_restart() {
        let mut controller = started(scenario(), config());
        let _ = controller.on_sample(Some(&playing(1.0)), &TARGET, secs(0.0));
        controller.stop();
        assert_eq!(controller.state(), ControllerState::Stopped);
        assert_eq!(controller.metrics(), Metrics::default());
        assert!(controller.tick(secs(1.0)).items.is_empty());
        assert_eq!(
            controller.on_sample(Some(&playing(1.0)), &TARGET, secs(1.0)),
            SampleOutcome::Ignored
        );
        controller.stop();
        assert_eq!(controller.state(), ControllerState::Stopped);

        assert_eq!(controller.start(scenario(), config()), Ok(()));
        assert!(matches!(
            controller.on_sample(Some(&playing(1.0)), &TARGET, secs(2.0)),
            SampleOutcome::Advanced { spawned: 2, .. }
        ));
    }
}
