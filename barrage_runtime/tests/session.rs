// Copyright 2026 the Barrage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end session tests against a scripted media source.

use std::sync::Arc;
use std::time::{Duration, Instant};

use barrage_core::config::EngineConfig;
use barrage_core::controller::{ControllerState, Frame, Playback};
use barrage_core::entry::{Entry, Mode, Rgb8};
use barrage_core::error::{SourceError, StartError};
use barrage_core::glyph::BlockGlyphs;
use barrage_core::source::{
    AssumeForeground, MediaSource, PlaybackStatus, PositionSample, SourceInfo,
};
use barrage_core::time::{HostTime, ManualClock};
use barrage_core::timeline::Timeline;
use barrage_runtime::poller::{PollerConfig, ShutdownOutcome};
use barrage_runtime::ticker::{FrameSlot, Ticker};
use barrage_runtime::{Phase, Session, SessionError, SessionOptions};
use parking_lot::Mutex;

/// Reports whatever the test last scripted; fails while `failing` is set.
#[derive(Clone, Default)]
struct Script {
    sample: Arc<Mutex<Option<PositionSample>>>,
    failing: Arc<Mutex<bool>>,
}

impl Script {
    fn play(&self, position: f64) {
        *self.sample.lock() = Some(PositionSample::new(
            position,
            PlaybackStatus::Playing,
            "player",
        ));
    }

    fn fail(&self, failing: bool) {
        *self.failing.lock() = failing;
    }
}

impl MediaSource for Script {
    async fn current_sample(&self) -> Result<Option<PositionSample>, SourceError> {
        if *self.failing.lock() {
            return Err(SourceError::new("scripted failure"));
        }
        Ok(self.sample.lock().clone())
    }

    async fn list_sources(&self) -> Result<Vec<SourceInfo>, SourceError> {
        Ok(vec![SourceInfo {
            id: "player".into(),
            label: "Scripted".into(),
        }])
    }
}

type TestSession = Session<Script, AssumeForeground, BlockGlyphs, ManualClock>;

fn options() -> SessionOptions {
    SessionOptions {
        poller: PollerConfig {
            interval: Duration::from_millis(5),
            max_interval: Duration::from_millis(20),
            failure_threshold: 2,
            poll_timeout: Duration::from_millis(200),
        },
        shutdown_grace: Duration::from_millis(500),
    }
}

fn config() -> EngineConfig {
    EngineConfig {
        track_count: 4,
        max_pool_size: 16,
        viewport_width: 640.0,
        viewport_height: 360.0,
        lane_seed: Some(7),
        ..EngineConfig::desktop()
    }
}

fn timeline() -> Arc<Timeline> {
    Arc::new(Timeline::new(vec![
        Entry::new(0.5, Mode::Scroll, "first", Rgb8::WHITE),
        Entry::new(1.0, Mode::Top, "second", Rgb8::new(255, 200, 0)),
        Entry::new(30.0, Mode::Bottom, "later", Rgb8::WHITE),
    ]))
}

fn session(script: &Script) -> (TestSession, ManualClock) {
    let clock = ManualClock::new(HostTime::ZERO);
    let session = Session::new(
        script.clone(),
        AssumeForeground,
        BlockGlyphs::new(16.0),
        clock.clone(),
        options(),
    );
    let Ok(session) = session else {
        panic!("runtime should build");
    };
    (session, clock)
}

/// Ticks until `done` holds or two seconds of wall time pass.
fn tick_until(
    session: &mut TestSession,
    clock: &ManualClock,
    mut done: impl FnMut(&Frame) -> bool,
) -> Frame {
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        clock.advance(Duration::from_millis(16));
        let frame = session.tick();
        if done(&frame) || Instant::now() > deadline {
            return frame;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
}

#[test]
fn polled_positions_spawn_entities() {
    let script = Script::default();
    let (mut session, clock) = session(&script);
    assert_eq!(session.phase(), Phase::Idle);
    assert!(session.start(timeline(), config()).is_ok(), "start");
    assert_eq!(session.phase(), Phase::Running);

    script.play(1.0);
    let frame = tick_until(&mut session, &clock, |f| f.items.len() == 2);
    assert_eq!(frame.items.len(), 2, "both due entries are painted");
    assert_eq!(frame.state, ControllerState::Running(Playback::Playing));
    assert_eq!(frame.metrics.total_entries, 3);
    assert_eq!(frame.metrics.free, 14);

    assert_eq!(session.stop(), Some(ShutdownOutcome::Clean));
    assert_eq!(session.phase(), Phase::Idle);
    assert_eq!(session.stop(), None, "stop is idempotent");
    assert_eq!(session.controller().metrics().active, 0);
}

#[test]
fn seek_clears_the_screen() {
    let script = Script::default();
    let (mut session, clock) = session(&script);
    assert!(session.start(timeline(), config()).is_ok(), "start");

    script.play(1.0);
    let frame = tick_until(&mut session, &clock, |f| f.metrics.active == 2);
    assert_eq!(frame.metrics.active, 2);

    script.play(20.0);
    let frame = tick_until(&mut session, &clock, |f| f.metrics.seeks == 1);
    assert_eq!(frame.metrics.seeks, 1);
    assert_eq!(frame.metrics.active, 0, "seek released every entity");
    assert!(frame.items.is_empty(), "nothing left to paint");
}

#[test]
fn transient_failures_are_not_fatal() {
    let script = Script::default();
    script.fail(true);
    let (mut session, clock) = session(&script);
    assert!(session.start(timeline(), config()).is_ok(), "start");

    for _ in 0..20 {
        clock.advance(Duration::from_millis(16));
        let frame = session.tick();
        assert_eq!(frame.state, ControllerState::Starting, "no sample yet");
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(session.phase(), Phase::Running);

    script.play(1.0);
    script.fail(false);
    let frame = tick_until(&mut session, &clock, |f| f.metrics.active == 2);
    assert_eq!(frame.metrics.active, 2, "recovered after failures");
    assert_eq!(session.stop(), Some(ShutdownOutcome::Clean));
}

#[test]
fn empty_timeline_never_runs() {
    let script = Script::default();
    let (mut session, _clock) = session(&script);
    let result = session.start(Arc::new(Timeline::default()), config());
    assert!(
        matches!(result, Err(SessionError::Start(StartError::EmptyTimeline))),
        "got {result:?}"
    );
    assert_eq!(session.phase(), Phase::Idle);
    assert!(
        matches!(session.restart(None), Err(SessionError::NeverStarted)),
        "nothing to restart"
    );
}

#[test]
fn double_start_is_rejected() {
    let script = Script::default();
    let (mut session, _clock) = session(&script);
    assert!(session.start(timeline(), config()).is_ok(), "start");
    let again = session.start(timeline(), config());
    assert!(
        matches!(again, Err(SessionError::Start(StartError::AlreadyRunning))),
        "got {again:?}"
    );
    assert_eq!(session.stop(), Some(ShutdownOutcome::Clean));
}

#[test]
fn restart_applies_new_config() {
    let script = Script::default();
    let (mut session, clock) = session(&script);
    assert!(session.start(timeline(), config()).is_ok(), "start");
    script.play(1.0);
    let _ = tick_until(&mut session, &clock, |f| f.metrics.active == 2);

    let smaller = EngineConfig {
        max_pool_size: 1,
        ..config()
    };
    assert!(session.restart(Some(smaller)).is_ok(), "restart");
    assert_eq!(session.phase(), Phase::Running);
    let frame = tick_until(&mut session, &clock, |f| f.metrics.dropped_exhausted == 1);
    assert_eq!(frame.metrics.active, 1, "one slot after restart");
    assert_eq!(frame.metrics.dropped_exhausted, 1);
    assert_eq!(session.stop(), Some(ShutdownOutcome::Clean));
}

#[test]
fn ticker_publishes_frames_and_returns_session() {
    let script = Script::default();
    let (mut session, _clock) = session(&script);
    assert!(session.start(timeline(), config()).is_ok(), "start");
    script.play(1.0);

    let slot = FrameSlot::new();
    let Ok(ticker) = Ticker::spawn(session, slot.clone()) else {
        panic!("ticker thread should spawn");
    };
    assert_eq!(ticker.interval().as_micros(), 16_666);

    let deadline = Instant::now() + Duration::from_secs(2);
    let mut painted = 0;
    while Instant::now() < deadline && painted < 2 {
        std::thread::sleep(Duration::from_millis(10));
        painted = slot.latest().map_or(0, |f| f.items.len());
    }
    assert_eq!(painted, 2, "ticker frames reach the slot");

    let Ok(mut session) = ticker.stop() else {
        panic!("ticker should not panic");
    };
    assert_eq!(session.phase(), Phase::Running);
    assert_eq!(session.stop(), Some(ShutdownOutcome::Clean));
}

/// Blocks the calling worker thread for three seconds in the chosen call.
#[derive(Clone, Copy)]
struct Stalling {
    in_sample: bool,
    in_listing: bool,
}

const STALL: Duration = Duration::from_secs(3);

impl MediaSource for Stalling {
    async fn current_sample(&self) -> Result<Option<PositionSample>, SourceError> {
        if self.in_sample {
            std::thread::sleep(STALL);
        }
        Ok(None)
    }

    async fn list_sources(&self) -> Result<Vec<SourceInfo>, SourceError> {
        if self.in_listing {
            std::thread::sleep(STALL);
        }
        Ok(Vec::new())
    }
}

type StallingSession = Session<Stalling, AssumeForeground, BlockGlyphs, ManualClock>;

fn stalling_session(media: Stalling) -> StallingSession {
    let session = Session::new(
        media,
        AssumeForeground,
        BlockGlyphs::new(16.0),
        ManualClock::new(HostTime::ZERO),
        SessionOptions {
            shutdown_grace: Duration::from_millis(200),
            ..options()
        },
    );
    let Ok(session) = session else {
        panic!("runtime should build");
    };
    session
}

#[test]
fn blocking_source_is_aborted_after_grace() {
    let mut session = stalling_session(Stalling {
        in_sample: true,
        in_listing: false,
    });
    assert!(session.start(timeline(), config()).is_ok(), "start");
    // Let the poller enter the blocking call.
    std::thread::sleep(Duration::from_millis(100));

    let stopping = Instant::now();
    assert_eq!(session.stop(), Some(ShutdownOutcome::Forced));
    let took = stopping.elapsed();
    assert!(took < Duration::from_secs(1), "stop took {took:?}");
    assert_eq!(session.phase(), Phase::Idle);

    let dropping = Instant::now();
    drop(session);
    assert!(
        dropping.elapsed() < Duration::from_secs(1),
        "drop does not wait for the blocked worker"
    );
}

#[test]
fn blocking_discovery_does_not_stall_start() {
    let mut session = stalling_session(Stalling {
        in_sample: false,
        in_listing: true,
    });
    let starting = Instant::now();
    assert!(session.start(timeline(), config()).is_ok(), "start");
    let took = starting.elapsed();
    assert!(took < Duration::from_secs(1), "start took {took:?}");
    assert_eq!(session.phase(), Phase::Running);
    assert_eq!(session.stop(), Some(ShutdownOutcome::Clean));
}
