// Copyright 2026 the Barrage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless danmaku session against a simulated media player.
//!
//! Generates a random comment timeline, plays it back through a [`Session`]
//! and [`Ticker`], seeks once midway, and prints diagnostics once per second.
//!
//! ```sh
//! RUST_LOG=info cargo run -p sync_demo -- --duration 20 --seek-at 8 --seek-to 60
//! ```

use std::error::Error;
use std::io;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use barrage_core::config::EngineConfig;
use barrage_core::entry::{Entry, Mode, Rgb8};
use barrage_core::error::SourceError;
use barrage_core::glyph::BlockGlyphs;
use barrage_core::source::{
    AssumeForeground, MediaSource, PlaybackStatus, PositionSample, SourceInfo,
};
use barrage_core::time::MonotonicClock;
use barrage_core::timeline::Timeline;
use barrage_debug::jsonl::JsonLinesWriter;
use barrage_debug::overlay::{DebugOverlay, OverlayConfig};
use barrage_debug::pretty::PrettyWriter;
use barrage_runtime::ticker::{FrameSlot, Ticker};
use barrage_runtime::{Session, SessionOptions};
use clap::Parser;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SOURCE_ID: &str = "simulated-player";

const WORDS: &[&str] = &[
    "lol", "nice", "wait what", "this part!", "again", "前方高能", "233333", "so good",
    "who's here in 2026", "replay", "ok", "wow", "beautiful shot", "hahaha",
];

#[derive(Parser, Debug)]
#[command(name = "sync_demo", about = "Play a random danmaku timeline headlessly")]
struct Args {
    /// Comments to generate
    #[arg(long, default_value_t = 400)]
    entries: usize,
    /// Length of the generated timeline in seconds
    #[arg(long, default_value_t = 120.0)]
    media_length: f64,
    /// Wall-clock run time in seconds
    #[arg(long, default_value_t = 20.0)]
    duration: f64,
    /// Wall-clock second at which the player seeks
    #[arg(long)]
    seek_at: Option<f64>,
    /// Media position the seek jumps to
    #[arg(long, default_value_t = 60.0)]
    seek_to: f64,
    /// Lanes per mode
    #[arg(long, default_value_t = 18)]
    tracks: usize,
    /// Entity pool capacity
    #[arg(long, default_value_t = 200)]
    pool: usize,
    /// Seed for the timeline and lane choice
    #[arg(long)]
    seed: Option<u64>,
    /// Print JSON lines instead of text
    #[arg(long)]
    json: bool,
}

/// A player that advances in real time from a seekable base position.
#[derive(Clone, Debug)]
struct SimulatedPlayer {
    anchor: Arc<Mutex<(f64, Instant)>>,
}

impl SimulatedPlayer {
    fn new() -> Self {
        Self {
            anchor: Arc::new(Mutex::new((0.0, Instant::now()))),
        }
    }

    fn seek(&self, position: f64) {
        *self.anchor.lock() = (position, Instant::now());
    }
}

impl MediaSource for SimulatedPlayer {
    async fn current_sample(&self) -> Result<Option<PositionSample>, SourceError> {
        let (base, since) = *self.anchor.lock();
        Ok(Some(PositionSample::new(
            base + since.elapsed().as_secs_f64(),
            PlaybackStatus::Playing,
            SOURCE_ID,
        )))
    }

    async fn list_sources(&self) -> Result<Vec<SourceInfo>, SourceError> {
        Ok(vec![SourceInfo {
            id: SOURCE_ID.into(),
            label: "Simulated player".into(),
        }])
    }
}

fn random_timeline(rng: &mut StdRng, count: usize, length: f64) -> Timeline {
    (0..count)
        .map(|_| {
            let mode = match rng.random_range(0..10) {
                0 => Mode::Top,
                1 => Mode::Bottom,
                _ => Mode::Scroll,
            };
            let color = if rng.random_bool(0.8) {
                Rgb8::WHITE
            } else {
                Rgb8::from_packed(rng.random_range(0..0x0100_0000))
            };
            let text = WORDS[rng.random_range(0..WORDS.len())];
            Entry::new(rng.random_range(0.0..length.max(1.0)), mode, text, color)
        })
        .collect()
}

fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value.max(0.0)).unwrap_or(Duration::MAX)
}

enum Output {
    Text(PrettyWriter<io::Stdout>),
    Json(JsonLinesWriter<io::Stdout>),
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("seed {seed}");
    let mut rng = StdRng::seed_from_u64(seed);
    let timeline = Arc::new(random_timeline(&mut rng, args.entries, args.media_length));

    let config = EngineConfig {
        track_count: args.tracks,
        max_pool_size: args.pool,
        target_source: Some(SOURCE_ID.into()),
        lane_seed: Some(seed),
        ..EngineConfig::desktop()
    };

    let player = SimulatedPlayer::new();
    let mut session = Session::new(
        player.clone(),
        AssumeForeground,
        BlockGlyphs::default(),
        MonotonicClock::new(),
        SessionOptions::desktop(),
    )?;
    session.start(timeline, config)?;

    let slot = FrameSlot::new();
    let ticker = Ticker::spawn(session, slot.clone())?;
    let mut overlay = DebugOverlay::new(OverlayConfig {
        enabled: true,
        ..OverlayConfig::default()
    });
    let mut output = if args.json {
        Output::Json(JsonLinesWriter::new(io::stdout()))
    } else {
        Output::Text(PrettyWriter::with_writer(io::stdout()))
    };

    let started = Instant::now();
    let run_for = secs(args.duration);
    let mut seek_at = args.seek_at.map(secs);
    let mut next_report = Duration::from_secs(1);
    while started.elapsed() < run_for {
        thread::sleep(ticker.interval());
        if seek_at.is_some_and(|at| started.elapsed() >= at) {
            seek_at = None;
            log::info!("player seeks to {:.1}s", args.seek_to);
            player.seek(args.seek_to);
        }
        let Some(frame) = slot.take() else {
            continue;
        };
        let stats = overlay.observe(&frame);
        if started.elapsed() >= next_report {
            next_report += Duration::from_secs(1);
            match &mut output {
                Output::Text(writer) => writer.write_stats(&stats),
                Output::Json(writer) => writer.write(&stats)?,
            }
        }
    }

    let mut session = ticker.stop()?;
    log::info!("final metrics: {:?}", session.controller().metrics());
    if let Some(outcome) = session.stop() {
        log::info!("poller shutdown: {outcome:?}");
    }
    if let Output::Json(writer) = output {
        writer.finish()?;
    }
    Ok(())
}
