// Copyright 2026 the Barrage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session configuration snapshot.
//!
//! An [`EngineConfig`] is read once by
//! [`SyncController::start`](crate::controller::SyncController::start).
//! Changing pool size or lane count requires a stop and a fresh start; there
//! is no in-place resize.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::lanes::LaneConfig;
use crate::timeline::JUMP_THRESHOLD_SECS;

/// Engine parameters fixed for the lifetime of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lanes per placement mode.
    pub track_count: usize,
    /// Base scroll speed in pixels per second.
    pub scroll_speed: f64,
    /// How long top and bottom entities stay on screen, in milliseconds.
    pub fixed_duration_ms: u64,
    /// Entity pool capacity.
    pub max_pool_size: usize,
    /// Place entities without lane exclusion.
    pub overlap_allowed: bool,
    /// Position jump, in seconds, treated as a seek.
    pub jump_threshold: f64,
    /// Outline width in pixels; zero disables the outline.
    pub stroke_width: f64,
    /// Opacity applied by the renderer to every entity.
    pub opacity: f32,
    /// Viewport width in pixels.
    pub viewport_width: f64,
    /// Viewport height in pixels.
    pub viewport_height: f64,
    /// Extra spacing between lanes, as a fraction of the line height.
    pub line_spacing_ratio: f64,
    /// Animation ticks per second.
    pub animation_rate: f64,
    /// Only follow samples from this media source, if set.
    pub target_source: Option<String>,
    /// Seed for lane selection; random when unset.
    pub lane_seed: Option<u64>,
}

impl EngineConfig {
    /// Defaults for a desktop overlay on a 1080p screen.
    #[must_use]
    pub const fn desktop() -> Self {
        Self {
            track_count: 18,
            scroll_speed: 180.0,
            fixed_duration_ms: 5000,
            max_pool_size: 200,
            overlap_allowed: false,
            jump_threshold: JUMP_THRESHOLD_SECS,
            stroke_width: 2.0,
            opacity: 1.0,
            viewport_width: 1920.0,
            viewport_height: 1080.0,
            line_spacing_ratio: 0.2,
            animation_rate: 60.0,
            target_source: None,
            lane_seed: None,
        }
    }

    /// Checks every field, returning the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.track_count == 0 {
            return Err(ConfigError::NoTracks);
        }
        if self.max_pool_size == 0 || u32::try_from(self.max_pool_size).is_err() {
            return Err(ConfigError::PoolSize {
                got: self.max_pool_size,
            });
        }
        positive("scroll_speed", self.scroll_speed)?;
        positive("fixed_duration_ms", Duration::from_millis(self.fixed_duration_ms).as_secs_f64())?;
        positive("jump_threshold", self.jump_threshold)?;
        positive("viewport_width", self.viewport_width)?;
        positive("viewport_height", self.viewport_height)?;
        positive("animation_rate", self.animation_rate)?;
        non_negative("stroke_width", self.stroke_width)?;
        non_negative("line_spacing_ratio", self.line_spacing_ratio)?;
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(ConfigError::Opacity(self.opacity));
        }
        Ok(())
    }

    /// How long fixed entities stay on screen.
    #[must_use]
    pub const fn fixed_duration(&self) -> Duration {
        Duration::from_millis(self.fixed_duration_ms)
    }

    /// Nominal animation step, in seconds.
    #[must_use]
    pub fn delta_time(&self) -> f64 {
        self.animation_rate.recip()
    }

    /// Nominal animation tick interval.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        crate::time::duration_from_secs(self.delta_time())
    }

    /// Lane scheduler parameters.
    #[must_use]
    pub fn lane_config(&self) -> LaneConfig {
        LaneConfig {
            track_count: self.track_count,
            scroll_speed: self.scroll_speed,
            fixed_duration: self.fixed_duration(),
            overlap_allowed: self.overlap_allowed,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::desktop()
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}
