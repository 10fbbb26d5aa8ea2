// Copyright 2026 the Barrage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-mode lane occupancy.
//!
//! Each placement mode owns a table of `track_count` lanes. A lane records the
//! host time after which it may be handed out again. Scroll lanes are chosen
//! at random among the free ones so that traffic spreads over the screen;
//! fixed lanes are filled top-down (or bottom-up) in index order.

use core::fmt;
use std::time::Duration;

use rand::Rng;
use rand::rngs::StdRng;

use crate::entry::Mode;
use crate::time::HostTime;

/// Fraction of a scroll entity's own crossing time after which its lane may
/// be reused. The tail has mostly cleared the lane by then.
pub const SCROLL_LANE_DAMPING: f64 = 0.8;

/// A lane within one mode's table.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LaneId {
    /// Mode whose table the lane belongs to.
    pub mode: Mode,
    /// Lane index, `0` being the first lane from the anchoring edge.
    pub index: usize,
}

impl fmt::Debug for LaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LaneId({:?}#{})", self.mode, self.index)
    }
}

/// Parameters for a [`TrackScheduler`], fixed for a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaneConfig {
    /// Lanes per mode.
    pub track_count: usize,
    /// Base scroll speed in pixels per second.
    pub scroll_speed: f64,
    /// How long a fixed entity occupies its lane.
    pub fixed_duration: Duration,
    /// Skip occupancy bookkeeping and pick any lane at random.
    pub overlap_allowed: bool,
}

/// Lane tables for all modes.
#[derive(Debug)]
pub struct TrackScheduler {
    config: LaneConfig,
    // `None` means the lane was never reserved.
    tables: [Vec<Option<HostTime>>; 3],
    rng: StdRng,
}

impl TrackScheduler {
    /// Creates empty lane tables. All lanes start free.
    #[must_use]
    pub fn new(config: LaneConfig, rng: StdRng) -> Self {
        let table = vec![None; config.track_count];
        Self {
            tables: [table.clone(), table.clone(), table],
            config,
            rng,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &LaneConfig {
        &self.config
    }

    /// Returns when `lane` becomes free again, or `None` if it was never
    /// reserved (or the index is out of range).
    #[must_use]
    pub fn free_at(&self, lane: LaneId) -> Option<HostTime> {
        self.tables[lane.mode.table_index()]
            .get(lane.index)
            .copied()
            .flatten()
    }

    /// Finds and reserves a lane for a new entity of `mode`.
    ///
    /// `estimated_width` is the entity's measured width in pixels; it only
    /// matters for scroll lanes. Returns `None` when every lane of the mode
    /// is still occupied at `now`, in which case nothing is reserved.
    pub fn allocate(&mut self, mode: Mode, estimated_width: f64, now: HostTime) -> Option<LaneId> {
        let count = self.config.track_count;
        if count == 0 {
            return None;
        }

        if self.config.overlap_allowed {
            let index = self.rng.random_range(0..count);
            return Some(LaneId { mode, index });
        }

        let table = &mut self.tables[mode.table_index()];
        let is_free = |slot: &Option<HostTime>| slot.is_none_or(|t| t < now);

        let index = match mode {
            Mode::Scroll => {
                let eligible = table.iter().filter(|s| is_free(*s)).count();
                if eligible == 0 {
                    return None;
                }
                let pick = self.rng.random_range(0..eligible);
                table
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| is_free(*s))
                    .nth(pick)
                    .map(|(i, _)| i)?
            }
            Mode::Top | Mode::Bottom => table.iter().position(is_free)?,
        };

        table[index] = Some(match mode {
            Mode::Scroll => {
                let crossing = estimated_width / self.config.scroll_speed;
                now.saturating_add_secs(crossing * SCROLL_LANE_DAMPING)
            }
            Mode::Top | Mode::Bottom => now.saturating_add(self.config.fixed_duration),
        });

        Some(LaneId { mode, index })
    }

    /// Marks every lane of every mode free.
    pub fn clear(&mut self) {
        for table in &mut self.tables {
            table.fill(None);
        }
    }
}
