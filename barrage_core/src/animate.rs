// Copyright 2026 the Barrage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-tick motion and expiry.

use crate::pool::{EntityPool, SlotId};
use crate::time::HostTime;

/// Outcome of one [`step`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Entities still active after the step.
    pub still_active: usize,
    /// Entities that expired and were released during the step.
    pub expired: Vec<SlotId>,
}

/// Advances every active entity by one tick and releases the expired ones.
///
/// Scroll entities move left by `velocity * delta_time` and expire once their
/// right edge is at or past the left edge of the viewport. Fixed entities do
/// not move and expire once `now` reaches their deadline.
///
/// Survivors keep their activation order, and expired slots join the free
/// queue in that same order. The whole step is a single pass over the
/// active list.
pub fn step(pool: &mut EntityPool, now: HostTime, delta_time: f64) -> StepReport {
    let mut expired = Vec::new();
    let mut active = core::mem::take(&mut pool.active);
    active.retain(|&idx| {
        let i = idx as usize;
        let alive = match pool.expire_at[i] {
            Some(deadline) => now < deadline,
            None => {
                pool.position[i].x -= pool.velocity[i] * delta_time;
                pool.position[i].x + pool.width[i] > 0.0
            }
        };
        if !alive {
            expired.push(SlotId {
                idx,
                generation: pool.generation[i],
            });
            pool.free_slot(idx);
        }
        alive
    });
    pool.active = active;
    StepReport {
        still_active: pool.active_count(),
        expired,
    }
}
