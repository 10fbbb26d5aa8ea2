// Copyright 2026 the Barrage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-capacity struct-of-arrays entity storage.
//!
//! All slots are allocated when the pool is created and only cycle between
//! [`SlotState::Free`] and [`SlotState::Active`] afterwards. Every slot is in
//! exactly one of the free queue and the active list, so
//! `active_count() + free_count() == capacity()` always holds.
//!
//! Slots are addressed by [`SlotId`] handles. The slot's generation is bumped
//! on every activation, so a handle kept past its entity's release no longer
//! resolves even after the slot has been reused.

use core::fmt;
use std::collections::VecDeque;
use std::sync::Arc;

use kurbo::Point;

use crate::entry::{Mode, Rgb8};
use crate::error::PoolExhausted;
use crate::lanes::LaneId;
use crate::raster::Drawable;
use crate::time::HostTime;

/// A handle to an activation of a pool slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl SlotId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlotId({}@gen{})", self.idx, self.generation)
    }
}

/// Lifecycle state of a pool slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotState {
    /// Available for [`EntityPool::acquire`].
    Free,
    /// Holds a live entity.
    Active,
}

/// Field values written into a freshly acquired slot.
#[derive(Clone, Debug)]
pub struct SlotInit {
    /// Text copied from the entry.
    pub text: Arc<str>,
    /// Fill color copied from the entry.
    pub color: Rgb8,
    /// Placement mode copied from the entry.
    pub mode: Mode,
    /// Lane the entity was placed in.
    pub lane: LaneId,
    /// Left edge and baseline, in viewport pixels.
    pub position: Point,
    /// Measured text width in pixels.
    pub width: f64,
    /// Leftward speed in pixels per second; zero for fixed modes.
    pub velocity: f64,
    /// When the entity was spawned.
    pub spawn_time: HostTime,
    /// Deadline for fixed modes. Scroll entities expire geometrically.
    pub expire_at: Option<HostTime>,
}

/// Fixed-capacity pool of entity slots.
#[derive(Debug)]
pub struct EntityPool {
    // -- Per-entity fields (valid while Active) --
    pub(crate) text: Vec<Arc<str>>,
    pub(crate) color: Vec<Rgb8>,
    pub(crate) mode: Vec<Mode>,
    pub(crate) lane: Vec<Option<LaneId>>,
    pub(crate) position: Vec<Point>,
    pub(crate) width: Vec<f64>,
    pub(crate) velocity: Vec<f64>,
    pub(crate) spawn_time: Vec<HostTime>,
    pub(crate) expire_at: Vec<Option<HostTime>>,
    pub(crate) render_cache: Vec<Option<Arc<Drawable>>>,

    // -- Allocation --
    pub(crate) state: Vec<SlotState>,
    pub(crate) generation: Vec<u32>,
    pub(crate) free: VecDeque<u32>,
    /// Active slots in activation order (paint order).
    pub(crate) active: Vec<u32>,
}

impl EntityPool {
    /// Creates a pool with `capacity` free slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` does not fit in a `u32`.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let Ok(len) = u32::try_from(capacity) else {
            panic!("pool capacity {capacity} exceeds u32");
        };
        let empty: Arc<str> = Arc::from("");
        Self {
            text: vec![empty; capacity],
            color: vec![Rgb8::default(); capacity],
            mode: vec![Mode::Scroll; capacity],
            lane: vec![None; capacity],
            position: vec![Point::ZERO; capacity],
            width: vec![0.0; capacity],
            velocity: vec![0.0; capacity],
            spawn_time: vec![HostTime::ZERO; capacity],
            expire_at: vec![None; capacity],
            render_cache: vec![None; capacity],
            state: vec![SlotState::Free; capacity],
            generation: vec![0; capacity],
            free: (0..len).collect(),
            active: Vec::with_capacity(capacity),
        }
    }

    // -- Allocation API --

    /// Takes a slot from the free queue and marks it active.
    ///
    /// The slot's render cache is cleared. The caller is expected to follow
    /// up with [`init`](Self::init).
    pub fn acquire(&mut self) -> Result<SlotId, PoolExhausted> {
        let Some(idx) = self.free.pop_front() else {
            return Err(PoolExhausted {
                capacity: self.capacity(),
            });
        };
        let i = idx as usize;
        self.generation[i] = self.generation[i].wrapping_add(1);
        self.state[i] = SlotState::Active;
        self.render_cache[i] = None;
        self.lane[i] = None;
        self.active.push(idx);
        Ok(SlotId {
            idx,
            generation: self.generation[i],
        })
    }

    /// Writes entity fields into an acquired slot and drops any cached image.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the slot is not active.
    pub fn init(&mut self, id: SlotId, init: SlotInit) {
        self.validate(id);
        let i = id.idx as usize;
        self.text[i] = init.text;
        self.color[i] = init.color;
        self.mode[i] = init.mode;
        self.lane[i] = Some(init.lane);
        self.position[i] = init.position;
        self.width[i] = init.width;
        self.velocity[i] = init.velocity;
        self.spawn_time[i] = init.spawn_time;
        self.expire_at[i] = init.expire_at;
        self.render_cache[i] = None;
    }

    /// Returns an active slot to the free queue.
    ///
    /// Releasing a stale handle or an already free slot does nothing.
    /// Returns whether a slot was released.
    pub fn release(&mut self, id: SlotId) -> bool {
        if !self.is_active(id) {
            return false;
        }
        if let Some(pos) = self.active.iter().position(|&idx| idx == id.idx) {
            self.active.remove(pos);
        }
        self.free_slot(id.idx);
        true
    }

    /// Releases every active slot.
    pub fn release_all(&mut self) {
        let active = core::mem::take(&mut self.active);
        for &idx in &active {
            self.free_slot(idx);
        }
        // Keep the allocation for the next round of activations.
        self.active = active;
        self.active.clear();
    }

    /// Marks a slot free without touching `active`; callers keep that list
    /// in sync.
    pub(crate) fn free_slot(&mut self, idx: u32) {
        let i = idx as usize;
        self.state[i] = SlotState::Free;
        self.render_cache[i] = None;
        self.free.push_back(idx);
    }

    // -- Queries --

    /// Total number of slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.state.len()
    }

    /// Number of active slots.
    #[inline]
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of free slots.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Returns whether `id` refers to the current activation of an active slot.
    #[must_use]
    pub fn is_active(&self, id: SlotId) -> bool {
        let i = id.idx as usize;
        i < self.capacity()
            && self.generation[i] == id.generation
            && self.state[i] == SlotState::Active
    }

    /// Returns the state of the slot behind `id`, or `None` for a stale handle.
    #[must_use]
    pub fn state(&self, id: SlotId) -> Option<SlotState> {
        let i = id.idx as usize;
        (i < self.capacity() && self.generation[i] == id.generation).then(|| self.state[i])
    }

    /// Iterates active slots in activation order.
    pub fn active(&self) -> impl ExactSizeIterator<Item = SlotId> + '_ {
        self.active.iter().map(|&idx| SlotId {
            idx,
            generation: self.generation[idx as usize],
        })
    }

    // -- Field accessors (None for stale or free handles) --

    /// Text of an active entity.
    #[must_use]
    pub fn text(&self, id: SlotId) -> Option<&str> {
        self.is_active(id).then(|| &*self.text[id.idx as usize])
    }

    /// Fill color of an active entity.
    #[must_use]
    pub fn color(&self, id: SlotId) -> Option<Rgb8> {
        self.is_active(id).then(|| self.color[id.idx as usize])
    }

    /// Placement mode of an active entity.
    #[must_use]
    pub fn mode(&self, id: SlotId) -> Option<Mode> {
        self.is_active(id).then(|| self.mode[id.idx as usize])
    }

    /// Lane of an active, initialized entity.
    #[must_use]
    pub fn lane(&self, id: SlotId) -> Option<LaneId> {
        self.is_active(id)
            .then(|| self.lane[id.idx as usize])
            .flatten()
    }

    /// Left edge and baseline of an active entity.
    #[must_use]
    pub fn position(&self, id: SlotId) -> Option<Point> {
        self.is_active(id).then(|| self.position[id.idx as usize])
    }

    /// Measured width of an active entity.
    #[must_use]
    pub fn width(&self, id: SlotId) -> Option<f64> {
        self.is_active(id).then(|| self.width[id.idx as usize])
    }

    /// Spawn time of an active entity.
    #[must_use]
    pub fn spawn_time(&self, id: SlotId) -> Option<HostTime> {
        self.is_active(id).then(|| self.spawn_time[id.idx as usize])
    }

    /// Fixed-mode deadline of an active entity.
    #[must_use]
    pub fn expire_at(&self, id: SlotId) -> Option<HostTime> {
        self.is_active(id)
            .then(|| self.expire_at[id.idx as usize])
            .flatten()
    }

    /// Cached image of an active entity, if rendered during this activation.
    #[must_use]
    pub fn cached_drawable(&self, id: SlotId) -> Option<&Arc<Drawable>> {
        if !self.is_active(id) {
            return None;
        }
        self.render_cache[id.idx as usize].as_ref()
    }

    pub(crate) fn store_drawable(&mut self, id: SlotId, drawable: Arc<Drawable>) {
        if self.is_active(id) {
            self.render_cache[id.idx as usize] = Some(drawable);
        }
    }

    // -- Internal helpers --

    fn validate(&self, id: SlotId) {
        assert!(
            self.is_active(id),
            "stale or free SlotId: {id:?} (current gen: {}, state: {:?})",
            self.generation
                .get(id.idx as usize)
                .copied()
                .unwrap_or(u32::MAX),
            self.state.get(id.idx as usize)
        );
    }
}
