// Copyright 2026 the Barrage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sorted entry index and the cursor that walks it.
//!
//! A [`Timeline`] is built once per session and never mutated. A [`Cursor`]
//! turns a stream of playback positions into the entries that became due
//! since the previous position. Small steps (forward or backward) emit
//! entries incrementally; a jump larger than the threshold is a seek and
//! repositions the cursor by binary search without emitting anything.

use crate::entry::Entry;

/// Default seek threshold, in seconds of media time.
pub const JUMP_THRESHOLD_SECS: f64 = 2.0;

/// Immutable entries sorted ascending by start time.
///
/// Entries sharing a start time keep their load order.
#[derive(Clone, Debug, Default)]
pub struct Timeline {
    entries: Vec<Entry>,
}

impl Timeline {
    /// Builds a timeline from entries in load order.
    ///
    /// Entries with a non-finite start time are discarded.
    #[must_use]
    pub fn new(mut entries: Vec<Entry>) -> Self {
        let before = entries.len();
        entries.retain(|e| e.start_time.is_finite());
        let discarded = before - entries.len();
        if discarded > 0 {
            log::warn!("discarded {discarded} entries with non-finite start times");
        }
        // `sort_by` is stable.
        entries.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        Self { entries }
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the timeline has no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entry at `index`.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// Returns all entries in order.
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Returns the first index whose start time is `>= position`.
    #[must_use]
    pub fn lower_bound(&self, position: f64) -> usize {
        self.entries.partition_point(|e| e.start_time < position)
    }
}

impl FromIterator<Entry> for Timeline {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Read position into a [`Timeline`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cursor {
    next_index: usize,
    last_position: f64,
    jump_threshold: f64,
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

impl Cursor {
    /// Sentinel position meaning "never synced".
    pub const UNSYNCED: f64 = -1.0;

    /// Creates a cursor at the start with the default seek threshold.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_jump_threshold(JUMP_THRESHOLD_SECS)
    }

    /// Creates a cursor at the start with a custom seek threshold.
    #[must_use]
    pub const fn with_jump_threshold(jump_threshold: f64) -> Self {
        Self {
            next_index: 0,
            last_position: Self::UNSYNCED,
            jump_threshold,
        }
    }

    /// Index of the next entry that has not been emitted.
    #[inline]
    #[must_use]
    pub const fn next_index(&self) -> usize {
        self.next_index
    }

    /// Position passed to the most recent [`advance`](Self::advance).
    #[inline]
    #[must_use]
    pub const fn last_position(&self) -> f64 {
        self.last_position
    }

    /// Seek threshold in seconds.
    #[inline]
    #[must_use]
    pub const fn jump_threshold(&self) -> f64 {
        self.jump_threshold
    }

    /// Returns the cursor to its initial, unsynced state.
    pub const fn reset(&mut self) {
        self.next_index = 0;
        self.last_position = Self::UNSYNCED;
    }

    /// Moves the cursor to `position`.
    ///
    /// Returns [`Advance::Seek`] when the position jumped by more than the
    /// threshold in either direction. Otherwise returns [`Advance::Due`], a
    /// lazy iterator over the entries that became due; entries the caller
    /// does not consume stay due for the next call.
    ///
    /// Non-finite positions are ignored and leave the cursor unchanged.
    pub fn advance<'a>(&'a mut self, timeline: &'a Timeline, position: f64) -> Advance<'a> {
        if !position.is_finite() {
            return Advance::Due(DueEntries {
                timeline,
                cursor: self,
                position: f64::NEG_INFINITY,
            });
        }

        if (position - self.last_position).abs() > self.jump_threshold {
            let index = timeline.lower_bound(position);
            log::debug!(
                "seek {:.3}s -> {position:.3}s, cursor {} -> {index}",
                self.last_position,
                self.next_index
            );
            self.next_index = index;
            self.last_position = position;
            return Advance::Seek { index };
        }

        self.last_position = position;
        Advance::Due(DueEntries {
            timeline,
            cursor: self,
            position,
        })
    }
}

/// Result of [`Cursor::advance`].
#[derive(Debug)]
#[must_use = "due entries are only consumed by iterating"]
pub enum Advance<'a> {
    /// The position jumped; every active entity must be cleared.
    Seek {
        /// New cursor index, the leftmost index with `start_time >= position`.
        index: usize,
    },
    /// Entries that became due, in timeline order.
    Due(DueEntries<'a>),
}

impl Advance<'_> {
    /// Returns whether this result is a seek.
    #[must_use]
    pub const fn is_seek(&self) -> bool {
        matches!(self, Self::Seek { .. })
    }
}

/// Lazy iterator over due entries. Advances the cursor as it yields.
#[derive(Debug)]
pub struct DueEntries<'a> {
    timeline: &'a Timeline,
    cursor: &'a mut Cursor,
    position: f64,
}

impl<'a> Iterator for DueEntries<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<&'a Entry> {
        let entry = self.timeline.get(self.cursor.next_index)?;
        if entry.start_time > self.position {
            return None;
        }
        self.cursor.next_index += 1;
        Some(entry)
    }
}

impl core::iter::FusedIterator for DueEntries<'_> {}
