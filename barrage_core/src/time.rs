// Copyright 2026 the Barrage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Monotonic host time.
//!
//! [`HostTime`] is a point on a monotonic clock, expressed as nanoseconds
//! since the clock's origin. It is independent of wall-clock adjustments and
//! is what lane reservations and fixed-entity deadlines are measured against.
//!
//! [`Clock`] is the source of [`HostTime`] samples. [`MonotonicClock`] wraps
//! [`Instant`]; [`ManualClock`] is advanced explicitly and is shared by
//! cloning, which makes timing-dependent behavior reproducible.

use core::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// A point in time, in nanoseconds since the owning clock's origin.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HostTime(pub u64);

impl HostTime {
    /// The clock origin.
    pub const ZERO: Self = Self(0);

    /// Returns the raw nanosecond value.
    #[inline]
    #[must_use]
    pub const fn nanos(self) -> u64 {
        self.0
    }

    /// Creates a host time from seconds since the origin.
    ///
    /// Negative and NaN inputs clamp to [`HostTime::ZERO`].
    #[must_use]
    pub fn from_secs_f64(secs: f64) -> Self {
        Self::ZERO.saturating_add(duration_from_secs(secs))
    }

    /// Returns this time as seconds since the origin.
    #[inline]
    #[must_use]
    pub fn as_secs_f64(self) -> f64 {
        Duration::from_nanos(self.0).as_secs_f64()
    }

    /// Adds a duration, saturating at the end of the representable range.
    #[must_use]
    pub fn saturating_add(self, duration: Duration) -> Self {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(nanos))
    }

    /// Adds a (possibly fractional) number of seconds.
    ///
    /// Negative and NaN amounts add nothing.
    #[must_use]
    pub fn saturating_add_secs(self, secs: f64) -> Self {
        self.saturating_add(duration_from_secs(secs))
    }

    /// Returns the duration between `self` and an earlier time, or zero if
    /// `earlier` is after `self`.
    #[inline]
    #[must_use]
    pub const fn saturating_duration_since(self, earlier: Self) -> Duration {
        Duration::from_nanos(self.0.saturating_sub(earlier.0))
    }
}

impl fmt::Debug for HostTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostTime({:.6}s)", self.as_secs_f64())
    }
}

/// Converts seconds to a [`Duration`], clamping instead of panicking.
pub(crate) fn duration_from_secs(secs: f64) -> Duration {
    // `f64::max` discards NaN.
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}

/// A source of monotonic [`HostTime`] samples.
pub trait Clock: Send + 'static {
    /// Returns the current time.
    fn now(&self) -> HostTime;
}

/// A [`Clock`] backed by [`Instant`], with its origin at construction.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    /// Creates a clock whose origin is now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> HostTime {
        HostTime::ZERO.saturating_add(self.origin.elapsed())
    }
}

/// A [`Clock`] that only moves when told to.
///
/// Clones share the same underlying time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock starting at `start`.
    #[must_use]
    pub fn new(start: HostTime) -> Self {
        Self {
            nanos: Arc::new(AtomicU64::new(start.0)),
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let step = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        // fetch_update never fails when the closure always returns Some.
        let _ = self
            .nanos
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                Some(n.saturating_add(step))
            });
    }

    /// Sets the clock to `to`. Callers are responsible for keeping it monotonic.
    pub fn set(&self, to: HostTime) {
        self.nanos.store(to.0, Ordering::Release);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> HostTime {
        HostTime(self.nanos.load(Ordering::Acquire))
    }
}
