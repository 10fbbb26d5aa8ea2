// Copyright 2026 the Barrage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Only [`StartError`] is ever surfaced to a caller as a failure. The other
//! conditions are recovered from inside the engine: [`PoolExhausted`] drops a
//! spawn, and [`SourceError`] means "no sample this poll".

use thiserror::Error;

/// Rejected [`EngineConfig`](crate::config::EngineConfig) values.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// `track_count` was zero.
    #[error("track_count must be at least 1")]
    NoTracks,
    /// `max_pool_size` was zero or does not fit a slot index.
    #[error("max_pool_size must be between 1 and {max}, got {got}", max = u32::MAX)]
    PoolSize {
        /// The rejected size.
        got: usize,
    },
    /// A field that must be finite and strictly positive was not.
    #[error("{field} must be finite and positive, got {value}")]
    NotPositive {
        /// Field name.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// A field that must be finite and non-negative was not.
    #[error("{field} must be finite and non-negative, got {value}")]
    Negative {
        /// Field name.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// `opacity` was outside `0.0..=1.0`.
    #[error("opacity must be within 0.0..=1.0, got {0}")]
    Opacity(f32),
}

/// Why a session could not start.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum StartError {
    /// The timeline has no entries (missing or unparseable comment file).
    #[error("timeline is empty")]
    EmptyTimeline,
    /// The configuration snapshot was rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    /// `start` was called while a session was running.
    #[error("a session is already running")]
    AlreadyRunning,
}

/// No free slot was available in the entity pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("entity pool exhausted ({capacity} slots)")]
pub struct PoolExhausted {
    /// Total slots in the pool.
    pub capacity: usize,
}

/// A transient failure reported by a media source.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("media source error: {message}")]
pub struct SourceError {
    message: String,
}

impl SourceError {
    /// Creates an error with a human-readable message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
