// Copyright 2026 the Barrage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capability interfaces for the media session and window focus.
//!
//! Platform integrations implement [`MediaSource`] and [`ForegroundProbe`].
//! [`NullMedia`] and [`AssumeForeground`] are the no-op variants chosen at
//! composition time when no platform integration is available.

use core::future::Future;

use crate::error::SourceError;

/// Playback state reported by a media session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlaybackStatus {
    /// Media is playing; positions advance.
    Playing,
    /// Media is paused.
    Paused,
    /// Media is stopped.
    Stopped,
    /// The session did not report a state.
    #[default]
    Unknown,
}

/// One observation of the media session.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionSample {
    /// Playback position in seconds.
    pub position: f64,
    /// Playback state.
    pub status: PlaybackStatus,
    /// Identifier of the application owning the session.
    pub source_id: String,
}

impl PositionSample {
    /// Creates a sample.
    #[must_use]
    pub fn new(position: f64, status: PlaybackStatus, source_id: impl Into<String>) -> Self {
        Self {
            position,
            status,
            source_id: source_id.into(),
        }
    }
}

/// A media session that can be followed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceInfo {
    /// Identifier matched against
    /// [`EngineConfig::target_source`](crate::config::EngineConfig::target_source).
    pub id: String,
    /// Human-readable label, such as a media title.
    pub label: String,
}

/// Asynchronous access to the platform media session.
///
/// Calls may be slow or fail; failures are treated as "no sample" by the
/// poller.
pub trait MediaSource: Send + Sync + 'static {
    /// Returns the current session's sample, or `None` when no session exists.
    fn current_sample(
        &self,
    ) -> impl Future<Output = Result<Option<PositionSample>, SourceError>> + Send;

    /// Lists sessions that could be followed.
    fn list_sources(&self) -> impl Future<Output = Result<Vec<SourceInfo>, SourceError>> + Send;
}

/// Synchronous window-focus predicates.
pub trait ForegroundProbe {
    /// Whether the followed player's window is in the foreground.
    fn is_target_foreground(&self) -> bool;

    /// Whether the overlay's own window is in the foreground.
    fn is_self_foreground(&self) -> bool;
}

/// A media source with no sessions.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullMedia;

impl MediaSource for NullMedia {
    async fn current_sample(&self) -> Result<Option<PositionSample>, SourceError> {
        Ok(None)
    }

    async fn list_sources(&self) -> Result<Vec<SourceInfo>, SourceError> {
        Ok(Vec::new())
    }
}

/// A probe that always reports the target as foreground.
#[derive(Clone, Copy, Debug, Default)]
pub struct AssumeForeground;

impl ForegroundProbe for AssumeForeground {
    fn is_target_foreground(&self) -> bool {
        true
    }

    fn is_self_foreground(&self) -> bool {
        false
    }
}
