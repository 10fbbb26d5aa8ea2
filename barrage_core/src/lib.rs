// Copyright 2026 the Barrage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timeline-synchronized scheduling, pooling, animation, and rasterization
//! for danmaku overlays.
//!
//! `barrage_core` turns a sorted list of timed comments and a stream of media
//! playback positions into frames of positioned, outlined text images. It has
//! no threads and no platform code: a host feeds it samples and ticks.
//!
//! # Architecture
//!
//! ```text
//!   PositionSample
//!       │
//!       ▼
//!   SyncController::on_sample ──► Cursor::advance ──► Seek ──► release all
//!                                       │
//!                                       ▼
//!                                   DueEntries
//!                                       │
//!                 ┌─────────────────────┘
//!                 ▼
//!   TrackScheduler::allocate ──► EntityPool::acquire + init
//!
//!   SyncController::tick ──► animate::step ──► RenderCache::render_set ──► Frame
//! ```
//!
//! **[`timeline`]**: Sorted [`Entry`](entry::Entry) list and the
//! [`Cursor`](timeline::Cursor) that yields due entries and detects seeks.
//!
//! **[`lanes`]**: Per-mode lane occupancy and lane allocation.
//!
//! **[`pool`]**: Fixed-capacity struct-of-arrays entity storage with
//! generational [`SlotId`](pool::SlotId) handles.
//!
//! **[`animate`]**: Per-tick motion and expiry.
//!
//! **[`render`]**: Memoized outlined text images, rasterized by [`raster`]
//! from outlines supplied by a [`GlyphSource`](glyph::GlyphSource).
//!
//! **[`controller`]**: The [`SyncController`](controller::SyncController)
//! state machine that ties the above together.
//!
//! **[`source`]**: Capability traits for the media session and window focus.
//!
//! **[`config`]**: [`EngineConfig`](config::EngineConfig), the per-session
//! settings snapshot.

pub mod animate;
pub mod config;
pub mod controller;
pub mod entry;
pub mod error;
pub mod glyph;
pub mod lanes;
pub mod pool;
pub mod raster;
pub mod render;
pub mod source;
pub mod time;
pub mod timeline;
