// Copyright 2026 the Barrage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diagnostics for barrage sessions.
//!
//! - [`overlay::DebugOverlay`]: rolling tick rate and pool counters, with a
//!   corner placement for drawing them over the video.
//! - [`pretty::PrettyWriter`]: one human-readable line per snapshot.
//! - [`jsonl::JsonLinesWriter`]: one JSON object per snapshot.
//! - [`usage::SysinfoUsage`]: throttled process CPU and memory readings.

pub mod jsonl;
pub mod overlay;
pub mod pretty;
pub mod usage;
