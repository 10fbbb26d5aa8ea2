// Copyright 2026 the Barrage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Concurrency boundary for `barrage_core`.
//!
//! The core engine is single-threaded. This crate adds the two activities
//! around it:
//!
//! ```text
//!   tokio task (poller)                 ticker thread
//!   ───────────────────                 ─────────────
//!   MediaSource::current_sample         Session::tick
//!        │                                   │
//!        ▼                                   ▼
//!   MailboxSender::post ──► slot ──► MailboxReceiver::take
//!                                            │
//!                                            ▼
//!                               SyncController::on_sample + tick
//!                                            │
//!                                            ▼
//!                                  FrameSlot ──► renderer
//! ```
//!
//! **[`mailbox`]**: Single-slot latest-value handoff.
//!
//! **[`poller`]**: Polling task with back-off and bounded shutdown.
//!
//! **[`session`]**: [`Session`](session::Session) lifecycle:
//! `Idle → Running → Stopping → Idle`.
//!
//! **[`ticker`]**: Fixed-rate animation thread and the
//! [`FrameSlot`](ticker::FrameSlot) it publishes to.

pub mod error;
pub mod mailbox;
pub mod poller;
pub mod session;
pub mod ticker;

pub use error::SessionError;
pub use session::{Phase, Session, SessionOptions};
