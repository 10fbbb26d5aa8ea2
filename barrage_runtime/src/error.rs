// Copyright 2026 the Barrage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Runtime errors.

use barrage_core::error::StartError;
use thiserror::Error;

/// Why a [`Session`](crate::session::Session) or
/// [`Ticker`](crate::ticker::Ticker) operation failed.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The controller refused to start.
    #[error(transparent)]
    Start(#[from] StartError),
    /// The polling runtime could not be built.
    #[error("failed to build the polling runtime")]
    Runtime(#[source] std::io::Error),
    /// The ticker thread could not be spawned.
    #[error("failed to spawn the ticker thread")]
    Spawn(#[source] std::io::Error),
    /// The ticker thread panicked; the session is lost.
    #[error("ticker thread panicked")]
    TickerPanicked,
    /// `restart` was called before any successful `start`.
    #[error("no previous session to restart")]
    NeverStarted,
}
