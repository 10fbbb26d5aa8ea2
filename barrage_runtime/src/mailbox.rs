// Copyright 2026 the Barrage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-slot, latest-value handoff from the poller to the ticker.
//!
//! The poller [`post`](MailboxSender::post)s every observation; the ticker
//! [`take`](MailboxReceiver::take)s whatever is newest without blocking.
//! Reports the ticker never saw are overwritten, not queued.

use barrage_core::source::PositionSample;
use tokio::sync::watch;

/// One poll result.
#[derive(Clone, Debug, PartialEq)]
pub enum Report {
    /// The media collaborator reported no session.
    NoSession,
    /// A position observation.
    Sample(PositionSample),
}

impl Report {
    /// The sample, if any.
    #[must_use]
    pub fn sample(&self) -> Option<&PositionSample> {
        match self {
            Self::NoSession => None,
            Self::Sample(sample) => Some(sample),
        }
    }
}

/// Creates a connected sender and receiver.
#[must_use]
pub fn channel() -> (MailboxSender, MailboxReceiver) {
    let (tx, rx) = watch::channel(None);
    (MailboxSender { tx }, MailboxReceiver { rx })
}

/// Writing half, owned by the poller.
#[derive(Debug)]
pub struct MailboxSender {
    tx: watch::Sender<Option<Report>>,
}

impl MailboxSender {
    /// Replaces the slot's content. Never blocks and never fails, even when
    /// the receiver is gone.
    pub fn post(&self, report: Report) {
        self.tx.send_replace(Some(report));
    }
}

/// Reading half, owned by the ticker.
#[derive(Debug)]
pub struct MailboxReceiver {
    rx: watch::Receiver<Option<Report>>,
}

impl MailboxReceiver {
    /// Returns the newest report if it arrived after the previous `take`.
    ///
    /// A report posted just before the sender was dropped is still returned.
    pub fn take(&mut self) -> Option<Report> {
        let latest = self.rx.borrow_and_update();
        if latest.has_changed() {
            latest.clone()
        } else {
            None
        }
    }
}
