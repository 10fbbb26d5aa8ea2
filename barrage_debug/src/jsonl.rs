// Copyright 2026 the Barrage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON-lines export of diagnostics snapshots.

use std::io::{self, Write};

use crate::overlay::OverlayStats;

/// Writes one JSON object per [`OverlayStats`] snapshot, newline-separated.
#[derive(Debug)]
pub struct JsonLinesWriter<W> {
    writer: W,
    written: u64,
}

impl<W: Write> JsonLinesWriter<W> {
    /// Creates an exporter writing to `writer`.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Lines written so far.
    #[must_use]
    pub const fn written(&self) -> u64 {
        self.written
    }

    /// Appends one snapshot.
    pub fn write(&mut self, stats: &OverlayStats) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, stats)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Flushes and returns the destination.
    pub fn finish(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}
