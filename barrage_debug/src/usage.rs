// Copyright 2026 the Barrage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Process CPU and memory readings.
//!
//! Refreshing process tables is not free, so [`DebugOverlay`] only asks its
//! [`UsageSource`] every [`USAGE_EVERY`] frames and repeats the last reading
//! in between.
//!
//! [`DebugOverlay`]: crate::overlay::DebugOverlay

use serde::Serialize;
use sysinfo::{Pid, ProcessesToUpdate, System};

/// Frames between usage refreshes.
pub const USAGE_EVERY: u32 = 30;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// One reading for the current process.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ProcessUsage {
    /// CPU use since the previous refresh, in percent of one core.
    pub cpu_percent: f32,
    /// Resident memory in MiB.
    pub memory_mb: f64,
}

/// Something that can report [`ProcessUsage`].
pub trait UsageSource {
    /// Takes a fresh reading, or `None` if the process can't be inspected.
    fn refresh(&mut self) -> Option<ProcessUsage>;
}

/// Reads the current process through [`sysinfo`].
#[derive(Debug)]
pub struct SysinfoUsage {
    system: System,
    pid: Option<Pid>,
}

impl Default for SysinfoUsage {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoUsage {
    /// Creates a reader for this process and primes the CPU counter, so the
    /// first real refresh measures a full interval.
    #[must_use]
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(err) => {
                log::warn!("process usage unavailable: {err}");
                None
            }
        };
        let mut usage = Self {
            system: System::new(),
            pid,
        };
        let _ = usage.refresh();
        usage
    }
}

impl UsageSource for SysinfoUsage {
    fn refresh(&mut self) -> Option<ProcessUsage> {
        let pid = self.pid?;
        self.system
            .refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        let process = self.system.process(pid)?;
        Some(ProcessUsage {
            cpu_percent: process.cpu_usage(),
            memory_mb: process.memory() as f64 / BYTES_PER_MB,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_own_process() {
        let mut usage = SysinfoUsage::new();
        let Some(reading) = usage.refresh() else {
            panic!("the test process is visible to itself");
        };
        assert!(reading.memory_mb > 0.0, "resident memory: {reading:?}");
        assert!(reading.cpu_percent >= 0.0, "cpu: {reading:?}");
    }
}
