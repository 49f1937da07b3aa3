//! Throughput and ETA arithmetic for a single transfer.

use std::time::{Duration, Instant};

/// Snapshot of a transfer after a chunk arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSample {
    pub bytes_received: u64,
    pub total_bytes: u64,
    pub elapsed: Duration,
}

impl ProgressSample {
    pub fn new(bytes_received: u64, total_bytes: u64, elapsed: Duration) -> Self {
        Self {
            bytes_received,
            total_bytes,
            elapsed,
        }
    }

    /// Average throughput in bytes per second.
    ///
    /// A zero elapsed time counts as one millisecond.
    pub fn speed(&self) -> f64 {
        let millis = (self.elapsed.as_secs_f64() * 1000.0).max(1.0);
        self.bytes_received as f64 / millis * 1000.0
    }

    /// Estimated time until the transfer completes at the current speed.
    pub fn eta(&self) -> Option<Duration> {
        if self.is_complete() {
            return Some(Duration::ZERO);
        }

        let speed = self.speed();
        if speed <= 0.0 {
            return None;
        }

        let remaining = self.total_bytes.saturating_sub(self.bytes_received) as f64;
        Duration::try_from_secs_f64(remaining / speed).ok()
    }

    /// Completed share of the transfer, always within `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total_bytes == 0 {
            return 1.0;
        }
        (self.bytes_received as f64 / self.total_bytes as f64).clamp(0.0, 1.0)
    }

    pub fn is_complete(&self) -> bool {
        self.bytes_received >= self.total_bytes
    }
}

/// Accumulates chunk arrivals into [`ProgressSample`]s.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total_bytes: u64,
    bytes_received: u64,
    started: Instant,
}

impl ProgressTracker {
    pub fn new(total_bytes: u64, started: Instant) -> Self {
        Self {
            total_bytes,
            bytes_received: 0,
            started,
        }
    }

    /// Account for a chunk of `len` bytes observed at `now`.
    pub fn record(&mut self, len: usize, now: Instant) -> ProgressSample {
        self.bytes_received = self.bytes_received.saturating_add(len as u64);
        self.sample_at(now)
    }

    pub fn sample_at(&self, now: Instant) -> ProgressSample {
        ProgressSample::new(
            self.bytes_received,
            self.total_bytes,
            now.saturating_duration_since(self.started),
        )
    }

    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }
}
