use serde::{Deserialize, Serialize};
use std::sync::Mutex;

pub struct SolveMetrics {
    inner: Mutex<MetricsSnapshot>,
}

/// Counters accumulated over a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub solves: usize,
    pub failures: usize,
    /// Tokens that were missing or unparsable and read as zero.
    pub parse_anomalies: usize,
}

impl SolveMetrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_solve(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.solves += 1;
        }
    }

    pub fn record_failure(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.failures += 1;
        }
    }

    pub fn record_anomalies(&self, count: usize) {
        if count == 0 {
            return;
        }
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.parse_anomalies += count;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner.lock().map(|m| *m).unwrap_or_default()
    }
}

impl Default for SolveMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = SolveMetrics::new();
        metrics.record_solve();
        metrics.record_solve();
        metrics.record_failure();
        metrics.record_anomalies(3);
        metrics.record_anomalies(0);
        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                solves: 2,
                failures: 1,
                parse_anomalies: 3,
            }
        );
    }
}
