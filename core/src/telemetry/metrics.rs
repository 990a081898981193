use std::sync::Mutex;

/// Acquisition counters for one pipeline run.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

struct Metrics {
    acquisitions: usize,
    read_failures: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics {
                acquisitions: 0,
                read_failures: 0,
            }),
        }
    }

    pub fn record_acquisition(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.acquisitions += 1;
        }
    }

    pub fn record_read_failure(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.read_failures += 1;
        }
    }

    /// (acquisitions processed, read failures).
    pub fn snapshot(&self) -> (usize, usize) {
        if let Ok(metrics) = self.inner.lock() {
            (metrics.acquisitions, metrics.read_failures)
        } else {
            (0, 0)
        }
    }

    pub fn reset(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.acquisitions = 0;
            metrics.read_failures = 0;
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
