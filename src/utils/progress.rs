use crate::domain::model::TransactionStatus;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Per-record progress counter shared by the portal worker tasks. Results
/// arrive in completion order, so the counter is the only ordering there is.
pub struct ProgressTracker {
    total: usize,
    processed: AtomicUsize,
    start: Instant,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            processed: AtomicUsize::new(0),
            start: Instant::now(),
        }
    }

    pub fn record(&self, card_no: &str, status: TransactionStatus) {
        let i = self.processed.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!("Processed {}/{}: {} - {}", i, self.total, card_no, status);
    }

    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

/// Process-level stats for `--monitor` runs.
#[cfg(feature = "cli")]
pub struct RunMonitor {
    system: std::sync::Mutex<sysinfo::System>,
    pid: sysinfo::Pid,
    start: Instant,
    peak_memory_mb: AtomicUsize,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl RunMonitor {
    pub fn new(enabled: bool) -> Self {
        let mut system = sysinfo::System::new();
        system.refresh_all();

        Self {
            system: std::sync::Mutex::new(system),
            pid: sysinfo::get_current_pid().expect("Failed to get current PID"),
            start: Instant::now(),
            peak_memory_mb: AtomicUsize::new(0),
            enabled,
        }
    }

    fn memory_mb(&self) -> Option<usize> {
        let mut system = self.system.lock().ok()?;
        system.refresh_all();
        let memory_mb = (system.process(self.pid)?.memory() / 1024 / 1024) as usize;
        self.peak_memory_mb.fetch_max(memory_mb, Ordering::Relaxed);
        Some(memory_mb)
    }

    pub fn log_stats(&self, phase: &str) {
        if !self.enabled {
            return;
        }
        if let Some(memory_mb) = self.memory_mb() {
            tracing::info!(
                "📊 {} - Memory: {}MB, Time: {:?}",
                phase,
                memory_mb,
                self.start.elapsed()
            );
        }
    }

    pub fn log_final_stats(&self) {
        if !self.enabled {
            return;
        }
        self.memory_mb();
        tracing::info!(
            "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB",
            self.start.elapsed(),
            self.peak_memory_mb.load(Ordering::Relaxed)
        );
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(feature = "cli")]
impl Default for RunMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// No-op when built without the CLI feature.
#[cfg(not(feature = "cli"))]
pub struct RunMonitor;

#[cfg(not(feature = "cli"))]
impl RunMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn log_stats(&self, _phase: &str) {}

    pub fn log_final_stats(&self) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}
