// Usage metrics module
//
// Provides lightweight counters for monitoring the editor's lifecycle.
// Nothing leaves the process; the summary goes to the log on shutdown.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Application identifier recorded with the metrics session.
pub const STUDIO_APP_ID: &str = "meridian-studio";

/// Process-lifetime usage metrics
///
/// Uses atomic operations for thread-safe tracking without locks. Counters
/// are collected throughout the editor's lifecycle and logged on shutdown.
#[derive(Debug)]
pub struct MetricsClient {
    /// Identifier of the application this session belongs to
    app_id: &'static str,

    /// Whether the editor currently has a visible, focused main window
    active: AtomicBool,

    /// Total time spent with the main window active, in milliseconds
    pub active_time_ms: AtomicU64,

    /// Sessions opened from disk
    pub sessions_opened: AtomicUsize,

    /// Sessions created from a template
    pub sessions_created: AtomicUsize,

    /// Times the project picker was shown
    pub pickers_shown: AtomicUsize,

    /// Times startup ended in a process relaunch
    pub relaunches: AtomicUsize,

    /// Application start time
    start_time: Instant,

    /// When the main window last became active, as milliseconds since start
    last_activation_ms: AtomicU64,
}

impl MetricsClient {
    /// Create a new MetricsClient instance
    pub fn new(app_id: &'static str) -> Self {
        tracing::debug!("Metrics session started for {}", app_id);
        Self {
            app_id,
            active: AtomicBool::new(false),
            active_time_ms: AtomicU64::new(0),
            sessions_opened: AtomicUsize::new(0),
            sessions_created: AtomicUsize::new(0),
            pickers_shown: AtomicUsize::new(0),
            relaunches: AtomicUsize::new(0),
            start_time: Instant::now(),
            last_activation_ms: AtomicU64::new(0),
        }
    }

    /// Record whether the editor is in active (foreground) use
    ///
    /// Transitions to inactive fold the elapsed active span into
    /// `active_time_ms`; repeated calls with the same value are no-ops.
    pub fn set_active_state(&self, active: bool) {
        let was_active = self.active.swap(active, Ordering::Relaxed);
        if was_active == active {
            return;
        }

        let now_ms = self.start_time.elapsed().as_millis() as u64;
        if active {
            self.last_activation_ms.store(now_ms, Ordering::Relaxed);
        } else {
            let since = now_ms.saturating_sub(self.last_activation_ms.load(Ordering::Relaxed));
            self.active_time_ms.fetch_add(since, Ordering::Relaxed);
        }
        tracing::debug!("Editor active state: {}", active);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    /// Record a session opened from disk
    pub fn record_session_opened(&self) {
        self.sessions_opened.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a session created from a template
    pub fn record_session_created(&self) {
        self.sessions_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the project picker being shown
    pub fn record_picker_shown(&self) {
        self.pickers_shown.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a startup relaunch
    pub fn record_relaunch(&self) {
        self.relaunches.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        // Fold in a still-open active span before reading the counter.
        if self.is_active() {
            self.set_active_state(false);
        }

        let uptime = self.uptime();
        tracing::info!("=== Usage Metrics Summary ===");
        tracing::info!(
            "App: {}, uptime: {:.2}s, active: {:.2}s",
            self.app_id,
            uptime.as_secs_f64(),
            self.active_time_ms.load(Ordering::Relaxed) as f64 / 1000.0
        );
        tracing::info!(
            "Sessions: {} opened, {} created",
            self.sessions_opened.load(Ordering::Relaxed),
            self.sessions_created.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Picker shown {} times, relaunches: {}",
            self.pickers_shown.load(Ordering::Relaxed),
            self.relaunches.load(Ordering::Relaxed)
        );
    }
}

impl Default for MetricsClient {
    fn default() -> Self {
        Self::new(STUDIO_APP_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_metrics_creation() {
        let metrics = MetricsClient::new(STUDIO_APP_ID);
        assert_eq!(metrics.sessions_opened.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.relaunches.load(Ordering::Relaxed), 0);
        assert!(!metrics.is_active());
    }

    #[test]
    fn test_record_session_operations() {
        let metrics = MetricsClient::default();

        metrics.record_session_opened();
        metrics.record_session_opened();
        metrics.record_session_created();
        metrics.record_picker_shown();
        metrics.record_relaunch();

        assert_eq!(metrics.sessions_opened.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.sessions_created.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.pickers_shown.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.relaunches.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_active_state_transitions() {
        let metrics = MetricsClient::default();

        metrics.set_active_state(true);
        assert!(metrics.is_active());

        // Repeated activation does not accumulate time.
        metrics.set_active_state(true);

        thread::sleep(Duration::from_millis(10));
        metrics.set_active_state(false);

        assert!(!metrics.is_active());
        assert!(metrics.active_time_ms.load(Ordering::Relaxed) >= 10);
    }

    #[test]
    fn test_uptime() {
        let metrics = MetricsClient::default();
        thread::sleep(Duration::from_millis(10));
        assert!(metrics.uptime().as_millis() >= 10);
    }
}
