//! Crash diagnostics.
//!
//! Keeps a bounded tail of the most recent high-severity log lines and folds
//! it into a plain-text crash report when the process panics. The tail is
//! lock-free so recording never blocks a logging call site.

use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use crossbeam_queue::ArrayQueue;
use std::fmt::Write as _;
use std::fs;
use std::panic;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Number of recent high-severity log lines kept for crash reports.
pub const CRASH_TAIL_CAPACITY: usize = 5;

/// Lock-free ring of the most recent warning-or-worse log lines.
///
/// Never holds more than [`CRASH_TAIL_CAPACITY`] lines; appending to a full
/// ring evicts the oldest entry.
#[derive(Clone)]
pub struct LogTail {
    lines: Arc<ArrayQueue<String>>,
}

impl LogTail {
    pub fn new() -> Self {
        Self {
            lines: Arc::new(ArrayQueue::new(CRASH_TAIL_CAPACITY)),
        }
    }

    /// Append a line, evicting the oldest when the ring is full.
    pub fn record(&self, line: String) {
        self.lines.force_push(line);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Drain the tail oldest-first, leaving it empty.
    pub fn drain(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(CRASH_TAIL_CAPACITY);
        while let Some(line) = self.lines.pop() {
            out.push(line);
        }
        out
    }
}

impl Default for LogTail {
    fn default() -> Self {
        Self::new()
    }
}

/// `tracing` layer that copies WARN-or-worse events into a [`LogTail`].
pub struct CrashTailLayer {
    tail: LogTail,
}

impl CrashTailLayer {
    pub fn new(tail: LogTail) -> Self {
        Self { tail }
    }
}

impl<S: Subscriber> Layer<S> for CrashTailLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        // Levels order ERROR < WARN < INFO, so this keeps WARN and ERROR.
        if *meta.level() > Level::WARN {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.tail
            .record(format!("{} {}: {}", meta.level(), meta.target(), visitor.0));
    }
}

#[derive(Default)]
struct MessageVisitor(String);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}

/// Install a panic hook that writes a crash report with the panic payload,
/// its location, and the recent high-severity log tail.
///
/// Reports land in `report_dir` as `crash-<timestamp>.log`. The previously
/// installed hook still runs afterwards, so the default backtrace output is
/// preserved.
pub fn install_panic_hook(tail: LogTail, report_dir: Utf8PathBuf) {
    static HANDLING_PANIC: AtomicBool = AtomicBool::new(false);

    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if HANDLING_PANIC.swap(true, Ordering::SeqCst) {
            // Panicked while reporting a panic; skip straight to the
            // default output.
            previous(info);
            return;
        }

        let message = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        let location = info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown location".to_string());

        match write_crash_report(&report_dir, &message, &location, &tail) {
            Ok(path) => eprintln!("Crash report written to {}", path),
            Err(e) => eprintln!("Failed to write crash report: {}", e),
        }

        HANDLING_PANIC.store(false, Ordering::SeqCst);
        previous(info);
    }));

    tracing::debug!("Panic hook installed");
}

/// Write a crash report and return its path.
///
/// Split out of the panic hook so shutdown paths can produce a report on
/// demand as well.
pub fn write_crash_report(
    report_dir: &Utf8Path,
    message: &str,
    location: &str,
    tail: &LogTail,
) -> std::io::Result<Utf8PathBuf> {
    fs::create_dir_all(report_dir)?;
    let file_name = format!("crash-{}.log", Utc::now().format("%Y%m%d-%H%M%S"));
    let path = report_dir.join(file_name);

    let mut report = String::new();
    let _ = writeln!(report, "{} v{} crash report", crate::EDITOR_NAME, crate::VERSION);
    let _ = writeln!(report, "time: {}", Utc::now().to_rfc3339());
    let _ = writeln!(report, "panic: {}", message);
    let _ = writeln!(report, "location: {}", location);

    let lines = tail.drain();
    if lines.is_empty() {
        let _ = writeln!(report, "no recent warnings or errors");
    } else {
        let _ = writeln!(report, "recent warnings and errors:");
        for line in &lines {
            let _ = writeln!(report, "  {}", line);
        }
    }

    fs::write(&path, report)?;
    Ok(path)
}
