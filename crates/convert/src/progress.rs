//! Structured progress reporting for batch runs.
//!
//! Every document in a batch produces one event carrying its outcome, so a
//! caller can drive a progress bar or a log without polling.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Outcome of one document in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Processed,
    Skipped,
    Failed,
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DocumentStatus::Processed => "processed",
            DocumentStatus::Skipped => "skipped",
            DocumentStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Progress event emitted during a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    /// Phase of the run: "scan", "convert", "archive"
    pub phase: String,

    /// 1-based position of the document in the run
    pub current: u64,

    /// Total documents in the run (if known)
    pub total: Option<u64>,

    /// Percentage complete (0.0 - 100.0)
    pub percentage: Option<f64>,

    pub document_id: Option<String>,

    pub status: Option<DocumentStatus>,

    /// Human-readable message
    pub message: String,

    /// Elapsed time since the run started
    pub elapsed_secs: Option<f64>,
}

impl ProgressEvent {
    pub fn new(phase: impl Into<String>, current: u64, total: Option<u64>, message: impl Into<String>) -> Self {
        let percentage = total.map(|t| if t > 0 { (current as f64 / t as f64) * 100.0 } else { 0.0 });

        Self {
            phase: phase.into(),
            current,
            total,
            percentage,
            document_id: None,
            status: None,
            message: message.into(),
            elapsed_secs: None,
        }
    }

    pub fn with_document(mut self, document_id: impl Into<String>, status: DocumentStatus) -> Self {
        self.document_id = Some(document_id.into());
        self.status = Some(status);
        self
    }

    pub fn with_elapsed(mut self, elapsed_secs: f64) -> Self {
        self.elapsed_secs = Some(elapsed_secs);
        self
    }

    /// Format as a simple user-facing line.
    pub fn format_simple(&self) -> String {
        let progress = match self.total {
            Some(total) => format!("{}/{}", self.current, total),
            None => format!("{}", self.current),
        };

        let pct = self
            .percentage
            .map(|p| format!(" ({:.0}%)", p))
            .unwrap_or_default();

        match (&self.document_id, self.status) {
            (Some(id), Some(status)) => {
                format!("[{}] {}{} {} {} - {}", self.phase, progress, pct, id, status, self.message)
            }
            _ => format!("[{}] {}{} - {}", self.phase, progress, pct, self.message),
        }
    }
}

/// Callback for progress events.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Progress reporter that emits events through a callback.
#[derive(Clone)]
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
    start_time: Arc<Instant>,
}

impl ProgressReporter {
    pub fn new(callback: ProgressCallback) -> Self {
        Self {
            callback: Some(callback),
            start_time: Arc::new(Instant::now()),
        }
    }

    /// Reporter that drops every event.
    pub fn noop() -> Self {
        Self {
            callback: None,
            start_time: Arc::new(Instant::now()),
        }
    }

    pub fn emit(&self, event: ProgressEvent) {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let event = event.with_elapsed(elapsed);

        tracing::debug!(
            phase = %event.phase,
            current = event.current,
            total = ?event.total,
            document = ?event.document_id,
            status = ?event.status,
            message = %event.message,
            elapsed_secs = elapsed,
            "Progress event"
        );

        if let Some(callback) = &self.callback {
            callback(event);
        }
    }

    /// Emit the resume scan result.
    pub fn scan(&self, existing: u64, dir: &str) {
        self.emit(ProgressEvent::new(
            "scan",
            existing,
            None,
            format!("{} documents already in {}", existing, dir),
        ));
    }

    /// Emit one document's outcome.
    pub fn document(
        &self,
        current: u64,
        total: u64,
        document_id: &str,
        status: DocumentStatus,
        message: impl Into<String>,
    ) {
        self.emit(
            ProgressEvent::new("convert", current, Some(total), message)
                .with_document(document_id, status),
        );
    }

    /// Emit archive creation.
    pub fn archive(&self, files: u64, path: &str) {
        self.emit(ProgressEvent::new(
            "archive",
            files,
            Some(files),
            format!("writing {}", path),
        ));
    }
}
