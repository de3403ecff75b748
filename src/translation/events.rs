/*!
 * Job notifications.
 *
 * A running job talks to its caller only through [`JobEvent`]s sent over an
 * unbounded channel: progress within the current document, progress across
 * documents, log lines, and one terminal `Finished`.
 */

use log::Level;
use std::path::PathBuf;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Outcome of a whole job
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobSummary {
    /// Documents discovered
    pub total: usize,
    /// Documents written successfully
    pub succeeded: usize,
    /// Documents that failed, with the reason
    pub failed: Vec<(PathBuf, String)>,
    /// Whether a stop request ended the job early
    pub cancelled: bool,
}

/// One notification from a running job
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    /// Units processed so far in the current document, out of its translatable units
    DocumentProgress { processed: usize, total: usize },
    /// Documents completed so far, out of all discovered documents
    JobProgress { completed: usize, total: usize },
    /// Human-readable log line
    Log(String),
    /// Terminal event; nothing is sent after it
    Finished(JobSummary),
}

/// Sending half handed to the engine and the job driver.
///
/// Every log line is also mirrored to the `log` facade. A sink without a
/// channel, or whose receiver was dropped, only logs.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<UnboundedSender<JobEvent>>,
}

impl EventSink {
    /// Create a connected sink and its receiver
    pub fn channel() -> (Self, UnboundedReceiver<JobEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// Sink that only writes to the `log` facade
    pub fn detached() -> Self {
        Self { tx: None }
    }

    fn send(&self, event: JobEvent) {
        if let Some(tx) = &self.tx {
            // A dropped receiver only means nobody is watching
            let _ = tx.send(event);
        }
    }

    pub fn document_progress(&self, processed: usize, total: usize) {
        self.send(JobEvent::DocumentProgress { processed, total });
    }

    pub fn job_progress(&self, completed: usize, total: usize) {
        self.send(JobEvent::JobProgress { completed, total });
    }

    pub fn log(&self, level: Level, message: impl Into<String>) {
        let message = message.into();
        log::log!(level, "{}", message);
        self.send(JobEvent::Log(message));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(Level::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::Error, message);
    }

    pub fn finished(&self, summary: JobSummary) {
        self.send(JobEvent::Finished(summary));
    }
}
