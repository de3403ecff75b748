use log::{debug, error};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use crate::app_config::Config;
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::providers::Provider;
use crate::translation::{BatchTranslationEngine, EventSink, JobEvent, JobSummary};

// @module: Multi-document job driver

/// Where translated documents are written
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputPlacement {
    /// Next to each input, with the output marker before the extension
    #[default]
    BesideInput,
    /// Under this directory, keeping each file's path relative to the input root
    Directory(PathBuf),
    /// Exactly this file; only valid when the input is a single file
    File(PathBuf),
}

/// Runs translation jobs over a file or a directory tree
#[derive(Debug)]
pub struct Controller<P: Provider> {
    // @field: App configuration
    config: Config,
    engine: BatchTranslationEngine<P>,
}

impl<P: Provider + 'static> Controller<P> {
    // @method: Create a controller; the configuration is validated first
    pub fn with_config(config: Config, provider: P) -> Result<Self, AppError> {
        config.validate().map_err(|e| AppError::Config(format!("{:#}", e)))?;
        let engine = BatchTranslationEngine::new(provider, config.job_config());
        Ok(Self { config, engine })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn engine(&self) -> &BatchTranslationEngine<P> {
        &self.engine
    }

    /// Documents a job on `input` would process, in processing order.
    ///
    /// A file is taken as-is. A directory is walked for files with the active
    /// mode's extension whose names do not already carry the output marker.
    pub fn discover(&self, input: &Path) -> Result<Vec<PathBuf>, AppError> {
        if FileManager::file_exists(input) {
            return Ok(vec![input.to_path_buf()]);
        }
        if !input.is_dir() {
            return Err(AppError::File(format!("Input path does not exist: {}", input.display())));
        }

        FileManager::find_documents(input, self.config.file_mode.extension(), &self.config.output_suffix)
            .map_err(|e| AppError::File(format!("{:#}", e)))
    }

    /// Destination for `document`, discovered under `input`
    pub fn output_path_for(&self, document: &Path, input: &Path, placement: &OutputPlacement) -> PathBuf {
        match placement {
            OutputPlacement::BesideInput => FileManager::derive_output_path(document, &self.config.output_suffix),
            OutputPlacement::Directory(dir) => {
                let root = if FileManager::file_exists(input) {
                    input.parent().unwrap_or_else(|| Path::new(""))
                } else {
                    input
                };
                FileManager::mirrored_output_path(document, root, dir)
            }
            OutputPlacement::File(path) => path.clone(),
        }
    }

    /// Translate every document under `input`, one at a time.
    ///
    /// `cancel` is checked before each document starts. A document that fails
    /// is logged and recorded in the summary; the job moves on. The terminal
    /// `Finished` event is always sent, also when discovery fails.
    pub async fn run_job(
        &self,
        input: &Path,
        placement: &OutputPlacement,
        sink: &EventSink,
        cancel: &AtomicBool,
    ) -> Result<JobSummary, AppError> {
        let documents = match self.discover(input) {
            Ok(documents) => documents,
            Err(e) => {
                sink.error(format!("Cannot start job: {}", e));
                sink.finished(JobSummary::default());
                return Err(e);
            }
        };

        if matches!(placement, OutputPlacement::File(_)) && !FileManager::file_exists(input) {
            let e = AppError::Config("An output file can only be given for a single input file".to_string());
            sink.error(format!("Cannot start job: {}", e));
            sink.finished(JobSummary::default());
            return Err(e);
        }

        let mut summary = JobSummary {
            total: documents.len(),
            ..JobSummary::default()
        };
        sink.info(format!(
            "Found {} {} document(s) under {}",
            documents.len(),
            self.config.file_mode,
            input.display()
        ));
        sink.job_progress(0, summary.total);

        for (completed, document) in documents.iter().enumerate() {
            if cancel.load(Ordering::SeqCst) {
                summary.cancelled = true;
                sink.warn(format!("Job cancelled, {} document(s) not started", summary.total - completed));
                break;
            }

            let output = self.output_path_for(document, input, placement);
            debug!("{} -> {}", document.display(), output.display());

            match self.engine.translate_file(document, &output, sink).await {
                Ok(_) => summary.succeeded += 1,
                Err(e) => {
                    debug!("Skipping {} after failure", document.display());
                    summary.failed.push((document.clone(), e.to_string()));
                }
            }

            sink.job_progress(completed + 1, summary.total);
        }

        sink.info(format!(
            "Job finished: {} succeeded, {} failed, {} total",
            summary.succeeded,
            summary.failed.len(),
            summary.total
        ));
        sink.finished(summary.clone());
        Ok(summary)
    }

    /// Run a job on a background task and return a handle to observe it
    pub fn spawn(self, input: PathBuf, placement: OutputPlacement) -> JobHandle {
        let (sink, events) = EventSink::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);

        let task = tokio::spawn(async move {
            let result = self.run_job(&input, &placement, &sink, &flag).await;
            if let Err(e) = &result {
                error!("Job aborted: {}", e);
            }
            result
        });

        JobHandle { events, cancel, task }
    }
}

/// Caller's side of a spawned job
#[derive(Debug)]
pub struct JobHandle {
    events: UnboundedReceiver<JobEvent>,
    cancel: Arc<AtomicBool>,
    task: JoinHandle<Result<JobSummary, AppError>>,
}

impl JobHandle {
    /// Ask the job to stop before its next document
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Shared stop flag, e.g. for a signal handler
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Next event, `None` once the job has ended and all events were read
    pub async fn next_event(&mut self) -> Option<JobEvent> {
        self.events.recv().await
    }

    /// Wait for the job to end
    pub async fn join(self) -> Result<JobSummary, AppError> {
        self.task
            .await
            .map_err(|e| AppError::Unknown(format!("Job task failed: {}", e)))?
    }
}
