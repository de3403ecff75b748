/*!
 * Batch translation engine.
 *
 * Drives one document through `Reading -> Translating -> Reconstructing -> Done`.
 * Translatable units are grouped into contiguous batches, each batch is sent
 * through the [`TranslationClient`], and the reply is aligned back onto the
 * units. A failed batch keeps its source text; a short or long reply is
 * padded or truncated. Neither changes the number of units.
 */

use log::{debug, info};
use std::fmt;
use std::path::Path;

use crate::app_config::JobConfig;
use crate::document::Document;
use crate::errors::AppError;
use crate::providers::Provider;
use super::client::{BatchOutcome, TranslationClient};
use super::events::EventSink;

/// Where a document is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    Reading,
    /// Batch `batch` (one-based) of `of`
    Translating { batch: usize, of: usize },
    Reconstructing,
    Done,
    Failed,
}

impl fmt::Display for DocumentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reading => write!(f, "reading"),
            Self::Translating { batch, of } => write!(f, "translating batch {}/{}", batch, of),
            Self::Reconstructing => write!(f, "reconstructing"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// How a reply's line count related to its batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Exact,
    /// Reply was short; `missing` units received empty text
    Padded { missing: usize },
    /// Reply was long; `extra` lines were dropped
    Truncated { extra: usize },
}

/// Fit `lines` to exactly `expected` entries
pub fn align(mut lines: Vec<String>, expected: usize) -> (Vec<String>, Alignment) {
    let alignment = match lines.len() {
        n if n == expected => Alignment::Exact,
        n if n < expected => Alignment::Padded { missing: expected - n },
        n => Alignment::Truncated { extra: n - expected },
    };
    lines.resize(expected, String::new());
    (lines, alignment)
}

/// What happened to one document
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentReport {
    pub state: DocumentState,
    /// All units, translatable or not
    pub unit_count: usize,
    /// Units sent to the backend
    pub translatable_units: usize,
    pub batches: usize,
    /// Batches that kept their source text after a backend failure
    pub failed_batches: usize,
    /// Batches whose reply had to be padded or truncated
    pub misaligned_batches: usize,
}

impl DocumentReport {
    fn new(unit_count: usize, translatable_units: usize, batches: usize) -> Self {
        Self {
            state: DocumentState::Reading,
            unit_count,
            translatable_units,
            batches,
            failed_batches: 0,
            misaligned_batches: 0,
        }
    }
}

/// Translates whole documents batch by batch
#[derive(Debug)]
pub struct BatchTranslationEngine<P: Provider> {
    client: TranslationClient<P>,
    job: JobConfig,
}

impl<P: Provider> BatchTranslationEngine<P> {
    pub fn new(provider: P, job: JobConfig) -> Self {
        Self {
            client: TranslationClient::new(provider, job.model.clone()),
            job,
        }
    }

    pub fn client(&self) -> &TranslationClient<P> {
        &self.client
    }

    pub fn job(&self) -> &JobConfig {
        &self.job
    }

    /// Group the translatable unit indices of `document` into contiguous batches
    pub fn plan_batches(document: &Document, batch_size: usize) -> Vec<Vec<usize>> {
        document
            .translatable_indices()
            .chunks(batch_size.max(1))
            .map(|chunk| chunk.to_vec())
            .collect()
    }

    /// Translate every translatable unit of `document` in place.
    ///
    /// `label` names the document in log lines.
    pub async fn translate_document(&self, document: &mut Document, label: &str, sink: &EventSink) -> DocumentReport {
        let batches = Self::plan_batches(document, self.job.batch_size);
        let total: usize = batches.iter().map(Vec::len).sum();
        let mut report = DocumentReport::new(document.unit_count(), total, batches.len());
        debug!(
            "{}: {} unit(s), {} translatable, {} batch(es) of up to {}",
            label,
            report.unit_count,
            total,
            batches.len(),
            self.job.batch_size
        );

        let mut processed = 0;
        sink.document_progress(processed, total);

        for (i, batch) in batches.iter().enumerate() {
            report.state = DocumentState::Translating { batch: i + 1, of: batches.len() };
            let sources: Vec<String> = batch.iter().map(|&idx| document.units()[idx].text.clone()).collect();

            if sources.iter().all(|text| text.trim().is_empty()) {
                processed += batch.len();
                sink.document_progress(processed, total);
                continue;
            }

            let outcome = self
                .client
                .translate(
                    &sources,
                    &self.job.source_lang,
                    &self.job.target_lang,
                    &self.job.persona_instruction,
                )
                .await;

            let results = match outcome {
                BatchOutcome::Translated(lines) => {
                    let (lines, alignment) = align(lines, batch.len());
                    match alignment {
                        Alignment::Exact => {}
                        Alignment::Padded { missing } => {
                            report.misaligned_batches += 1;
                            sink.warn(format!(
                                "{}: batch {}/{} returned {} line(s) for {}, padding {} with empty text",
                                label,
                                i + 1,
                                batches.len(),
                                batch.len() - missing,
                                batch.len(),
                                missing
                            ));
                        }
                        Alignment::Truncated { extra } => {
                            report.misaligned_batches += 1;
                            sink.warn(format!(
                                "{}: batch {}/{} returned {} line(s) for {}, dropping {} extra",
                                label,
                                i + 1,
                                batches.len(),
                                batch.len() + extra,
                                batch.len(),
                                extra
                            ));
                        }
                    }
                    lines
                }
                BatchOutcome::BackendFailure(reason) => {
                    report.failed_batches += 1;
                    sink.warn(format!(
                        "{}: batch {}/{} failed ({}), keeping source text",
                        label,
                        i + 1,
                        batches.len(),
                        reason
                    ));
                    sources
                }
            };

            for (&idx, text) in batch.iter().zip(results) {
                document.set_text(idx, text);
            }

            processed += batch.len();
            sink.document_progress(processed, total);
        }

        report.state = DocumentState::Reconstructing;
        report
    }

    /// Read `input`, translate it, and write the result to `output`.
    ///
    /// Read and parse errors, and write errors, fail this document only. The
    /// document ends in [`DocumentState::Failed`], which is logged to `sink`.
    pub async fn translate_file(&self, input: &Path, output: &Path, sink: &EventSink) -> Result<DocumentReport, AppError> {
        let label = input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.display().to_string());

        sink.info(format!("Processing {}", label));
        let result = self.process_file(input, output, &label, sink).await;
        if let Err(e) = &result {
            sink.error(format!("{}: {} ({})", label, DocumentState::Failed, e));
        }
        result
    }

    async fn process_file(&self, input: &Path, output: &Path, label: &str, sink: &EventSink) -> Result<DocumentReport, AppError> {
        let mut document = Document::read_from(input, self.job.file_mode)?;

        let mut report = self.translate_document(&mut document, label, sink).await;

        document.write_to(output)?;
        report.state = DocumentState::Done;

        info!("{}: {} batch(es), {} failed", label, report.batches, report.failed_batches);
        sink.info(format!("Finished {} -> {}", label, output.display()));
        Ok(report)
    }
}
