/*!
 * # lingosub - batch LLM translation for subtitles and plain text
 *
 * A Rust library that translates SRT subtitle files and plain-text files
 * through a local Ollama model while keeping their structure intact.
 *
 * ## Features
 *
 * - SRT and plain-text codecs with exact reconstruction (timings, blank lines, BOM)
 * - Contiguous batching of translatable units with a per-batch backend request
 * - Backend failures recovered per batch by keeping the source text
 * - Short or long replies padded or truncated so unit counts never change
 * - Simplified-to-traditional Chinese normalization for traditional targets
 * - Persona presets and free-text persona instructions
 * - Multi-document jobs with typed progress events and cooperative cancellation
 *
 * ## Architecture
 *
 * - `app_config`: Configuration management and job settings
 * - `document`: `Document`, `TranslationUnit`, SRT and plain-text codecs
 * - `translation`: Translation core:
 *   - `translation::prompts`: Prompt rendering and persona presets
 *   - `translation::client`: One backend request per batch
 *   - `translation::engine`: Batching, alignment, and write-back
 *   - `translation::events`: Job notifications
 *   - `translation::script`: Chinese script normalization
 * - `providers`: Backend clients:
 *   - `providers::ollama`: Ollama API client
 *   - `providers::mock`: Scripted provider for tests
 * - `app_controller`: Multi-document job driver
 * - `file_utils`: Discovery and output paths
 * - `language_utils`: Language names and codes
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod document;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::{Config, JobConfig};
pub use app_controller::{Controller, JobHandle, OutputPlacement};
pub use document::{Document, FileMode, TranslationUnit};
pub use errors::{AppError, DocumentError, ProviderError};
pub use translation::{BatchOutcome, BatchTranslationEngine, JobEvent, JobSummary, TranslationClient};
