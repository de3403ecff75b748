/*!
 * Translation core.
 *
 * - `prompts`: prompt rendering and persona presets
 * - `client`: one backend request per batch, failures as values
 * - `script`: simplified-to-traditional Chinese normalization
 * - `engine`: batching, alignment, and write-back for one document
 * - `events`: notifications from a running job
 */

pub mod client;
pub mod engine;
pub mod events;
pub mod prompts;
pub mod script;

pub use client::{BatchOutcome, TranslationClient};
pub use engine::{align, Alignment, BatchTranslationEngine, DocumentReport, DocumentState};
pub use events::{EventSink, JobEvent, JobSummary};
pub use prompts::{PersonaPreset, TranslationPrompt};
pub use script::ScriptNormalizer;
