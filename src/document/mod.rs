/*!
 * Document model and codecs.
 *
 * A [`Document`] is an ordered sequence of [`TranslationUnit`]s plus whatever
 * non-unit structure is needed to write the file back exactly. The number and
 * order of units is fixed when the document is parsed; afterwards only a
 * unit's `text` may change.
 *
 * - `srt`: SubRip codec (one unit per block)
 * - `plain_text`: line codec (one unit per non-blank line)
 */

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, DocumentError};
use crate::file_utils::FileManager;

pub mod plain_text;
pub mod srt;

pub use self::plain_text::PlainTextCodec;
pub use self::srt::SrtCodec;

const BOM: char = '\u{feff}';

/// Which kind of document a job works on
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FileMode {
    /// SubRip subtitles (`.srt`)
    #[default]
    Srt,
    /// Line-oriented UTF-8 text (`.txt`)
    PlainText,
}

impl FileMode {
    /// File extension handled by this mode, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::PlainText => "txt",
        }
    }

    /// Codec that reads and writes this mode
    pub fn codec(&self) -> &'static dyn DocumentCodec {
        match self {
            Self::Srt => &SrtCodec,
            Self::PlainText => &PlainTextCodec,
        }
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Srt => write!(f, "srt"),
            Self::PlainText => write!(f, "plain-text"),
        }
    }
}

impl std::str::FromStr for FileMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "srt" => Ok(Self::Srt),
            "plain-text" | "plaintext" | "txt" | "text" => Ok(Self::PlainText),
            _ => Err(anyhow::anyhow!("Invalid file mode: {}", s)),
        }
    }
}

/// Parse and serialize one document format
pub trait DocumentCodec: Send + Sync {
    /// Decode and parse raw file content
    fn parse(&self, raw: &[u8]) -> Result<Document, DocumentError>;

    /// Render a document back into file content
    fn serialize(&self, document: &Document) -> Vec<u8>;
}

/// Timing metadata carried by an SRT unit. Never modified after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleCue {
    /// Index as written in the source file
    pub sequence_number: usize,

    /// Start time in ms
    pub start_ms: u64,

    /// End time in ms
    pub end_ms: u64,

    /// Anything written after the end timestamp on the timing line
    pub settings: String,
}

impl SubtitleCue {
    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Timing line for this cue, without a line terminator
    pub fn timing_line(&self) -> String {
        let mut line = format!(
            "{} --> {}",
            Self::format_timestamp(self.start_ms),
            Self::format_timestamp(self.end_ms)
        );
        if !self.settings.is_empty() {
            line.push(' ');
            line.push_str(&self.settings);
        }
        line
    }
}

/// One addressable piece of translatable content
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationUnit {
    index: usize,

    /// Current text; the source text until a translation is written back
    pub text: String,

    cue: Option<SubtitleCue>,
}

impl TranslationUnit {
    pub fn new(index: usize, text: impl Into<String>, cue: Option<SubtitleCue>) -> Self {
        Self {
            index,
            text: text.into(),
            cue,
        }
    }

    /// Zero-based position in the original document
    pub fn index(&self) -> usize {
        self.index
    }

    /// SRT timing, `None` for plain text units
    pub fn cue(&self) -> Option<&SubtitleCue> {
        self.cue.as_ref()
    }

    /// Whether the unit has any non-whitespace content
    pub fn is_translatable(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Position of a plain-text line in the original file
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LineSlot {
    /// Line backed by a unit; surrounding whitespace and terminator are kept
    Unit {
        unit: usize,
        leading: String,
        trailing: String,
        ending: String,
    },
    /// Whitespace-only line, re-emitted untouched (terminator included)
    Verbatim(String),
}

/// Parsed document: units plus the structure needed to rebuild the file
#[derive(Debug, Clone)]
pub struct Document {
    mode: FileMode,
    units: Vec<TranslationUnit>,
    lines: Vec<LineSlot>,
    bom: bool,
}

impl Document {
    pub(crate) fn new(mode: FileMode, units: Vec<TranslationUnit>, lines: Vec<LineSlot>, bom: bool) -> Self {
        Self { mode, units, lines, bom }
    }

    /// Parse raw bytes with the codec for `mode`
    pub fn parse(raw: &[u8], mode: FileMode) -> Result<Self, DocumentError> {
        mode.codec().parse(raw)
    }

    /// Read and parse a file from disk
    pub fn read_from<P: AsRef<Path>>(path: P, mode: FileMode) -> Result<Self, AppError> {
        let raw = FileManager::read_bytes(path).map_err(|e| AppError::File(format!("{:#}", e)))?;
        Ok(Self::parse(&raw, mode)?)
    }

    pub fn mode(&self) -> FileMode {
        self.mode
    }

    pub fn units(&self) -> &[TranslationUnit] {
        &self.units
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Indices of units with non-whitespace content, in document order
    pub fn translatable_indices(&self) -> Vec<usize> {
        self.units
            .iter()
            .filter(|unit| unit.is_translatable())
            .map(|unit| unit.index)
            .collect()
    }

    /// Replace the text of one unit. Out-of-range indices are ignored.
    pub fn set_text(&mut self, index: usize, text: impl Into<String>) {
        if let Some(unit) = self.units.get_mut(index) {
            unit.text = text.into();
        }
    }

    pub(crate) fn lines(&self) -> &[LineSlot] {
        &self.lines
    }

    pub(crate) fn has_bom(&self) -> bool {
        self.bom
    }

    /// Render the document with the codec it was parsed with
    pub fn serialize(&self) -> Vec<u8> {
        self.mode.codec().serialize(self)
    }

    /// Serialize to `path`, creating missing parent directories
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), AppError> {
        FileManager::write_bytes(path, &self.serialize()).map_err(|e| AppError::File(format!("{:#}", e)))
    }
}

/// Decode UTF-8, dropping a leading signature. Returns the text and whether a BOM was present.
pub(crate) fn decode_utf8(raw: &[u8]) -> Result<(String, bool), DocumentError> {
    let text = String::from_utf8(raw.to_vec()).map_err(|e| DocumentError::Encoding(e.to_string()))?;
    match text.strip_prefix(BOM) {
        Some(rest) => Ok((rest.to_string(), true)),
        None => Ok((text, false)),
    }
}

pub(crate) fn encode_utf8(text: String, bom: bool) -> Vec<u8> {
    if bom {
        let mut out = String::with_capacity(text.len() + BOM.len_utf8());
        out.push(BOM);
        out.push_str(&text);
        out.into_bytes()
    } else {
        text.into_bytes()
    }
}
