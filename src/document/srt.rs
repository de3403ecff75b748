use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::errors::DocumentError;

use super::{decode_utf8, encode_utf8, Document, DocumentCodec, FileMode, SubtitleCue, TranslationUnit};

// @module: SubRip codec

// @const: SRT timing line regex (comma or dot before millis, optional cue settings)
static TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{1,2}):(\d{1,2})[,.](\d{1,3})\s*-->\s*(\d+):(\d{1,2}):(\d{1,2})[,.](\d{1,3})(?:\s+(.*?))?\s*$").unwrap()
});

/// SubRip codec: one unit per block, indices renumbered on output
#[derive(Debug, Clone, Copy, Default)]
pub struct SrtCodec;

impl SrtCodec {
    /// Parse SRT text (already decoded) into units
    pub fn parse_units(content: &str) -> Result<Vec<TranslationUnit>, DocumentError> {
        let lines: Vec<&str> = content.lines().map(|line| line.trim_end_matches('\r')).collect();
        let mut units = Vec::new();
        let mut i = 0;

        loop {
            while i < lines.len() && lines[i].trim().is_empty() {
                i += 1;
            }
            if i >= lines.len() {
                break;
            }

            let sequence_number = lines[i].trim().parse::<usize>().map_err(|_| DocumentError::Malformed {
                line: i + 1,
                message: format!("expected subtitle index, found {:?}", lines[i]),
            })?;
            i += 1;

            let timing = lines.get(i).ok_or(DocumentError::Malformed {
                line: i + 1,
                message: "unexpected end of input, expected timing line".to_string(),
            })?;
            let caps = TIMING_REGEX.captures(timing.trim()).ok_or_else(|| DocumentError::Malformed {
                line: i + 1,
                message: format!("invalid timing line {:?}", timing),
            })?;
            let start_ms = Self::parse_timestamp_to_ms(&caps, 1, i + 1)?;
            let end_ms = Self::parse_timestamp_to_ms(&caps, 5, i + 1)?;
            let settings = caps.get(9).map(|m| m.as_str().to_string()).unwrap_or_default();
            i += 1;

            // Content runs until a blank line that precedes another block or the end
            let mut content: Vec<&str> = Vec::new();
            while i < lines.len() {
                if lines[i].trim().is_empty() {
                    let next = (i..lines.len()).find(|&j| !lines[j].trim().is_empty());
                    match next {
                        None => break,
                        Some(j) if Self::is_block_start(&lines, j) => break,
                        Some(_) => {}
                    }
                }
                content.push(lines[i]);
                i += 1;
            }

            let index = units.len();
            units.push(TranslationUnit::new(
                index,
                content.join("\n"),
                Some(SubtitleCue {
                    sequence_number,
                    start_ms,
                    end_ms,
                    settings,
                }),
            ));
        }

        if units.is_empty() {
            return Err(DocumentError::Empty);
        }

        Ok(units)
    }

    /// Compose units as SRT text. Indices restart at 1 in document order.
    pub fn compose(units: &[TranslationUnit]) -> String {
        let mut out = String::new();
        for (position, unit) in units.iter().enumerate() {
            out.push_str(&(position + 1).to_string());
            out.push('\n');
            if let Some(cue) = unit.cue() {
                out.push_str(&cue.timing_line());
            }
            out.push('\n');
            // A blank line inside content would end the block on re-read
            let content: Vec<&str> = unit
                .text
                .lines()
                .map(|line| line.trim_end_matches('\r'))
                .filter(|line| !line.trim().is_empty())
                .collect();
            out.push_str(&content.join("\n"));
            out.push_str("\n\n");
        }
        out
    }

    fn is_block_start(lines: &[&str], at: usize) -> bool {
        lines[at].trim().parse::<usize>().is_ok()
            && lines.get(at + 1).is_some_and(|next| TIMING_REGEX.is_match(next.trim()))
    }

    /// Parse timestamp to milliseconds
    fn parse_timestamp_to_ms(caps: &Captures, start_idx: usize, line: usize) -> Result<u64, DocumentError> {
        let field = |offset: usize| -> Result<u64, DocumentError> {
            caps.get(start_idx + offset)
                .and_then(|m| m.as_str().parse::<u64>().ok())
                .ok_or_else(|| DocumentError::Malformed {
                    line,
                    message: "timestamp field out of range".to_string(),
                })
        };
        let (hours, minutes, seconds, millis) = (field(0)?, field(1)?, field(2)?, field(3)?);

        if minutes >= 60 || seconds >= 60 {
            return Err(DocumentError::Malformed {
                line,
                message: format!("invalid time components {:02}:{:02}", minutes, seconds),
            });
        }

        hours
            .checked_mul(3600)
            .and_then(|secs| secs.checked_add(minutes * 60 + seconds))
            .and_then(|secs| secs.checked_mul(1000))
            .and_then(|ms| ms.checked_add(millis))
            .ok_or_else(|| DocumentError::Malformed {
                line,
                message: "timestamp out of range".to_string(),
            })
    }
}

impl DocumentCodec for SrtCodec {
    fn parse(&self, raw: &[u8]) -> Result<Document, DocumentError> {
        let (content, bom) = decode_utf8(raw)?;
        let units = Self::parse_units(&content)?;
        Ok(Document::new(FileMode::Srt, units, Vec::new(), bom))
    }

    fn serialize(&self, document: &Document) -> Vec<u8> {
        encode_utf8(Self::compose(document.units()), document.has_bom())
    }
}
