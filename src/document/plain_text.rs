use crate::errors::DocumentError;

use super::{decode_utf8, encode_utf8, Document, DocumentCodec, FileMode, LineSlot, TranslationUnit};

/// Line codec: every line is kept in place, non-blank lines become units.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextCodec;

impl PlainTextCodec {
    fn split_ending(piece: &str) -> (&str, &str) {
        if let Some(body) = piece.strip_suffix("\r\n") {
            (body, "\r\n")
        } else if let Some(body) = piece.strip_suffix('\n') {
            (body, "\n")
        } else {
            (piece, "")
        }
    }

    /// A unit owns exactly one line; a reply spanning several is joined with spaces
    fn single_line(text: &str) -> String {
        if !text.contains('\n') {
            return text.to_string();
        }
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl DocumentCodec for PlainTextCodec {
    fn parse(&self, raw: &[u8]) -> Result<Document, DocumentError> {
        let (content, bom) = decode_utf8(raw)?;
        let mut units = Vec::new();
        let mut lines = Vec::new();

        for piece in content.split_inclusive('\n') {
            let (body, ending) = Self::split_ending(piece);
            let text = body.trim();
            if text.is_empty() {
                lines.push(LineSlot::Verbatim(piece.to_string()));
                continue;
            }

            let start = body.len() - body.trim_start().len();
            let end = start + text.len();
            let unit = units.len();
            units.push(TranslationUnit::new(unit, text, None));
            lines.push(LineSlot::Unit {
                unit,
                leading: body[..start].to_string(),
                trailing: body[end..].to_string(),
                ending: ending.to_string(),
            });
        }

        Ok(Document::new(FileMode::PlainText, units, lines, bom))
    }

    fn serialize(&self, document: &Document) -> Vec<u8> {
        let mut out = String::new();
        for slot in document.lines() {
            match slot {
                LineSlot::Verbatim(raw) => out.push_str(raw),
                LineSlot::Unit { unit, leading, trailing, ending } => {
                    out.push_str(leading);
                    if let Some(unit) = document.units().get(*unit) {
                        out.push_str(&Self::single_line(&unit.text));
                    }
                    out.push_str(trailing);
                    out.push_str(ending);
                }
            }
        }
        encode_utf8(out, document.has_bom())
    }
}
