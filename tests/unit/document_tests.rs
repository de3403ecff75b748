/*!
 * Tests for document codecs
 */

use anyhow::Result;
use lingosub::document::{Document, FileMode};
use lingosub::errors::{AppError, DocumentError};
use crate::common;

/// A canonical SRT survives parse and serialize byte for byte
#[test]
fn test_srtRoundTrip_withCanonicalInput_shouldBeIdentical() {
    let input = common::sample_srt(4);
    let document = Document::parse(input.as_bytes(), FileMode::Srt).unwrap();
    assert_eq!(document.unit_count(), 4);
    assert_eq!(String::from_utf8(document.serialize()).unwrap(), input);
}

/// Indices are regenerated, timings are kept
#[test]
fn test_srtSerialize_withGappedIndices_shouldRenumber() {
    let input = "3\n00:01:00,000 --> 00:01:02,000\nA\n\n9\n00:02:00,000 --> 00:02:03,250\nB\n";
    let document = Document::parse(input.as_bytes(), FileMode::Srt).unwrap();
    let output = String::from_utf8(document.serialize()).unwrap();
    assert_eq!(
        output,
        "1\n00:01:00,000 --> 00:01:02,000\nA\n\n2\n00:02:00,000 --> 00:02:03,250\nB\n\n"
    );
}

#[test]
fn test_srtParse_withOnlyWhitespace_shouldBeEmptyError() {
    let result = Document::parse(b"\n  \n\n", FileMode::Srt);
    assert!(matches!(result, Err(DocumentError::Empty)));
}

#[test]
fn test_srtParse_withBadTiming_shouldBeMalformed() {
    let result = Document::parse(b"1\n00:00:01 -> 00:00:02\nHi\n", FileMode::Srt);
    assert!(matches!(result, Err(DocumentError::Malformed { line: 2, .. })));
}

#[test]
fn test_parse_withInvalidUtf8_shouldBeEncodingError() {
    let result = Document::parse(&[0xc3, 0x28, 0x0a], FileMode::PlainText);
    assert!(matches!(result, Err(DocumentError::Encoding(_))));
}

/// BOM, CRLF, indentation and a missing final newline all survive
#[test]
fn test_plainTextRoundTrip_shouldBeByteIdentical() {
    let input = "\u{feff}Title\r\n\r\n    indented line  \r\n\t\nlast line";
    let document = Document::parse(input.as_bytes(), FileMode::PlainText).unwrap();
    assert_eq!(document.unit_count(), 3);
    assert_eq!(document.serialize(), input.as_bytes());
}

#[test]
fn test_plainText_withTranslatedUnit_shouldKeepSurroundings() {
    let mut document = Document::parse(b"  Hello  \n\nWorld\n", FileMode::PlainText).unwrap();
    document.set_text(0, "Bonjour");
    assert_eq!(String::from_utf8(document.serialize()).unwrap(), "  Bonjour  \n\nWorld\n");
}

#[test]
fn test_plainTextParse_withEmptyFile_shouldHaveNoUnits() {
    let document = Document::parse(b"", FileMode::PlainText).unwrap();
    assert_eq!(document.unit_count(), 0);
    assert!(document.serialize().is_empty());
}

#[test]
fn test_readFrom_withMissingFile_shouldBeFileError() {
    let result = Document::read_from("/no/such/file.srt", FileMode::Srt);
    assert!(matches!(result, Err(AppError::File(_))));
}

/// Writing creates missing parent directories
#[test]
fn test_writeTo_withMissingParents_shouldCreateThem() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "in.srt")?;
    let document = Document::read_from(&input, FileMode::Srt)?;

    let output = temp_dir.path().join("a").join("b").join("out.srt");
    document.write_to(&output)?;

    let reread = Document::read_from(&output, FileMode::Srt)?;
    assert_eq!(reread.unit_count(), 3);
    assert_eq!(reread.units()[2].text, "For testing purposes.");
    assert_eq!(reread.units()[2].cue().unwrap().timing_line(), "00:00:10,000 --> 00:00:14,000");
    Ok(())
}
