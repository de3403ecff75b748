/*!
 * Tests for the translation client and prompt rendering
 */

use lingosub::providers::mock::MockProvider;
use lingosub::translation::prompts::{extract_payload, BATCH_DIRECTIVE};
use lingosub::translation::{BatchOutcome, PersonaPreset, TranslationClient};

fn texts(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| s.to_string()).collect()
}

/// Multi-element batches carry the line-preserving directive and a joined payload
#[tokio::test]
async fn test_translate_withBatch_shouldSendDirectiveAndJoinedPayload() {
    let client = TranslationClient::new(MockProvider::working(), "mock-model");
    let outcome = client
        .translate(&texts(&["Hello", "World"]), "English", "French", PersonaPreset::General.instruction())
        .await;

    assert_eq!(
        outcome,
        BatchOutcome::Translated(vec!["[TRANSLATED] Hello".to_string(), "[TRANSLATED] World".to_string()])
    );
    let prompts = client.provider().prompts();
    assert!(prompts[0].contains(BATCH_DIRECTIVE));
    assert!(prompts[0].contains(PersonaPreset::General.instruction()));
    assert_eq!(extract_payload(&prompts[0]), "Hello\nWorld");
}

/// A single element is sent as one block and comes back as one string
#[tokio::test]
async fn test_translate_withSingleMultilineText_shouldReturnOneString() {
    let client = TranslationClient::new(MockProvider::working(), "mock-model");
    let outcome = client.translate(&texts(&["first\nsecond"]), "English", "French", "").await;

    assert_eq!(
        outcome,
        BatchOutcome::Translated(vec!["[TRANSLATED] first\n[TRANSLATED] second".to_string()])
    );
    assert!(!client.provider().prompts()[0].contains(BATCH_DIRECTIVE));
}

/// Blank lines are dropped when the reply's line count is off
#[tokio::test]
async fn test_translate_withPaddedBlankLines_shouldDropThem() {
    let provider = MockProvider::scripted(vec![Some("\nun\n\ndeux\n\ntrois\n".to_string())]);
    let client = TranslationClient::new(provider, "mock-model");
    let outcome = client.translate(&texts(&["one", "two", "three"]), "English", "French", "").await;
    assert_eq!(outcome, BatchOutcome::Translated(texts(&["un", "deux", "trois"])));
}

/// A merged reply is returned short; alignment is the engine's job
#[tokio::test]
async fn test_translate_withMergingBackend_shouldReturnFewerLines() {
    let client = TranslationClient::new(MockProvider::merging(2), "mock-model");
    match client.translate(&texts(&["a", "b", "c", "d"]), "English", "French", "").await {
        BatchOutcome::Translated(lines) => assert_eq!(lines.len(), 2),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_translate_withFailingBackend_shouldCarryReason() {
    let client = TranslationClient::new(MockProvider::failing(), "mock-model");
    match client.translate(&texts(&["a", "b"]), "English", "French", "").await {
        BatchOutcome::BackendFailure(reason) => assert!(reason.contains("Simulated provider failure")),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_translate_withSimplifiedTarget_shouldNotConvert() {
    let provider = MockProvider::working().with_line_translator(|_| "国".to_string());
    let client = TranslationClient::new(provider, "mock-model");
    let outcome = client.translate(&texts(&["country"]), "English", "Simplified Chinese", "").await;
    assert_eq!(outcome, BatchOutcome::Translated(texts(&["国"])));
}
