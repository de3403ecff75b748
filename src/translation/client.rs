/*!
 * Single-request translation client.
 *
 * Wraps a [`Provider`] and turns one ordered list of source strings into one
 * backend request, then splits the reply back into an ordered list. Backend
 * errors never escape: they come back as [`BatchOutcome::BackendFailure`].
 */

use log::{debug, warn};

use crate::providers::Provider;
use super::prompts::TranslationPrompt;
use super::script::ScriptNormalizer;

/// Result of translating one batch
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// Translated lines, in request order; the count may differ from the request
    Translated(Vec<String>),
    /// The backend call failed; carries the reason
    BackendFailure(String),
}

impl BatchOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::BackendFailure(_))
    }
}

/// Translation client bound to one provider and model
#[derive(Debug)]
pub struct TranslationClient<P: Provider> {
    provider: P,
    model: String,
}

impl<P: Provider> TranslationClient<P> {
    pub fn new(provider: P, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Translate `texts` from `source_lang` to `target_lang` in one request.
    ///
    /// An empty input returns an empty translation without contacting the backend.
    pub async fn translate(
        &self,
        texts: &[String],
        source_lang: &str,
        target_lang: &str,
        persona_instruction: &str,
    ) -> BatchOutcome {
        if texts.is_empty() {
            return BatchOutcome::Translated(Vec::new());
        }

        let prompt = TranslationPrompt::new(source_lang, target_lang, persona_instruction).render(texts);
        let request = self.provider.build_request(&self.model, &prompt);
        debug!("Sending {} line(s) to model '{}'", texts.len(), self.model);

        let response = match self.provider.complete(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Translation request failed: {}", e);
                return BatchOutcome::BackendFailure(e.to_string());
            }
        };

        let raw = P::extract_text(&response);
        let mut lines = split_response(&raw, texts.len());

        if let Some(normalizer) = ScriptNormalizer::for_target(target_lang) {
            for line in lines.iter_mut() {
                *line = normalizer.normalize(line);
            }
        }

        BatchOutcome::Translated(lines)
    }
}

/// Split a raw reply into lines for a request of `expected` elements.
///
/// A single-element request keeps the whole reply as one string. For larger
/// requests the reply is split on line breaks; when the count is off, blank
/// lines are dropped before the caller aligns the result.
pub fn split_response(raw: &str, expected: usize) -> Vec<String> {
    let trimmed = raw.trim();
    if expected <= 1 {
        return vec![trimmed.to_string()];
    }

    let lines: Vec<String> = trimmed.split('\n').map(|line| line.trim().to_string()).collect();
    if lines.len() == expected {
        return lines;
    }

    lines.into_iter().filter(|line| !line.is_empty()).collect()
}
