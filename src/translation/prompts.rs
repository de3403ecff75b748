/*!
 * Prompt construction for the translation backend.
 *
 * One prompt is built per request. It names both languages with their codes,
 * carries the persona instruction, and for multi-line batches adds a
 * directive asking the model to keep one output line per input line.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::language_utils;

/// Directive appended when more than one line is sent
pub const BATCH_DIRECTIVE: &str = "The following input contains multiple lines of text. \
Translate each line and keep the original line breaks in your output, exactly one output line per input line. \
Do not merge lines.";

/// Persona used for plain-text jobs when nothing else is configured
pub const PLAIN_TEXT_PERSONA: &str = "You are a professional translator.";

const PAYLOAD_LEAD: &str = "Please translate the following";
const PAYLOAD_MARKER: &str = ":\n\n";

/// Built-in persona instructions
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PersonaPreset {
    General,
    Literature,
    Technical,
    #[default]
    Subtitle,
}

impl PersonaPreset {
    pub const ALL: [PersonaPreset; 4] = [Self::General, Self::Literature, Self::Technical, Self::Subtitle];

    pub fn instruction(&self) -> &'static str {
        match self {
            Self::General => "You are a professional translator. Translate with accuracy and natural flow, ensuring the target text is easy to read and grammatically correct.",
            Self::Literature => "You are a professional literature translator. Focus on preserving the author's style, emotional depth, and rhetorical elegance.",
            Self::Technical => "You are a professional technical translator. Ensure terminology accuracy, clarity, and conciseness.",
            Self::Subtitle => "You are a professional subtitle translator. Keep translations concise, natural, and suitable for reading speed, using spoken language style.",
        }
    }
}

impl fmt::Display for PersonaPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::General => "general",
            Self::Literature => "literature",
            Self::Technical => "technical",
            Self::Subtitle => "subtitle",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for PersonaPreset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.to_string() == s.trim().to_lowercase())
            .ok_or_else(|| anyhow::anyhow!("Invalid persona preset: {}", s))
    }
}

/// Prompt template bound to one language pair and persona
#[derive(Debug, Clone)]
pub struct TranslationPrompt {
    source_name: String,
    source_code: String,
    target_name: String,
    target_code: String,
    persona: String,
}

impl TranslationPrompt {
    pub fn new(source_lang: &str, target_lang: &str, persona: &str) -> Self {
        Self {
            source_name: language_utils::display_name(source_lang),
            source_code: language_utils::language_code(source_lang),
            target_name: language_utils::display_name(target_lang),
            target_code: language_utils::language_code(target_lang),
            persona: persona.trim().to_string(),
        }
    }

    /// Render the full prompt for `texts`.
    ///
    /// A single text is sent as one block; several are joined with `\n`.
    pub fn render(&self, texts: &[String]) -> String {
        let (content, directive) = match texts {
            [single] => (single.clone(), ""),
            _ => (texts.join("\n"), BATCH_DIRECTIVE),
        };

        let mut persona = format!(
            "You are a professional {} ({}) to {} ({}) translator.",
            self.source_name, self.source_code, self.target_name, self.target_code
        );
        if !self.persona.is_empty() {
            persona.push(' ');
            persona.push_str(&self.persona);
        }

        let mut prompt = format!(
            "{} Your goal is to accurately convey the meaning and nuances of the original {} text \
             while adhering to {} grammar, vocabulary, and cultural sensitivities.",
            persona, self.source_name, self.target_name
        );
        if !directive.is_empty() {
            prompt.push(' ');
            prompt.push_str(directive);
        }
        prompt.push_str(&format!(
            " Produce only the {} translation, without any additional explanations or commentary. \
             {} {} text into {}{}{}",
            self.target_name, PAYLOAD_LEAD, self.source_name, self.target_name, PAYLOAD_MARKER, content
        ));
        prompt
    }
}

/// The text a rendered prompt asks to translate
pub fn extract_payload(prompt: &str) -> &str {
    let search_from = prompt.find(PAYLOAD_LEAD).unwrap_or(0);
    match prompt[search_from..].find(PAYLOAD_MARKER) {
        Some(offset) => &prompt[search_from + offset + PAYLOAD_MARKER.len()..],
        None => "",
    }
}
