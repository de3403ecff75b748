use anyhow::{anyhow, Result};
use isolang::Language;

/// Language utilities for prompt construction
///
/// Jobs are configured with human language names ("English",
/// "Traditional Chinese") but ISO codes are accepted too. These helpers turn
/// either form into the `name (code)` pair the translation prompt embeds.

/// Chinese script variants are not distinguishable through ISO 639, so they
/// are resolved through this table first.
const SCRIPT_VARIANTS: &[(&str, &str, &str)] = &[
    ("traditional chinese", "Traditional Chinese", "zh-Hant"),
    ("simplified chinese", "Simplified Chinese", "zh-Hans"),
    ("zh-hant", "Traditional Chinese", "zh-Hant"),
    ("zh-hans", "Simplified Chinese", "zh-Hans"),
    ("zh-tw", "Traditional Chinese", "zh-TW"),
    ("zh-hk", "Traditional Chinese", "zh-HK"),
    ("zh-cn", "Simplified Chinese", "zh-CN"),
];

/// Map an ISO 639-2/B code to its ISO 639-2/T form
fn bibliographic_to_terminology(code: &str) -> &str {
    match code {
        "fre" => "fra",
        "ger" => "deu",
        "dut" => "nld",
        "gre" => "ell",
        "chi" => "zho",
        "cze" => "ces",
        "ice" => "isl",
        "alb" => "sqi",
        "arm" => "hye",
        "baq" => "eus",
        "bur" => "mya",
        "per" => "fas",
        "geo" => "kat",
        "may" => "msa",
        "mac" => "mkd",
        "rum" => "ron",
        "slo" => "slk",
        "wel" => "cym",
        other => other,
    }
}

/// Normalize a language code to ISO 639-1 (2-letter) format if possible
/// Falls back to ISO 639-2/T if no ISO 639-1 code exists
pub fn normalize_to_part1_or_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if Language::from_639_1(&normalized_code).is_some() {
            return Ok(normalized_code);
        }
    } else if normalized_code.len() == 3 {
        let part2t = bibliographic_to_terminology(&normalized_code);
        if let Some(lang) = Language::from_639_3(part2t) {
            return Ok(lang.to_639_1().unwrap_or(part2t).to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn lookup(language: &str) -> Option<Language> {
    let trimmed = language.trim();
    if let Ok(code) = normalize_to_part1_or_part2t(trimmed) {
        return Language::from_639_1(&code).or_else(|| Language::from_639_3(&code));
    }
    Language::from_name(trimmed).or_else(|| Language::from_name(&title_case(trimmed)))
}

/// Short code for a language name or code, `"unknown"` when it cannot be resolved
pub fn language_code(language: &str) -> String {
    let key = language.trim().to_lowercase();
    if let Some((_, _, code)) = SCRIPT_VARIANTS.iter().find(|(k, _, _)| *k == key) {
        return code.to_string();
    }

    match lookup(language) {
        Some(lang) => lang.to_639_1().unwrap_or_else(|| lang.to_639_3()).to_string(),
        None => "unknown".to_string(),
    }
}

/// Human-readable name for a language name or code; unknown input is returned as given
pub fn display_name(language: &str) -> String {
    let key = language.trim().to_lowercase();
    if let Some((_, name, _)) = SCRIPT_VARIANTS.iter().find(|(k, _, _)| *k == key) {
        return name.to_string();
    }

    match lookup(language) {
        Some(lang) if normalize_to_part1_or_part2t(language).is_ok() => lang.to_name().to_string(),
        _ => language.trim().to_string(),
    }
}
