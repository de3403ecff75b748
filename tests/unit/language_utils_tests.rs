/*!
 * Tests for language name and code helpers
 */

use lingosub::language_utils::{display_name, language_code, normalize_to_part1_or_part2t};

#[test]
fn test_languageCode_withNamesAndCodes_shouldResolve() {
    assert_eq!(language_code("English"), "en");
    assert_eq!(language_code("fr"), "fr");
    assert_eq!(language_code("ger"), "de");
    assert_eq!(language_code("Traditional Chinese"), "zh-Hant");
    assert_eq!(language_code("Klingonese"), "unknown");
}

#[test]
fn test_displayName_shouldExpandCodesAndKeepNames() {
    assert_eq!(display_name("en"), "English");
    assert_eq!(display_name("zh-TW"), "Traditional Chinese");
    assert_eq!(display_name("  Japanese "), "Japanese");
    assert_eq!(display_name("Klingonese"), "Klingonese");
}

#[test]
fn test_normalize_withInvalidCode_shouldFail() {
    assert!(normalize_to_part1_or_part2t("xx").is_err());
    assert_eq!(normalize_to_part1_or_part2t("FRA").unwrap(), "fr");
}
