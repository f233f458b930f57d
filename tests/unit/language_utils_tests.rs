/*!
 * Tests for language code utilities
 */

use epub_translator::language_utils::{
    get_language_name, language_codes_match, normalize_to_part1_or_part2t, normalize_to_part2t,
    validate_language_code, LanguageCodeType,
};

/// Test code type detection
#[test]
fn test_validate_language_code_shouldDetectCodeType() {
    assert_eq!(validate_language_code("id").unwrap(), LanguageCodeType::Part1);
    assert_eq!(validate_language_code("ind").unwrap(), LanguageCodeType::Part2T);
    assert_eq!(validate_language_code("ger").unwrap(), LanguageCodeType::Part2B);
    assert!(validate_language_code("zz").is_err());
    assert!(validate_language_code("english").is_err());
}

/// Test normalization to 3-letter codes
#[test]
fn test_normalize_to_part2t_shouldHandleAllForms() {
    assert_eq!(normalize_to_part2t("en").unwrap(), "eng");
    assert_eq!(normalize_to_part2t(" FR ").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("fre").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("deu").unwrap(), "deu");
}

/// Test normalization to the shortest code used in EPUB metadata
#[test]
fn test_normalize_to_part1_or_part2t_shouldPreferTwoLetters() {
    assert_eq!(normalize_to_part1_or_part2t("ind").unwrap(), "id");
    assert_eq!(normalize_to_part1_or_part2t("chi").unwrap(), "zh");
    assert!(normalize_to_part1_or_part2t("???").is_err());
}

/// Test code matching across forms
#[test]
fn test_language_codes_match_shouldCompareLanguages() {
    assert!(language_codes_match("de", "ger"));
    assert!(language_codes_match("id", "ind"));
    assert!(!language_codes_match("en", "fr"));
    assert!(!language_codes_match("en", "invalid"));
}

/// Test English names
#[test]
fn test_get_language_name_shouldReturnEnglishName() {
    assert_eq!(get_language_name("en").unwrap(), "English");
    assert_eq!(get_language_name("id").unwrap(), "Indonesian");
    assert!(get_language_name("qq").is_err());
}
