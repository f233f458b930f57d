/*!
 * Tests for glossary protection and restoration
 */

use anyhow::Result;
use epub_translator::glossary::{load_terms, TermGuard, DEFAULT_PRESERVE_TERMS};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::common;

fn guard(terms: &[&str]) -> TermGuard {
    TermGuard::new(terms.iter().copied()).unwrap()
}

/// Test that protect followed by restore gives back the input
#[test]
fn test_protectRestore_withSeveralTerms_shouldRoundTrip() {
    let guard = TermGuard::with_defaults(["Excalibur"]).unwrap();
    let inputs = [
        "The dragon and the phoenix met a Wolf.",
        "Excalibur, the katana, and a ninja's kunai.",
        "No protected words here.",
        "",
        "DRAGON dragon Dragon",
    ];

    for input in inputs {
        let protected = guard.protect(input);
        assert_eq!(guard.restore(&protected.text, &protected.placeholders), input);
    }
}

/// Fragments for generated texts: terms, near misses, word boundaries and sentinel lookalikes
const FRAGMENTS: &[&str] = &[
    "dragon", "Dragon", "DRAGON", "drag", "dragons", "fox", "foxes", "ninja", "ninjutsu", "Excalibur",
    " ", "-", "_", "'", ".", "1", "é", "\u{a0}", "\n", "\u{27E6}", "\u{27E7}", "\u{27EA}", "\u{27EB}",
    "\u{27EC}", "\u{27ED}", "\u{3016}", "\u{3017}", "\u{E000}", "TERM_0", "TERM_", "\u{27E6}TERM_1\u{27E7}",
];

fn random_text(rng: &mut StdRng) -> String {
    let length = rng.random_range(0..40);
    (0..length)
        .map(|_| FRAGMENTS[rng.random_range(0..FRAGMENTS.len())])
        .collect()
}

/// Test that protect followed by restore gives back generated inputs
#[test]
fn test_protectRestore_withGeneratedTexts_shouldRoundTrip() {
    let guard = guard(&["dragon", "fox", "ninja", "Excalibur", "drag on"]);
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..2000 {
        let input = random_text(&mut rng);
        let protected = guard.protect(&input);

        for token in protected.placeholders.keys() {
            assert_eq!(protected.text.matches(token.as_str()).count(), 1, "token {:?} in {:?}", token, input);
        }
        assert_eq!(guard.restore(&protected.text, &protected.placeholders), input, "input {:?}", input);
    }
}

/// Test that a protected text contains no original term
#[test]
fn test_protect_withTerms_shouldHideEveryOccurrence() {
    let guard = guard(&["dragon", "fox"]);
    let protected = guard.protect("A dragon chased a fox; the fox fled the dragon.");

    assert!(!protected.text.to_lowercase().contains("dragon"));
    assert!(!protected.text.to_lowercase().contains("fox"));
    assert_eq!(protected.placeholders.len(), 4);
}

/// Test that an empty guard is a no-op
#[test]
fn test_protect_withEmptyGuard_shouldNotChangeText() {
    let guard = TermGuard::new(Vec::<String>::new()).unwrap();
    let protected = guard.protect("The dragon slept.");

    assert!(guard.is_empty());
    assert_eq!(protected.text, "The dragon slept.");
    assert!(!protected.has_placeholders());
}

/// Test that the longest overlapping term wins
#[test]
fn test_protect_withOverlappingTerms_shouldPreferLongest() {
    let guard = guard(&["dragon", "dragon king"]);
    let protected = guard.protect("The Dragon King spoke.");

    assert_eq!(protected.placeholders.len(), 1);
    let original: Vec<&String> = protected.placeholders.values().collect();
    assert_eq!(original, vec!["Dragon King"]);
}

/// Test that terms inside longer words are not protected
#[test]
fn test_protect_insideLongerWord_shouldLeaveWordAlone() {
    let guard = guard(&["cat", "ki"]);
    let protected = guard.protect("The catalog was kind to the cat.");

    assert_eq!(protected.placeholders.len(), 1);
    assert!(protected.text.starts_with("The catalog was kind to the "));
}

/// Test that matching is case-insensitive but restoration keeps the source casing
#[test]
fn test_restore_withMixedCase_shouldKeepOriginalCasing() {
    let guard = guard(&["phoenix"]);
    let protected = guard.protect("PHOENIX and Phoenix");
    let translated = protected.text.replace(" and ", " dan ");

    assert_eq!(guard.restore(&translated, &protected.placeholders), "PHOENIX dan Phoenix");
}

/// Test that a backend moving tokens around still gets the right terms back
#[test]
fn test_restore_withReorderedTokens_shouldFollowTokens() {
    let guard = guard(&["wolf", "fox"]);
    let protected = guard.protect("wolf fox");
    let reordered: Vec<&str> = protected.text.split(' ').rev().collect();

    assert_eq!(guard.restore(&reordered.join(" "), &protected.placeholders), "fox wolf");
}

/// Test that the built-in preserve list is used by with_defaults
#[test]
fn test_withDefaults_shouldContainBuiltInTerms() {
    let guard = TermGuard::with_defaults(Vec::<String>::new()).unwrap();
    assert_eq!(guard.terms().len(), DEFAULT_PRESERVE_TERMS.len());
    assert!(guard.terms().iter().any(|term| term == "samurai"));
}

/// Test loading terms from text and JSON glossary files
#[test]
fn test_loadTerms_withTextAndJsonFiles_shouldReadBoth() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let text_file = common::create_test_file(temp_dir.path(), "names.txt", "# heroes\nAragorn\n\n  Gandalf  \n")?;
    let json_file = common::create_test_file(temp_dir.path(), "places.json", r#"["Mordor", "Rivendell"]"#)?;

    let terms = load_terms(&[text_file, json_file])?;

    assert_eq!(terms, vec!["Aragorn", "Gandalf", "Mordor", "Rivendell"]);
    Ok(())
}

/// Test that a JSON glossary that is not an array of strings is rejected
#[test]
fn test_loadTerms_withInvalidJson_shouldNameTheFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let json_file = common::create_test_file(temp_dir.path(), "bad.json", r#"{"term": "x"}"#)?;

    let error = load_terms(&[json_file]).unwrap_err();
    assert!(error.to_string().contains("bad.json"));
    Ok(())
}

/// Test the longest, whole-word, casing-preserving match on a mixed glossary
#[test]
fn test_protect_withNinjaTerms_shouldMatchWholeLongestWord() {
    let guard = guard(&["ninja", "ninjutsu", "cat", "Dragon"]);

    let ninjutsu = guard.protect("a ninjutsu master");
    assert_eq!(ninjutsu.placeholders.len(), 1);
    assert!(ninjutsu.placeholders.values().all(|original| original == "ninjutsu"));

    assert!(!guard.protect("concatenate").has_placeholders());

    let dragon = guard.protect("a dragon flew");
    assert_eq!(guard.restore(&dragon.text, &dragon.placeholders), "a dragon flew");
    assert!(dragon.placeholders.values().all(|original| original == "dragon"));
}
