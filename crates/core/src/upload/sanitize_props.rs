//! Property-based tests for filename sanitization.
//!
//! Whatever the client sends, a generated name must be a unique token
//! followed by a URL-safe, storage-safe remainder.

use proptest::prelude::*;

use super::sanitize::{FilenameSanitizer, TransliterationRules};

/// Strategy for generating filenames mixing ASCII, reserved characters,
/// whitespace and non-Latin scripts.
fn arb_filename() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<String>(),
        "[a-zA-Z0-9 ._+/%#?-]{0,40}",
        "[а-яА-ЯёЁ ]{1,20}\\.[a-z]{1,4}",
        "[À-ÿ ]{1,20}\\.[a-z]{1,4}",
    ]
}

fn arb_rules() -> impl Strategy<Value = TransliterationRules> {
    prop_oneof![
        Just(TransliterationRules::Unicode),
        Just(TransliterationRules::Cyrillic),
    ]
}

fn is_safe(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-')
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Sanitized names only contain `[a-z0-9._-]`.
    #[test]
    fn prop_clear_name_is_url_safe(name in arb_filename(), rules in arb_rules()) {
        let cleared = FilenameSanitizer::with_rules(rules).clear_name(&name);
        prop_assert!(cleared.chars().all(is_safe), "unsafe output {:?}", cleared);
    }

    /// Generated names are `{32 lowercase hex}-{sanitized name}`.
    #[test]
    fn prop_generate_name_shape(name in arb_filename(), rules in arb_rules()) {
        let sanitizer = FilenameSanitizer::with_rules(rules);
        let generated = sanitizer.generate_name(&name);

        let (token, rest) = generated.split_once('-').expect("token separator");
        prop_assert_eq!(token.len(), 32);
        prop_assert!(token.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        prop_assert_eq!(rest, sanitizer.clear_name(&name));
    }

    /// Names that are already clean pass through untouched.
    #[test]
    fn prop_clean_names_are_unchanged(name in "[a-z0-9._-]{1,40}", rules in arb_rules()) {
        prop_assert_eq!(FilenameSanitizer::with_rules(rules).clear_name(&name), name);
    }

    /// Two uploads of the same file never share a key.
    #[test]
    fn prop_generated_names_are_unique(name in arb_filename()) {
        let sanitizer = FilenameSanitizer::default();
        prop_assert_ne!(sanitizer.generate_name(&name), sanitizer.generate_name(&name));
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Reserved runs collapse to one underscore, whitespace runs to one hyphen.
    #[test]
    fn test_runs_collapse() {
        let sanitizer = FilenameSanitizer::default();
        assert_eq!(sanitizer.clear_name("a??##b"), "a_b");
        assert_eq!(sanitizer.clear_name("a \t\n b"), "a-b");
    }

    /// Output made only of dropped characters is empty, the token remains.
    #[test]
    fn test_fully_stripped_name() {
        let sanitizer = FilenameSanitizer::with_rules(TransliterationRules::Cyrillic);
        assert_eq!(sanitizer.clear_name("東京"), "");
        assert!(sanitizer.generate_name("東京").ends_with('-'));
    }
}
