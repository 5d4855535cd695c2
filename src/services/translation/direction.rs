//! Translation direction detection

use crate::models::{LanguageMode, Lang};

/// CJK Unified Ideographs block
pub fn is_cjk(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
}

pub fn is_latin_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || (('\u{00C0}'..='\u{024F}').contains(&c) && c.is_alphabetic())
}

pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(is_cjk)
}

pub fn contains_latin(text: &str) -> bool {
    text.chars().any(is_latin_letter)
}

/// Text with nothing to translate: digits, punctuation, symbols and emoji only
pub fn is_symbol_only(text: &str) -> bool {
    !text.chars().any(|c| is_cjk(c) || is_latin_letter(c))
}

/// Target language for `text` under `mode`, `None` when the message must be left alone
pub fn decide_target(text: &str, mode: LanguageMode) -> Option<Lang> {
    if is_symbol_only(text) {
        return None;
    }
    if let Some(target) = mode.forced_target() {
        return Some(target);
    }
    if contains_cjk(text) {
        Some(Lang::En)
    } else {
        Some(Lang::Zh)
    }
}

/// Source language passed to providers
pub fn source_hint(target: Lang) -> Option<Lang> {
    match target {
        Lang::En => Some(Lang::Zh),
        Lang::Zh => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_auto_direction() {
        assert_eq!(decide_target("你好 world", LanguageMode::Auto), Some(Lang::En));
        assert_eq!(decide_target("hello world", LanguageMode::Auto), Some(Lang::Zh));
        assert_eq!(decide_target("Ça va?", LanguageMode::Auto), Some(Lang::Zh));
    }

    #[test]
    fn test_forced_mode_wins() {
        assert_eq!(decide_target("你好", LanguageMode::Zh), Some(Lang::Zh));
        assert_eq!(decide_target("hello", LanguageMode::En), Some(Lang::En));
    }

    #[test]
    fn test_symbol_only_text_is_left_alone() {
        for text in ["", "12345", "?!...", "👍🎉", "  +86 (10) 1234  "] {
            for mode in [LanguageMode::Auto, LanguageMode::En, LanguageMode::Zh] {
                assert_eq!(decide_target(text, mode), None, "{:?} in {}", text, mode);
            }
        }
    }

    #[test]
    fn test_source_hint() {
        assert_eq!(source_hint(Lang::En), Some(Lang::Zh));
        assert_eq!(source_hint(Lang::Zh), None);
    }

    proptest! {
        #[test]
        fn any_text_with_an_ideograph_targets_english(
            prefix in "[a-zA-Z0-9 ,.!?]{0,20}",
            ideograph in "[\u{4E00}-\u{9FFF}]",
            suffix in "[a-zA-Z0-9 ,.!?]{0,20}",
        ) {
            let text = format!("{}{}{}", prefix, ideograph, suffix);
            prop_assert_eq!(decide_target(&text, LanguageMode::Auto), Some(Lang::En));
        }

        #[test]
        fn latin_text_without_ideographs_targets_chinese(
            text in "[0-9 ,.!?]{0,10}[a-zA-Z][a-zA-Z0-9 ,.!?]{0,30}",
        ) {
            prop_assert_eq!(decide_target(&text, LanguageMode::Auto), Some(Lang::Zh));
        }

        #[test]
        fn digits_and_punctuation_never_translate(text in "[0-9 ,.!?:;()+\\-]{0,40}") {
            prop_assert_eq!(decide_target(&text, LanguageMode::Auto), None);
            prop_assert_eq!(decide_target(&text, LanguageMode::Zh), None);
        }
    }
}
