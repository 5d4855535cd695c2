//! Local word-list translator, the last link of the chain

use crate::models::Lang;

const ZH_TO_EN: &[(&str, &str)] = &[
    ("你好", "hello"),
    ("谢谢", "thank you"),
    ("我们", "we"),
    ("是", "is"),
    ("我", "I"),
    ("你", "you"),
    ("他", "he"),
    ("她", "she"),
    ("好", "good"),
    ("不", "not"),
    ("请", "please"),
];

const EN_TO_ZH: &[(&str, &str)] = &[
    ("hello", "你好"),
    ("thank", "谢谢"),
    ("thanks", "谢谢"),
    ("you", "你"),
    ("is", "是"),
    ("i", "我"),
    ("he", "他"),
    ("she", "她"),
    ("we", "我们"),
    ("good", "好"),
    ("not", "不"),
    ("please", "请"),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct DictionaryTranslator;

impl DictionaryTranslator {
    pub fn new() -> Self {
        Self
    }

    /// Word-by-word substitution. Never fails and returns non-empty text for non-empty input.
    pub fn translate(&self, text: &str, target: Lang) -> String {
        let out = match target {
            Lang::En => Self::to_english(text),
            Lang::Zh => Self::to_chinese(text),
        };
        if out.trim().is_empty() {
            text.to_string()
        } else {
            out
        }
    }

    fn to_english(text: &str) -> String {
        // Table is ordered so multi-character words are replaced first
        ZH_TO_EN
            .iter()
            .fold(text.to_string(), |acc, (zh, en)| acc.replace(zh, &format!(" {} ", en)))
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn to_chinese(text: &str) -> String {
        text.split_whitespace()
            .map(|word| {
                let core = word.trim_matches(|c: char| c.is_ascii_punctuation());
                let lookup = core.to_lowercase();
                match EN_TO_ZH.iter().find(|(en, _)| *en == lookup) {
                    Some((_, zh)) if !core.is_empty() => word.replacen(core, zh, 1),
                    _ => word.to_string(),
                }
            })
            .collect::<String>()
    }
}
