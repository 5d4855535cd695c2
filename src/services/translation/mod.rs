//! Translation pipeline: direction detection, remote providers and the fallback chain

pub mod chain;
pub mod deepl;
pub mod dictionary;
pub mod direction;
pub mod llm;
pub mod provider;

pub use chain::{ChainSettings, TranslatedText, Translation, TranslatorChain, DICTIONARY_PROVIDER};
pub use deepl::DeeplProvider;
pub use dictionary::DictionaryTranslator;
pub use llm::LlmProvider;
pub use provider::TranslationProvider;
