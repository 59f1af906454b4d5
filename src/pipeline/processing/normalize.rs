use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::config::DedupConfig;

// Emoticons, misc symbols & pictographs, transport & map, misc symbols, dingbats
static EMOJI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x{1F600}-\x{1F64F}\x{1F300}-\x{1F5FF}\x{1F680}-\x{1F6FF}\x{2600}-\x{26FF}\x{2700}-\x{27BF}]")
        .expect("emoji pattern is valid")
});

static PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("punctuation pattern is valid"));

/// Canonicalizes free text (titles, venue names) before comparison
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    stop_words: HashSet<String>,
}

impl TextNormalizer {
    pub fn new<I, S>(stop_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            stop_words: stop_words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &DedupConfig) -> Self {
        Self::new(&config.stop_words)
    }

    /// Lower-case, drop emoji, turn punctuation into spaces, collapse whitespace
    /// and remove stop words. Blank input gives an empty string.
    pub fn normalize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let lowered = text.to_lowercase();
        let without_emoji = EMOJI.replace_all(&lowered, "");
        let without_punctuation = PUNCTUATION.replace_all(&without_emoji, " ");

        without_punctuation
            .split_whitespace()
            .filter(|token| !self.stop_words.contains(*token))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::from_config(&DedupConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_stop_words_and_case() {
        let normalizer = TextNormalizer::default();
        assert_eq!(normalizer.normalize("Salsa Party Friday"), "salsa friday");
        assert_eq!(normalizer.normalize("Friday Salsa Night"), "friday salsa");
    }

    #[test]
    fn strips_emoji_and_punctuation() {
        let normalizer = TextNormalizer::default();
        assert_eq!(
            normalizer.normalize("💃 BACHATA!!! @ Club-Havana 🎉"),
            "bachata club havana"
        );
        assert_eq!(normalizer.normalize("☀ Sunday ✨ Kizomba"), "sunday kizomba");
    }

    #[test]
    fn keeps_non_ascii_letters() {
        let normalizer = TextNormalizer::default();
        assert_eq!(normalizer.normalize("Malmö Salsa"), "malmö salsa");
    }

    #[test]
    fn empty_and_all_stop_words_give_empty() {
        let normalizer = TextNormalizer::default();
        assert_eq!(normalizer.normalize(""), "");
        assert_eq!(normalizer.normalize("   "), "");
        assert_eq!(normalizer.normalize("The Dance Party!"), "");
    }

    #[test]
    fn custom_vocabulary() {
        let normalizer = TextNormalizer::new(["salsa"]);
        assert_eq!(normalizer.normalize("Salsa Party"), "party");
    }
}
