//! Text normalization for embedding and skill scanning

use regex::Regex;
use std::collections::HashSet;

/// Characters trimmed from token edges; kept when internal ("node.js", "ci/cd").
const EDGE_PUNCTUATION: &[char] = &['.', '-', '/'];

pub struct TextNormalizer {
    stop_words: HashSet<&'static str>,
    url_regex: Regex,
    email_regex: Regex,
    symbol_regex: Regex,
    remove_stopwords: bool,
}

/// Both normalized flavors of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    /// Input for the encoder; may have stopwords removed
    pub embedding: String,
    /// Full-fidelity tokens for skill matching
    pub skill_scan: String,
}

impl NormalizedText {
    pub fn is_empty(&self) -> bool {
        self.skill_scan.is_empty()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextNormalizer {
    pub fn new() -> Self {
        let url_regex = Regex::new(r"(?:https?|www)\S+").expect("Invalid URL regex");

        let email_regex = Regex::new(r"\S+@\S+").expect("Invalid email regex");

        // Everything except word chars, whitespace and the symbols used in tech names
        let symbol_regex = Regex::new(r"[^\w\s+#./-]").expect("Invalid symbol regex");

        Self {
            stop_words: Self::create_stop_words(),
            url_regex,
            email_regex,
            symbol_regex,
            remove_stopwords: false,
        }
    }

    /// Drop stopwords from the embedding flavor.
    pub fn with_stopword_removal(mut self, enable: bool) -> Self {
        self.remove_stopwords = enable;
        self
    }

    pub fn normalize(&self, text: &str) -> NormalizedText {
        let tokens = self.tokenize(text);

        let embedding = if self.remove_stopwords {
            tokens
                .iter()
                .filter(|token| !self.is_stop_word(token))
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            tokens.join(" ")
        };

        NormalizedText {
            embedding,
            skill_scan: tokens.join(" "),
        }
    }

    /// Lowercase, strip URLs and emails, drop stray symbols and split on whitespace
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let without_urls = self.url_regex.replace_all(&lowered, " ");
        let without_emails = self.email_regex.replace_all(&without_urls, " ");
        let cleaned = self.symbol_regex.replace_all(&without_emails, " ");

        cleaned
            .split_whitespace()
            .map(|token| token.trim_matches(EDGE_PUNCTUATION))
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word.to_lowercase().as_str())
    }

    /// Common English stop words
    fn create_stop_words() -> HashSet<&'static str> {
        [
            "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he",
            "in", "is", "it", "its", "of", "on", "that", "the", "to", "was", "will", "with",
            "this", "but", "they", "have", "had", "what", "when", "where", "who",
            "which", "why", "how", "all", "each", "every", "both", "few", "more", "most",
            "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so",
            "than", "too", "very", "can", "just", "should", "now",
        ]
        .into_iter()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_and_whitespace() {
        let normalizer = TextNormalizer::new();
        let result = normalizer.normalize("  Senior   Rust\n\tEngineer  ");
        assert_eq!(result.skill_scan, "senior rust engineer");
        assert_eq!(result.embedding, "senior rust engineer");
    }

    #[test]
    fn test_urls_and_emails_removed() {
        let normalizer = TextNormalizer::new();
        let result = normalizer.normalize(
            "Contact jane.doe@example.com or see https://github.com/jane \
             and www.jane.dev for Python",
        );
        assert!(!result.skill_scan.contains("example"));
        assert!(!result.skill_scan.contains("github"));
        assert!(!result.skill_scan.contains("jane.dev"));
        assert!(result.skill_scan.ends_with("for python"));
    }

    #[test]
    fn test_compound_tech_names_survive() {
        let normalizer = TextNormalizer::new();
        let result =
            normalizer.normalize("Node.js, C++, C#, CI/CD, Scikit-learn; ASP.NET (Vue.js).");
        let tokens: Vec<&str> = result.skill_scan.split(' ').collect();
        assert_eq!(
            tokens,
            vec!["node.js", "c++", "c#", "ci/cd", "scikit-learn", "asp.net", "vue.js"]
        );
    }

    #[test]
    fn test_edge_punctuation_trimmed() {
        let normalizer = TextNormalizer::new();
        let result = normalizer.normalize("- Python. - Docker... /Linux/");
        assert_eq!(result.skill_scan, "python docker linux");
    }

    #[test]
    fn test_stopwords_only_dropped_from_embedding_flavor() {
        let normalizer = TextNormalizer::new().with_stopword_removal(true);
        let result = normalizer.normalize("Experience with R and Go is a plus");
        assert_eq!(result.skill_scan, "experience with r and go is a plus");
        assert_eq!(result.embedding, "experience r go plus");
    }

    #[test]
    fn test_default_keeps_stopwords_for_embedding() {
        let normalizer = TextNormalizer::new();
        let result = normalizer.normalize("The team uses Rust");
        assert_eq!(result.embedding, "the team uses rust");
    }

    #[test]
    fn test_only_noise_normalizes_to_empty() {
        let normalizer = TextNormalizer::new();
        let result = normalizer.normalize("https://example.com  me@example.com !!! ---");
        assert!(result.is_empty());
        assert!(result.embedding.is_empty());
    }

    #[test]
    fn test_stop_word_lookup() {
        let normalizer = TextNormalizer::new();
        assert!(normalizer.is_stop_word("The"));
        assert!(!normalizer.is_stop_word("r"));
    }
}
