//! Text normalization ahead of sentiment scoring
//!
//! Strips URLs, mentions, and markup, and normalizes case and whitespace so
//! every model adapter sees the same cleaned input.

use crate::config::TextConfig;
use regex::Regex;

/// Cleans raw post text before scoring. Stateless after construction.
pub struct TextNormalizer {
    config: TextConfig,
    url: Regex,
    mention: Regex,
    hashtag: Regex,
    markup: Regex,
}

impl TextNormalizer {
    pub fn new(config: TextConfig) -> Self {
        // Patterns are static, so compilation cannot fail.
        Self {
            config,
            url: Regex::new(r"https?://[^\s]+").expect("valid url pattern"),
            mention: Regex::new(r"@\w+").expect("valid mention pattern"),
            hashtag: Regex::new(r"#\w+").expect("valid hashtag pattern"),
            markup: Regex::new(r"<[^>]+>|&\w+;").expect("valid markup pattern"),
        }
    }

    /// Normalize one post body. Returns an empty string for empty input.
    pub fn normalize(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }

        let mut text = text.to_lowercase();

        // HTML tags and entities come out regardless of configuration;
        // models never benefit from markup.
        text = self.markup.replace_all(&text, " ").into_owned();

        if self.config.remove_urls {
            text = self.url.replace_all(&text, "").into_owned();
        }
        if self.config.remove_mentions {
            text = self.mention.replace_all(&text, "").into_owned();
        }
        if self.config.remove_hashtags {
            text = self.hashtag.replace_all(&text, "").into_owned();
        }

        let mut cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");

        if cleaned.chars().count() > self.config.max_text_length {
            cleaned = cleaned.chars().take(self.config.max_text_length).collect();
        }

        cleaned
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(TextConfig::default())
    }
}
