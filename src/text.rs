//! Caption text helpers: platform length limits, keyword ranking and hashtags.
//!
//! Everything here is total over string input and never fails.

use crate::models::{DEFAULT_CHAR_LIMIT, Platform};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Words that never become keywords or hashtags.
pub const STOPWORDS: &[&str] = &[
    "the", "and", "a", "an", "of", "in", "to", "for", "with", "on", "is", "are", "be", "or", "by",
    "your", "you", "it", "at",
];

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-z-]{3,}\b").expect("keyword pattern is valid"));

static KEYWORD_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",|\n|;").expect("keyword separator pattern is valid"));

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

/// Character budget for a platform name. Unknown names get the default budget.
pub fn platform_limit(platform: &str) -> usize {
    platform
        .parse::<Platform>()
        .map(|p| p.char_limit())
        .unwrap_or(DEFAULT_CHAR_LIMIT)
}

/// Trims `text` to the platform's character budget without splitting a word.
///
/// Lengths are counted in chars. When trimming happens an ellipsis is appended,
/// so the result can run up to three chars past the limit.
pub fn enforce_platform_limit(text: &str, platform: &str) -> String {
    let limit = platform_limit(platform);
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let cut = text
        .char_indices()
        .nth(limit)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    let trimmed = &text[..cut];

    match trimmed.rfind(' ') {
        Some(last_space) => format!("{}...", trimmed[..last_space].trim_end()),
        // a single word longer than the limit
        None => format!("{}...", trimmed),
    }
}

/// Returns up to `max_k` distinct words ranked by frequency.
///
/// Ties keep the order in which the words first appear.
pub fn extract_keywords(text: &str, max_k: usize) -> Vec<String> {
    let lowered = text.to_lowercase();

    let mut ranked: Vec<(&str, usize)> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();
    for m in WORD_RE.find_iter(&lowered) {
        let word = m.as_str();
        if is_stopword(word) {
            continue;
        }
        match slots.get(word) {
            Some(&slot) => ranked[slot].1 += 1,
            None => {
                slots.insert(word, ranked.len());
                ranked.push((word, 1));
            }
        }
    }

    // stable: equal counts stay in first-seen order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
        .into_iter()
        .take(max_k)
        .map(|(word, _)| word.to_string())
        .collect()
}

/// Turns keywords into `#tags`, keeping only lowercase ASCII letters and digits.
pub fn make_hashtags<S: AsRef<str>>(keywords: &[S], limit: usize) -> Vec<String> {
    let mut tags = Vec::new();
    for keyword in keywords {
        if tags.len() >= limit {
            break;
        }
        let clean: String = keyword
            .as_ref()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            .collect();
        if clean.is_empty() || is_stopword(&clean) {
            continue;
        }
        tags.push(format!("#{}", clean));
    }
    tags
}

/// Splits a model-produced keyword list on commas, semicolons and newlines.
pub fn parse_keyword_list(raw: &str) -> Vec<String> {
    KEYWORD_SPLIT_RE
        .split(raw)
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_unchanged() {
        assert_eq!(enforce_platform_limit("short text", "twitter"), "short text");
    }

    #[test]
    fn text_at_exact_limit_is_unchanged() {
        let text = "a".repeat(280);
        assert_eq!(enforce_platform_limit(&text, "twitter"), text);
    }

    #[test]
    fn long_text_is_cut_at_a_space() {
        let text = "word ".repeat(100);
        let out = enforce_platform_limit(&text, "twitter");
        assert!(out.chars().count() <= 283);
        assert!(out.ends_with("..."));
        let body = out.trim_end_matches("...");
        assert!(body.split(' ').all(|w| w == "word"));
        assert!(!body.ends_with(' '));
    }

    #[test]
    fn single_long_word_keeps_limit_and_ellipsis() {
        let text = "x".repeat(300);
        let out = enforce_platform_limit(&text, "twitter");
        assert_eq!(out.chars().count(), 283);
        assert_eq!(&out[..280], &text[..280]);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn unknown_platform_uses_default_limit() {
        assert_eq!(platform_limit("friendster"), 2200);
        let text = "ab ".repeat(1000);
        let out = enforce_platform_limit(&text, "friendster");
        assert!(out.chars().count() <= 2203);
    }

    #[test]
    fn limit_counts_chars_not_bytes() {
        let text = "é".repeat(280);
        assert_eq!(enforce_platform_limit(&text, "twitter"), text);
        let longer = "é".repeat(281);
        assert_eq!(enforce_platform_limit(&longer, "twitter").chars().count(), 283);
    }

    #[test]
    fn limit_holds_across_platforms_and_is_idempotent_below_it() {
        let samples = [
            String::new(),
            "hello world".to_string(),
            "lorem ipsum dolor sit amet ".repeat(200),
            "z".repeat(5000),
            "  spaced   out  ".repeat(300),
        ];
        for platform in ["instagram", "twitter", "linkedin", "unknown"] {
            let limit = platform_limit(platform);
            for text in &samples {
                let once = enforce_platform_limit(text, platform);
                assert!(once.chars().count() <= limit + 3);
                if once.chars().count() <= limit {
                    assert_eq!(enforce_platform_limit(&once, platform), once);
                }
            }
        }
    }

    #[test]
    fn keywords_rank_by_frequency_then_first_seen() {
        let text = "Water is essential for health. Drink water daily for great health.";
        assert_eq!(extract_keywords(text, 3), vec!["water", "health", "essential"]);
    }

    #[test]
    fn keywords_skip_stopwords_and_short_tokens() {
        let kws = extract_keywords("The cat and the dog sat on a mat with you and your pal", 6);
        for kw in &kws {
            assert!(!is_stopword(kw));
            assert!(kw.len() >= 3);
        }
        assert_eq!(kws, vec!["cat", "dog", "sat", "mat", "pal"]);
    }

    #[test]
    fn keywords_respect_max_k_and_may_be_empty() {
        assert!(extract_keywords("", 6).is_empty());
        assert!(extract_keywords("the and of 42 99", 6).is_empty());
        assert_eq!(extract_keywords("alpha beta gamma delta", 2).len(), 2);
    }

    #[test]
    fn keywords_keep_hyphenated_words() {
        let kws = extract_keywords("Self-care matters. self-care daily!", 6);
        assert_eq!(kws[0], "self-care");
    }

    #[test]
    fn hashtags_strip_punctuation_and_drop_stopwords() {
        assert_eq!(
            make_hashtags(&["Water!", "the", "Health-Tips"], 8),
            vec!["#water", "#healthtips"]
        );
    }

    #[test]
    fn hashtags_respect_limit_and_format() {
        let words: Vec<String> = (0..20).map(|i| format!("Topic{}", i)).collect();
        let tags = make_hashtags(&words, 8);
        assert_eq!(tags.len(), 8);
        for tag in &tags {
            let rest = tag.strip_prefix('#').unwrap();
            assert!(!rest.is_empty());
            assert!(rest.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }
        assert!(make_hashtags(&words, 0).is_empty());
    }

    #[test]
    fn hashtags_skip_empty_after_cleaning() {
        assert_eq!(make_hashtags(&["!!!", "??", "ok"], 8), vec!["#ok"]);
    }

    #[test]
    fn keyword_list_splits_on_all_separators() {
        assert_eq!(
            parse_keyword_list("glass of water, hydration;\n  morning light ,, "),
            vec!["glass of water", "hydration", "morning light"]
        );
        assert!(parse_keyword_list(" , ;\n").is_empty());
    }
}
