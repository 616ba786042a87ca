//! Blocklist matching.
//!
//! Entries are literal substrings. They are compiled once into a single
//! leftmost-first alternation, so one scan replaces every occurrence, earlier
//! entries win where matches overlap, and replacement text is never rescanned.

use std::borrow::Cow;

use regex::{Regex, RegexBuilder};

/// Process-wide, read-only list of blocked substrings.
#[derive(Debug, Clone, Default)]
pub struct Blocklist {
    entries: Vec<String>,
    matcher: Option<Regex>,
}

impl Blocklist {
    /// Compile entries in the given order. Empty entries are ignored.
    pub fn new<I, S>(entries: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries: Vec<String> = entries
            .into_iter()
            .map(Into::into)
            .filter(|e: &String| !e.is_empty())
            .collect();

        if entries.is_empty() {
            return Ok(Self::default());
        }

        let pattern = entries
            .iter()
            .map(|e| regex::escape(e))
            .collect::<Vec<_>>()
            .join("|");
        let matcher = RegexBuilder::new(&pattern)
            .size_limit(64 * 1024 * 1024)
            .build()?;

        Ok(Self {
            entries,
            matcher: Some(matcher),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any entry occurs in `body`.
    pub fn matches(&self, body: &str) -> bool {
        self.matcher.as_ref().is_some_and(|m| m.is_match(body))
    }

    /// Replace every blocked occurrence with `replacement`, returning the hit count.
    pub fn replace_all<'a>(&self, body: &'a str, replacement: &str) -> (Cow<'a, str>, usize) {
        let Some(matcher) = &self.matcher else {
            return (Cow::Borrowed(body), 0);
        };

        let hits = matcher.find_iter(body).count();
        if hits == 0 {
            return (Cow::Borrowed(body), 0);
        }
        (matcher.replace_all(body, regex::NoExpand(replacement)), hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_blocklist_is_noop() {
        let list = Blocklist::new(Vec::<String>::new()).unwrap();
        assert!(list.is_empty());
        assert!(!list.matches("anything"));
        let (out, hits) = list.replace_all("anything", "x");
        assert_eq!(out, "anything");
        assert_eq!(hits, 0);
    }

    #[test]
    fn test_replaces_every_occurrence() {
        let list = Blocklist::new(["ads.example/track.js"]).unwrap();
        let body = r#"<script src="https://ads.example/track.js"></script><script src="//ads.example/track.js"></script>"#;
        let (out, hits) = list.replace_all(body, "proxy.test/.drop");
        assert_eq!(hits, 2);
        assert_eq!(
            out,
            r#"<script src="https://proxy.test/.drop"></script><script src="//proxy.test/.drop"></script>"#
        );
    }

    #[test]
    fn test_first_entry_wins_on_overlap() {
        let list = Blocklist::new(["ads.example", "ads.example/big"]).unwrap();
        let (out, hits) = list.replace_all("x ads.example/big y", "D");
        assert_eq!(hits, 1);
        assert_eq!(out, "x D/big y");
    }

    #[test]
    fn test_replacement_is_not_rescanned() {
        // The replacement itself contains an entry; a second pass would mangle it.
        let list = Blocklist::new(["/.drop", "ads"]).unwrap();
        let (out, hits) = list.replace_all("ads", "p/.drop");
        assert_eq!(hits, 1);
        assert_eq!(out, "p/.drop");
    }

    #[test]
    fn test_entries_are_literal() {
        let list = Blocklist::new(["a.b$(x)"]).unwrap();
        assert!(list.matches("--a.b$(x)--"));
        assert!(!list.matches("aXb$(x)"));
        let (out, _) = list.replace_all("a.b$(x)", "$1");
        assert_eq!(out, "$1");
    }
}
