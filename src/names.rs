//! String utilities for author names and name lists.

use regex::Regex;
use std::sync::LazyLock;

const HONORIFICS: [&str; 5] = ["Drs ", "Dr ", "Ms ", "Mrs ", "Mr "];

/// Splits "A, B, and C" or "A and B" style lists.
static NAMELIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s(?:and\s)?|\sand\s").unwrap());

/// Drops a leading honorific word such as "Dr " or "Mrs ".
pub fn discard_honorific(name: &str) -> &str {
    if !HONORIFICS.iter().any(|h| name.starts_with(h)) {
        return name;
    }
    name.split_once(char::is_whitespace)
        .map(|(_, rest)| rest.trim_start())
        .unwrap_or(name)
}

/// Removes `token` from the front of `text` when the trimmed text starts with it.
pub fn discard_leading<'a>(token: &str, text: &'a str) -> &'a str {
    if !text.trim().starts_with(token) {
        return text;
    }
    match text.find(token) {
        Some(at) => &text[at + token.len()..],
        None => text,
    }
}

pub fn namelist_split(text: &str) -> Vec<&str> {
    NAMELIST.split(text).collect()
}

/// Trims whitespace and ASCII punctuation from both ends.
pub fn trim_punctuation(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
}

/// Configurable author-token cleaning.
///
/// A cleaned item always comes back as a list: "Dr Foo and Ms Bar" becomes
/// `["Foo", "Bar"]`, "and Baz" becomes `["Baz"]`, anything else a single entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorCleaner {
    pub filter_honorifics: bool,
    pub conjunction: String,
    pub word_split: bool,
}

impl Default for AuthorCleaner {
    fn default() -> Self {
        Self {
            filter_honorifics: true,
            conjunction: "and".to_string(),
            word_split: true,
        }
    }
}

impl AuthorCleaner {
    pub fn keep_honorifics() -> Self {
        Self {
            filter_honorifics: false,
            ..Self::default()
        }
    }

    pub fn clean(&self, item: &str) -> Vec<String> {
        let item = trim_punctuation(item);
        let infix = format!(" {} ", self.conjunction);
        let prefix = format!("{} ", self.conjunction);

        let names: Vec<&str> = if self.word_split && matches!(item.find(&infix), Some(at) if at > 0) {
            item.split(infix.as_str()).collect()
        } else if let Some(rest) = item.strip_prefix(prefix.as_str()) {
            vec![rest]
        } else {
            vec![item]
        };

        names
            .into_iter()
            .map(|name| {
                if self.filter_honorifics {
                    discard_honorific(name)
                } else {
                    name
                }
            })
            .map(String::from)
            .collect()
    }
}

pub fn clean_author(item: &str, filter_honorifics: bool) -> Vec<String> {
    AuthorCleaner {
        filter_honorifics,
        ..AuthorCleaner::default()
    }
    .clean(item)
}

fn part_initials(part: &str) -> Vec<String> {
    if let Some(abbreviated) = part.strip_suffix('.') {
        // already initials, e.g. "M.K."
        return abbreviated
            .split('.')
            .filter_map(|piece| piece.chars().next())
            .map(String::from)
            .collect();
    }
    part.split('-')
        .enumerate()
        .filter_map(|(i, piece)| {
            piece.chars().next().map(|c| {
                if i == 0 {
                    c.to_string()
                } else {
                    format!("-{}", c)
                }
            })
        })
        .collect()
}

/// Initials in NEJM form: "Jane E. Rab-Bar" gives "J.E.R.-B.".
pub fn initials(name: &str) -> String {
    let letters: Vec<String> = name.split_whitespace().flat_map(part_initials).collect();
    format!("{}.", letters.join("."))
}
