//! Title search over the book table.
//!
//! DESIGN
//! ======
//! A spoken or typed query ("find lean impact") is cleaned of filler words
//! and matched against each book's key and full name. Rules are tried from
//! strictest to loosest; within a rule the first book in store order wins.
//!
//! 1. The lowercased query is a key.
//! 2. The cleaned query is a key.
//! 3. Every keyword is a word of the key.
//! 4. At least two keywords are words of the key.
//! 5. At least two keywords occur in the full name.
//! 6. A single keyword of four or more letters occurs in the key or full name.

#[cfg(test)]
#[path = "search_test.rs"]
mod search_test;

use canvas::doc::{Item, ItemStore};

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is", "are", "was", "were",
    "find", "search", "book", "books",
];

/// Shortest word kept as a keyword, in characters.
const MIN_KEYWORD_LEN: usize = 3;

/// Shortest lone keyword allowed to match by substring, in characters.
const MIN_SUBSTRING_LEN: usize = 4;

/// A query split into the forms the rules compare against.
struct Query {
    lowered: String,
    keywords: Vec<String>,
    cleaned: String,
}

impl Query {
    fn parse(raw: &str) -> Self {
        let lowered = raw.trim().to_lowercase();
        let keywords: Vec<String> = lowered
            .split_whitespace()
            .filter(|w| w.chars().count() >= MIN_KEYWORD_LEN && !STOP_WORDS.contains(w))
            .map(str::to_owned)
            .collect();
        let cleaned = keywords.join(" ");
        Self { lowered, keywords, cleaned }
    }

    /// How many keywords satisfy `hit`.
    fn count(&self, hit: impl Fn(&str) -> bool) -> usize {
        self.keywords.iter().filter(|k| hit(k)).count()
    }
}

/// Find the book best matching `query`, or `None`.
#[must_use]
pub fn find_book<'a>(books: &'a ItemStore, query: &str) -> Option<&'a Item> {
    let query = Query::parse(query);
    if query.lowered.is_empty() {
        return None;
    }

    if let Some(book) = books.get(&query.lowered) {
        return Some(book);
    }
    if !query.cleaned.is_empty() {
        if let Some(book) = books.get(&query.cleaned) {
            return Some(book);
        }
    }

    let rules: [&dyn Fn(&Item) -> bool; 4] = [
        &|book: &Item| !query.keywords.is_empty() && query.count(|k| key_has_word(book, k)) == query.keywords.len(),
        &|book: &Item| query.keywords.len() >= 2 && query.count(|k| key_has_word(book, k)) >= 2,
        &|book: &Item| {
            let name = book.label.to_lowercase();
            query.keywords.len() >= 2 && query.count(|k| name.contains(k)) >= 2
        },
        &|book: &Item| match query.keywords.as_slice() {
            [k] if k.chars().count() >= MIN_SUBSTRING_LEN => book.id.contains(k.as_str()) || book.label.to_lowercase().contains(k.as_str()),
            _ => false,
        },
    ];
    rules.iter().find_map(|rule| books.iter().find(|book| rule(book)))
}

fn key_has_word(book: &Item, word: &str) -> bool {
    book.id.split_whitespace().any(|w| w == word)
}
