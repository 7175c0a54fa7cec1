// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Free-text matching of book summaries.
//!
//! A query matches a book when, ignoring case, it is found:
//!
//! 1. inside the title or subtitle,
//! 2. inside the author,
//! 3. at the start of any title or author word ("har" finds "Harry"),
//! 4. inside the initials of the title words followed by the author words
//!    ("hpjk" finds "Harry Potter" by "J K Rowling").
//!
//! Matching is pure and cheap enough to run on every keystroke.

use std::{borrow::Cow, collections::HashSet};

use crate::model::BookSummary;

/// Returns true if `book` matches the free-text `query`.
///
/// A blank query never matches. Callers that want "no filter" for a blank
/// query should use [`filter_books`].
pub(crate) fn matches(book: &BookSummary, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return false;
    }

    let title = book.title.to_lowercase();
    let author = book.author.to_lowercase();
    let subtitle = book
        .subtitle
        .as_deref()
        .map(str::to_lowercase)
        .unwrap_or_default();

    if title.contains(&query) || subtitle.contains(&query) {
        return true;
    }

    if author.contains(&query) {
        return true;
    }

    // split_whitespace never yields empty tokens
    let words: Vec<&str> = title
        .split_whitespace()
        .chain(author.split_whitespace())
        .collect();

    if words.iter().any(|word| word.starts_with(&query)) {
        return true;
    }

    let initials: String = words.iter().filter_map(|word| word.chars().next()).collect();

    initials.contains(&query)
}

/// Filters `books` down to those matching `query`, preserving order.
///
/// A blank query returns the input untouched. Otherwise the matches are
/// returned with duplicate identifiers removed, keeping the first occurrence.
pub(crate) fn filter_books<'a>(books: &'a [BookSummary], query: &str) -> Cow<'a, [BookSummary]> {
    if query.trim().is_empty() {
        return Cow::Borrowed(books);
    }

    let mut seen = HashSet::new();
    let mut matched = Vec::new();
    for book in books {
        if matches(book, query) && seen.insert(book.id.as_str()) {
            matched.push(book.clone());
        }
    }

    Cow::Owned(matched)
}

/// Concatenates several result lists, dropping any book whose identifier has
/// already been seen.
pub(crate) fn merge_books<I>(sources: I) -> Vec<BookSummary>
where
    I: IntoIterator<Item = Vec<BookSummary>>,
{
    dedup_by_id(sources.into_iter().flatten())
}

/// Removes repeated identifiers, first occurrence wins.
pub(crate) fn dedup_by_id<I>(books: I) -> Vec<BookSummary>
where
    I: IntoIterator<Item = BookSummary>,
{
    let mut seen = HashSet::new();
    books
        .into_iter()
        .filter(|book| seen.insert(book.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::book;

    fn atomic_habits() -> BookSummary {
        book("ah", "Atomic Habits", "James Clear")
    }

    #[test]
    fn substring_of_title_or_author_matches() {
        let b = book("hp", "Harry Potter", "J K Rowling");

        assert!(matches(&b, "potter"));
        assert!(matches(&b, "RRY POT"));
        assert!(matches(&b, "rowl"));
        assert!(matches(&b, "  owling  "));
    }

    #[test]
    fn subtitle_substring_matches() {
        let mut b = atomic_habits();
        b.subtitle = Some("An Easy & Proven Way to Build Good Habits".to_string());

        assert!(matches(&b, "proven way"));
    }

    #[test]
    fn blank_query_never_matches() {
        let b = atomic_habits();

        assert!(!matches(&b, ""));
        assert!(!matches(&b, "   "));
    }

    #[test]
    fn word_prefix_matches() {
        assert!(matches(&atomic_habits(), "ato"));
        assert!(matches(&atomic_habits(), "Cle"));
    }

    #[test]
    fn initials_match() {
        let b = book("hp", "Harry Potter", "J K Rowling");

        assert!(matches(&b, "hpjk"));
        assert!(matches(&b, "jkr"));
        assert!(matches(&b, "HPJKR"));
        assert!(!matches(&b, "hpr"));
    }

    #[test]
    fn initials_ignore_repeated_whitespace() {
        let b = book("hp", "  Harry   Potter ", "J  K Rowling");

        assert!(matches(&b, "hpjkr"));
    }

    #[test]
    fn unrelated_query_does_not_match() {
        assert!(!matches(&atomic_habits(), "xyz"));
    }

    #[test]
    fn empty_book_never_matches() {
        let b = book("empty", "", "");

        assert!(!matches(&b, "a"));
    }

    #[test]
    fn blank_query_returns_input_unchanged() {
        let books = vec![atomic_habits(), book("hp", "Harry Potter", "J K Rowling")];

        let filtered = filter_books(&books, "  ");

        assert!(matches!(filtered, Cow::Borrowed(_)));
        assert_eq!(filtered.as_ref(), books.as_slice());
    }

    #[test]
    fn filter_preserves_order_and_drops_duplicates() {
        let remote = vec![
            book("1", "Deep Work", "Cal Newport"),
            book("2", "Deep Nutrition", "Catherine Shanahan"),
        ];
        let local = vec![
            book("3", "The Deep", "Unknown"),
            book("5", "Zero to One", "Peter Thiel"),
            book("1", "Deep Work (local)", "Cal Newport"),
            book("4", "Deep Survival", "Laurence Gonzales"),
        ];

        let combined: Vec<BookSummary> = remote.into_iter().chain(local).collect();
        let filtered = filter_books(&combined, "deep");

        let ids: Vec<&str> = filtered.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3", "4"]);
        assert_eq!(filtered[0].title, "Deep Work");
    }

    #[test]
    fn filter_excludes_non_matches() {
        let books = vec![atomic_habits(), book("hp", "Harry Potter", "J K Rowling")];

        let filtered = filter_books(&books, "harry");

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "hp");
    }

    #[test]
    fn merge_keeps_first_occurrence() {
        let selected = vec![book("a", "A", "x"), book("b", "B", "x")];
        let recommended = vec![book("b", "B again", "x"), book("c", "C", "x")];

        let merged = merge_books([selected, recommended]);

        let titles: Vec<&str> = merged.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, ["A", "B", "C"]);
    }
}
