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

//! Book catalog management.
//!
//! This module holds the in-memory collection of book summaries fetched from
//! the content API, along with the state of the fetch itself. The collection
//! doubles as the local fallback for searches when the remote search fails.

use crate::model::{BookStatus, BookSummary};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum CatalogStatus {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

pub(crate) struct Catalog {
    pub(crate) status: CatalogStatus,
    books: Vec<BookSummary>,
    only: Option<BookStatus>,
}

impl Catalog {
    pub(crate) fn new() -> Self {
        Self {
            status: CatalogStatus::Idle,
            books: vec![],
            only: None,
        }
    }

    /// Marks the start of a fetch, optionally limited to one status list.
    pub(crate) fn begin_load(&mut self, only: Option<BookStatus>) {
        self.status = CatalogStatus::Loading;
        self.only = only;
    }

    pub(crate) fn finish_load(&mut self, books: Vec<BookSummary>) {
        self.books = books;
        self.status = CatalogStatus::Loaded;
    }

    /// Records a failed fetch. Previously loaded books are kept.
    pub(crate) fn fail_load(&mut self, reason: String) {
        self.status = CatalogStatus::Failed(reason);
    }

    pub(crate) fn books(&self) -> &[BookSummary] {
        &self.books
    }

    pub(crate) fn only(&self) -> Option<BookStatus> {
        self.only
    }

    pub(crate) fn find(&self, id: &str) -> Option<&BookSummary> {
        self.books.iter().find(|b| b.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::book;

    #[test]
    fn failed_reload_keeps_previous_books() {
        let mut catalog = Catalog::new();
        catalog.begin_load(None);
        catalog.finish_load(vec![book("a", "A", "x")]);

        catalog.begin_load(Some(BookStatus::Suggested));
        catalog.fail_load("offline".to_string());

        assert_eq!(catalog.status, CatalogStatus::Failed("offline".to_string()));
        assert_eq!(catalog.only(), Some(BookStatus::Suggested));
        assert!(catalog.find("a").is_some());
        assert!(catalog.find("b").is_none());
    }
}
