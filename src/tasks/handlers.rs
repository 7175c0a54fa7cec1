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

use anyhow::Result;
use tracing::{debug, warn};

use crate::{
    api::{ApiError, ContentApi, search_with_fallback},
    events::AppEvent,
    model::{BookStatus, BookSummary, matcher::merge_books, search::SearchRequest},
    tasks::TaskContext,
};

pub(super) fn load_catalog(ctx: &TaskContext, only: Option<BookStatus>) -> Result<()> {
    ctx.event_tx.send(AppEvent::CatalogLoading(only))?;

    let event = match fetch_catalog(ctx.api, only) {
        Ok(books) => AppEvent::CatalogLoaded(books),
        Err(e) => AppEvent::CatalogFailed(e.to_string()),
    };
    ctx.event_tx.send(event)?;

    Ok(())
}

/// Runs a search and reports its results, or its failure, under the
/// request's generation.
pub(super) fn search(ctx: &TaskContext, request: SearchRequest, local: &[BookSummary]) -> Result<()> {
    let event = match search_with_fallback(ctx.api, &request.query, local) {
        Ok(results) => {
            debug!(generation = request.generation, count = results.len(), "Search complete");
            AppEvent::SearchResultsReady(request.generation, results)
        }
        Err(e) => {
            warn!(generation = request.generation, error = %e, "Search failed");
            AppEvent::SearchFailed(request.generation, e.to_string())
        }
    };
    ctx.event_tx.send(event)?;

    Ok(())
}

pub(super) fn fetch_book(ctx: &TaskContext, id: &str) -> Result<()> {
    let book = ctx.api.fetch_by_id(id)?;
    ctx.event_tx.send(AppEvent::BookDetailsReady(book))?;

    Ok(())
}

/// Fetches the status lists and merges them, first occurrence of a book
/// wins.
///
/// A list that fails to load is skipped. The catalog only fails when every
/// list does.
fn fetch_catalog(api: &dyn ContentApi, only: Option<BookStatus>) -> Result<Vec<BookSummary>, ApiError> {
    let statuses = match only {
        Some(status) => vec![status],
        None => BookStatus::ALL.to_vec(),
    };

    let mut lists = vec![];
    let mut last_error = None;

    for status in statuses {
        match api.fetch_by_status(status) {
            Ok(books) => lists.push(books),
            Err(e) => {
                warn!(%status, error = %e, "Failed to fetch book list");
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if lists.is_empty() => Err(e),
        _ => Ok(merge_books(lists)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::model::book;

    struct StatusApi;

    impl ContentApi for StatusApi {
        fn fetch_by_status(&self, status: BookStatus) -> Result<Vec<BookSummary>, ApiError> {
            match status {
                BookStatus::Selected => Ok(vec![book("a", "Alpha", "x")]),
                BookStatus::Recommended => Ok(vec![book("b", "Beta", "y"), book("a", "Alpha again", "x")]),
                BookStatus::Suggested => Err(ApiError::Server(503)),
            }
        }

        fn fetch_by_id(&self, id: &str) -> Result<BookSummary, ApiError> {
            match id {
                "a" => Ok(book("a", "Alpha", "x")),
                _ => Err(ApiError::NotFound(id.to_string())),
            }
        }

        fn search_by_text(&self, _query: &str) -> Result<Vec<BookSummary>, ApiError> {
            Err(ApiError::Server(500))
        }
    }

    fn ids(books: &[BookSummary]) -> Vec<&str> {
        books.iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn catalog_merges_lists_and_skips_failures() {
        let books = fetch_catalog(&StatusApi, None).unwrap();

        assert_eq!(ids(&books), ["a", "b"]);
        assert_eq!(books[0].title, "Alpha");
    }

    #[test]
    fn catalog_fails_when_every_list_fails() {
        let result = fetch_catalog(&StatusApi, Some(BookStatus::Suggested));

        assert!(matches!(result, Err(ApiError::Server(503))));
    }

    #[test]
    fn load_catalog_announces_loading_first() {
        let (event_tx, event_rx) = mpsc::channel();
        let ctx = TaskContext {
            api: &StatusApi,
            event_tx: &event_tx,
        };

        load_catalog(&ctx, Some(BookStatus::Selected)).unwrap();

        assert!(matches!(
            event_rx.try_recv(),
            Ok(AppEvent::CatalogLoading(Some(BookStatus::Selected)))
        ));
        assert!(matches!(event_rx.try_recv(), Ok(AppEvent::CatalogLoaded(books)) if books.len() == 1));
    }

    #[test]
    fn search_falls_back_and_keeps_generation() {
        let (event_tx, event_rx) = mpsc::channel();
        let ctx = TaskContext {
            api: &StatusApi,
            event_tx: &event_tx,
        };
        let request = SearchRequest {
            generation: 9,
            query: "beta".to_string(),
        };
        let local = vec![book("a", "Alpha", "x"), book("b", "Beta", "y")];

        search(&ctx, request, &local).unwrap();

        match event_rx.try_recv() {
            Ok(AppEvent::SearchResultsReady(generation, books)) => {
                assert_eq!(generation, 9);
                assert_eq!(ids(&books), ["b"]);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn failed_search_reports_its_generation() {
        let (event_tx, event_rx) = mpsc::channel();
        let ctx = TaskContext {
            api: &StatusApi,
            event_tx: &event_tx,
        };
        let request = SearchRequest {
            generation: 4,
            query: "harry".to_string(),
        };

        search(&ctx, request, &[]).unwrap();

        match event_rx.try_recv() {
            Ok(AppEvent::SearchFailed(generation, message)) => {
                assert_eq!(generation, 4);
                assert!(message.contains("500"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(event_rx.try_recv().is_err());
    }

    #[test]
    fn missing_book_is_an_error() {
        let (event_tx, event_rx) = mpsc::channel();
        let ctx = TaskContext {
            api: &StatusApi,
            event_tx: &event_tx,
        };

        assert!(fetch_book(&ctx, "zzz").is_err());
        assert!(event_rx.try_recv().is_err());

        fetch_book(&ctx, "a").unwrap();
        assert!(matches!(event_rx.try_recv(), Ok(AppEvent::BookDetailsReady(b)) if b.id == "a"));
    }
}
