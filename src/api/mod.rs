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

//! Content API client.
//!
//! This module fetches book summaries from the remote content API. Calls are
//! blocking and are only made from the task worker thread, never from the UI
//! thread.
//!
//! Every request is retried with exponential backoff before an error is
//! returned, except for errors that another attempt cannot fix.

use std::{thread, time::Duration};

use anyhow::Context;
use reqwest::{StatusCode, blocking::Client};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    config::AppConfig,
    model::{
        BookStatus, BookSummary,
        matcher::{dedup_by_id, filter_books},
    },
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub(crate) enum ApiError {
    #[error("book with id \"{0}\" not found")]
    NotFound(String),

    #[error("server error ({0}), please try again later")]
    Server(u16),

    #[error("request failed with status {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid response from server")]
    InvalidResponse,
}

impl ApiError {
    /// Whether another attempt could succeed.
    pub(crate) fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Server(_) | ApiError::Status(_) | ApiError::Transport(_)
        )
    }
}

/// The remote catalog of book summaries.
pub(crate) trait ContentApi {
    /// Books published under `status`.
    fn fetch_by_status(&self, status: BookStatus) -> Result<Vec<BookSummary>, ApiError>;

    fn fetch_by_id(&self, id: &str) -> Result<BookSummary, ApiError>;

    /// Books whose title or author matches `query`, as decided by the server.
    fn search_by_text(&self, query: &str) -> Result<Vec<BookSummary>, ApiError>;
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct RetryPolicy {
    /// Attempts made after the first one fails.
    pub(crate) retries: u32,
    /// Wait before the first retry, doubled for each one after.
    pub(crate) delay: Duration,
}

impl RetryPolicy {
    pub(crate) fn from_config(config: &AppConfig) -> Self {
        Self {
            retries: config.retry_attempts,
            delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    /// Runs `op` until it succeeds, fails with a permanent error, or the
    /// retries are used up.
    pub(crate) fn run<T, F>(&self, operation: &str, mut op: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Result<T, ApiError>,
    {
        let mut delay = self.delay;
        let mut retries_left = self.retries;

        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if retries_left > 0 && e.is_retryable() => {
                    warn!(operation, error = %e, retries_left, ?delay, "API request failed, retrying");
                    thread::sleep(delay);
                    delay = delay.saturating_mul(2);
                    retries_left -= 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// [`ContentApi`] over HTTP.
pub(crate) struct HttpContentApi {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl HttpContentApi {
    pub(crate) fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy::from_config(config),
        })
    }

    fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<(StatusCode, String), ApiError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(url = %url, ?params, "API request started");

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .map_err(ApiError::Transport)?;

        let status = response.status();
        let body = response.text().map_err(ApiError::Transport)?;

        Ok((status, body))
    }
}

impl ContentApi for HttpContentApi {
    fn fetch_by_status(&self, status: BookStatus) -> Result<Vec<BookSummary>, ApiError> {
        self.retry.run("getBooks", || {
            let (code, body) = self.get("getBooks", &[("status", status.as_str())])?;
            check_status(code)?;
            decode_books(&body)
        })
    }

    fn fetch_by_id(&self, id: &str) -> Result<BookSummary, ApiError> {
        self.retry.run("getBook", || {
            let (code, body) = self.get("getBook", &[("id", id)])?;
            if code == StatusCode::NOT_FOUND {
                return Err(ApiError::NotFound(id.to_string()));
            }
            check_status(code)?;
            decode_book(&body)
        })
    }

    fn search_by_text(&self, query: &str) -> Result<Vec<BookSummary>, ApiError> {
        self.retry.run("getBooksByAuthorOrTitle", || {
            let (code, body) = self.get("getBooksByAuthorOrTitle", &[("search", query)])?;
            check_status(code)?;
            decode_search(&body)
        })
    }
}

fn check_status(code: StatusCode) -> Result<(), ApiError> {
    if code.is_success() {
        Ok(())
    } else if code.is_server_error() {
        Err(ApiError::Server(code.as_u16()))
    } else {
        Err(ApiError::Status(code.as_u16()))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<BookSummary>),
    One(BookSummary),
}

/// Decodes a status listing, which may be a single book or a list of them.
fn decode_books(body: &str) -> Result<Vec<BookSummary>, ApiError> {
    match serde_json::from_str(body)? {
        OneOrMany::Many(books) => Ok(books),
        OneOrMany::One(book) => Ok(vec![book]),
    }
}

fn decode_book(body: &str) -> Result<BookSummary, ApiError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    if !value.is_object() {
        return Err(ApiError::InvalidResponse);
    }
    Ok(serde_json::from_value(value)?)
}

/// Decodes search results. Anything other than a list means no results.
fn decode_search(body: &str) -> Result<Vec<BookSummary>, ApiError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    if !value.is_array() {
        return Ok(vec![]);
    }
    let books: Vec<BookSummary> = serde_json::from_value(value)?;
    Ok(dedup_by_id(books))
}

/// Searches remotely, falling back to matching `local` books if the remote
/// search fails.
///
/// A blank query returns no books without touching the API. The error is
/// only returned when the remote search fails and there is nothing local to
/// fall back to.
pub(crate) fn search_with_fallback(
    api: &dyn ContentApi,
    query: &str,
    local: &[BookSummary],
) -> Result<Vec<BookSummary>, ApiError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(vec![]);
    }

    match api.search_by_text(query) {
        Ok(books) => Ok(dedup_by_id(books)),
        Err(e) if !local.is_empty() => {
            warn!(query, error = %e, "Remote search failed, matching locally");
            Ok(filter_books(local, query).into_owned())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::model::book;

    struct MockApi {
        search: fn(&str) -> Result<Vec<BookSummary>, ApiError>,
        calls: Cell<usize>,
    }

    impl MockApi {
        fn new(search: fn(&str) -> Result<Vec<BookSummary>, ApiError>) -> Self {
            Self {
                search,
                calls: Cell::new(0),
            }
        }
    }

    impl ContentApi for MockApi {
        fn fetch_by_status(&self, _status: BookStatus) -> Result<Vec<BookSummary>, ApiError> {
            Ok(vec![])
        }

        fn fetch_by_id(&self, id: &str) -> Result<BookSummary, ApiError> {
            Err(ApiError::NotFound(id.to_string()))
        }

        fn search_by_text(&self, query: &str) -> Result<Vec<BookSummary>, ApiError> {
            self.calls.set(self.calls.get() + 1);
            (self.search)(query)
        }
    }

    fn local_books() -> Vec<BookSummary> {
        vec![
            book("1", "Atomic Habits", "James Clear"),
            book("2", "Harry Potter", "J K Rowling"),
        ]
    }

    #[test]
    fn status_listing_accepts_single_book() {
        let books = decode_books(r#"{"id": "a", "title": "Only", "author": "One"}"#).unwrap();

        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Only");
    }

    #[test]
    fn status_listing_accepts_list() {
        let books = decode_books(r#"[{"id": "a"}, {"id": "b"}]"#).unwrap();

        assert_eq!(books.len(), 2);
    }

    #[test]
    fn status_listing_rejects_garbage() {
        assert!(matches!(decode_books("not json"), Err(ApiError::Decode(_))));
    }

    #[test]
    fn single_book_must_be_an_object() {
        assert!(matches!(decode_book("[]"), Err(ApiError::InvalidResponse)));
        assert_eq!(decode_book(r#"{"id": "a"}"#).unwrap().id, "a");
    }

    #[test]
    fn search_results_are_deduplicated() {
        let books = decode_search(
            r#"[{"id": "a", "title": "First"}, {"id": "b"}, {"id": "a", "title": "Second"}]"#,
        )
        .unwrap();

        let ids: Vec<&str> = books.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(books[0].title, "First");
    }

    #[test]
    fn non_list_search_response_is_empty() {
        assert!(decode_search(r#"{"message": "nothing"}"#).unwrap().is_empty());
    }

    #[test]
    fn blank_query_skips_the_api() {
        let api = MockApi::new(|_| Ok(vec![book("x", "X", "x")]));

        let results = search_with_fallback(&api, "   ", &local_books()).unwrap();

        assert!(results.is_empty());
        assert_eq!(api.calls.get(), 0);
    }

    #[test]
    fn remote_results_win_when_available() {
        let api = MockApi::new(|_| Ok(vec![book("9", "Remote", "Server")]));

        let results = search_with_fallback(&api, "atomic", &local_books()).unwrap();

        assert_eq!(results[0].id, "9");
    }

    #[test]
    fn failed_remote_search_falls_back_to_local_matches() {
        let api = MockApi::new(|_| Err(ApiError::Server(503)));

        let results = search_with_fallback(&api, "hp", &local_books()).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "2");
    }

    #[test]
    fn failed_remote_search_without_local_books_is_an_error() {
        let api = MockApi::new(|_| Err(ApiError::Status(400)));

        assert!(matches!(
            search_with_fallback(&api, "hp", &[]),
            Err(ApiError::Status(400))
        ));
    }

    #[test]
    fn retry_gives_up_after_configured_attempts() {
        let policy = RetryPolicy {
            retries: 2,
            delay: Duration::ZERO,
        };
        let mut attempts = 0;

        let result: Result<(), ApiError> = policy.run("test", || {
            attempts += 1;
            Err(ApiError::Server(500))
        });

        assert!(matches!(result, Err(ApiError::Server(500))));
        assert_eq!(attempts, 3);
    }

    #[test]
    fn retry_stops_on_success() {
        let policy = RetryPolicy {
            retries: 3,
            delay: Duration::ZERO,
        };
        let mut attempts = 0;

        let result = policy.run("test", || {
            attempts += 1;
            if attempts < 2 {
                Err(ApiError::Server(502))
            } else {
                Ok(attempts)
            }
        });

        assert_eq!(result.unwrap(), 2);
    }

    #[test]
    fn missing_book_is_not_retried() {
        let policy = RetryPolicy {
            retries: 3,
            delay: Duration::ZERO,
        };
        let mut attempts = 0;

        let result: Result<(), ApiError> = policy.run("test", || {
            attempts += 1;
            Err(ApiError::NotFound("abc".to_string()))
        });

        assert!(matches!(result, Err(ApiError::NotFound(_))));
        assert_eq!(attempts, 1);
    }
}
