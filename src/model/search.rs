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

//! Search state.
//!
//! This module provides state for the search view: the query being typed,
//! the debounce timer that decides when to actually run it, and the results
//! of the most recent request.
//!
//! Requests are numbered. Results may arrive out of order from the task
//! worker, so only the results of the latest request are accepted.

use std::time::{Duration, Instant};

use crate::model::BookSummary;

/// Delays an action until input has stopped changing for a fixed interval.
pub(crate) struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Restarts the timer from `now`.
    pub(crate) fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub(crate) fn cancel(&mut self) {
        self.deadline = None;
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true exactly once per burst of input, when the delay has
    /// elapsed since the last touch.
    pub(crate) fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SearchRequest {
    pub(crate) generation: u64,
    pub(crate) query: String,
}

pub(crate) struct Search {
    query: String,
    debouncer: Debouncer,
    issued: u64,
    results: Vec<BookSummary>,
}

impl Search {
    pub(crate) fn new(debounce: Duration) -> Self {
        Self {
            query: String::new(),
            debouncer: Debouncer::new(debounce),
            issued: 0,
            results: vec![],
        }
    }

    pub(crate) fn query(&self) -> &str {
        &self.query
    }

    /// Records an edit of the query text. Does nothing if the text is
    /// unchanged, so cursor movement does not restart the timer.
    pub(crate) fn set_query(&mut self, query: &str, now: Instant) {
        if self.query != query {
            self.query = query.to_string();
            self.debouncer.touch(now);
        }
    }

    /// Issues a request for the current query immediately.
    pub(crate) fn submit(&mut self) -> SearchRequest {
        self.debouncer.cancel();
        self.next_request()
    }

    /// Issues a request if the debounce delay has elapsed.
    pub(crate) fn poll(&mut self, now: Instant) -> Option<SearchRequest> {
        if self.debouncer.fire(now) {
            Some(self.next_request())
        } else {
            None
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Stores `results` if they answer the latest request. Returns false for
    /// results of a superseded request, which are dropped.
    pub(crate) fn accept(&mut self, generation: u64, results: Vec<BookSummary>) -> bool {
        if generation != self.issued {
            return false;
        }
        self.results = results;
        true
    }

    /// Records that the search with `generation` failed. The previous
    /// query's results no longer apply, so they are cleared. Returns false
    /// if a newer search has been issued since.
    pub(crate) fn fail(&mut self, generation: u64) -> bool {
        self.accept(generation, vec![])
    }

    pub(crate) fn results(&self) -> &[BookSummary] {
        &self.results
    }

    fn next_request(&mut self) -> SearchRequest {
        self.issued += 1;
        SearchRequest {
            generation: self.issued,
            query: self.query.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::book;

    const DELAY: Duration = Duration::from_millis(300);

    #[test]
    fn debouncer_fires_once_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);

        debouncer.touch(start);
        assert!(!debouncer.fire(start + Duration::from_millis(299)));
        assert!(debouncer.fire(start + DELAY));
        assert!(!debouncer.fire(start + Duration::from_secs(5)));
    }

    #[test]
    fn each_keystroke_restarts_the_timer() {
        let start = Instant::now();
        let mut search = Search::new(DELAY);

        search.set_query("a", start);
        search.set_query("at", start + Duration::from_millis(200));

        assert_eq!(search.poll(start + Duration::from_millis(400)), None);

        let request = search.poll(start + Duration::from_millis(500)).unwrap();
        assert_eq!(request.query, "at");
        assert!(!search.is_pending());
    }

    #[test]
    fn unchanged_text_does_not_restart_the_timer() {
        let start = Instant::now();
        let mut search = Search::new(DELAY);

        search.set_query("atomic", start);
        search.set_query("atomic", start + Duration::from_millis(250));

        assert!(search.poll(start + DELAY).is_some());
    }

    #[test]
    fn stale_results_are_dropped() {
        let start = Instant::now();
        let mut search = Search::new(DELAY);

        search.set_query("deep", start);
        let first = search.submit();
        search.set_query("deep work", start);
        let second = search.submit();

        assert!(search.accept(second.generation, vec![book("2", "Deep Work", "Cal Newport")]));
        assert!(!search.accept(first.generation, vec![book("1", "Deep", "x")]));
        assert_eq!(search.results()[0].id, "2");
    }

    #[test]
    fn failed_search_clears_previous_results() {
        let start = Instant::now();
        let mut search = Search::new(DELAY);

        search.set_query("atomic", start);
        let first = search.submit();
        assert!(search.accept(first.generation, vec![book("1", "Atomic Habits", "James Clear")]));

        search.set_query("harry", start);
        let second = search.submit();
        assert!(!search.fail(first.generation));
        assert_eq!(search.results().len(), 1);

        assert!(search.fail(second.generation));
        assert!(search.results().is_empty());
    }

    #[test]
    fn requests_carry_trimmed_query() {
        let mut search = Search::new(DELAY);
        search.set_query("  habits ", Instant::now());

        assert_eq!(search.submit().query, "habits");
        assert_eq!(search.query(), "  habits ");
    }
}
