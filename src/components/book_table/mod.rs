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

//! A table of book summaries.
//!
//! Every row is a tile that can request its book's sample. The table shows
//! the "now playing" marker on the row whose identifier is the sample
//! controller's playing id, so at most one row is ever marked.

mod event;
mod render;

use ratatui::widgets::TableState;

use crate::model::BookSummary;

const PAGE_SIZE: usize = 10;

#[derive(Debug, PartialEq)]
pub(crate) enum BookTableAction {
    /// The selection moved to this book.
    Select(BookSummary),
    /// Play this book's sample, or stop it if it is playing.
    ToggleSample(BookSummary),
    /// Open this book's full summary in the summary player.
    Listen(BookSummary),
}

pub(crate) struct BookTable<'a> {
    books: &'a [BookSummary],
    table_state: &'a mut TableState,
    playing_id: Option<&'a str>,
}

impl<'a> BookTable<'a> {
    pub(crate) fn new(
        books: &'a [BookSummary],
        table_state: &'a mut TableState,
        playing_id: Option<&'a str>,
    ) -> Self {
        Self {
            books,
            table_state,
            playing_id,
        }
    }

    pub(crate) fn selected(&self) -> Option<&'a BookSummary> {
        self.table_state.selected().and_then(|i| self.books.get(i))
    }

    fn is_playing(&self, book: &BookSummary) -> bool {
        self.playing_id == Some(book.id.as_str())
    }

    fn goto_next(&mut self) {
        let len = self.books.len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => if i >= len - 1 { 0 } else { i + 1 },
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    fn goto_previous(&mut self) {
        let len = self.books.len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => if i == 0 { len - 1 } else { i - 1 },
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    fn goto_first(&mut self) {
        if !self.books.is_empty() {
            self.table_state.select(Some(0));
        }
    }

    fn goto_last(&mut self) {
        if !self.books.is_empty() {
            self.table_state.select(Some(self.books.len() - 1));
        }
    }

    fn goto_page_forward(&mut self) {
        if self.books.is_empty() {
            return;
        }
        let i = self.table_state.selected().unwrap_or(0) + PAGE_SIZE;
        self.table_state.select(Some(i.min(self.books.len() - 1)));
    }

    fn goto_page_back(&mut self) {
        if self.books.is_empty() {
            return;
        }
        let i = self.table_state.selected().unwrap_or(0).saturating_sub(PAGE_SIZE);
        self.table_state.select(Some(i));
    }
}

/// Points the selection at the first row, or nowhere if there are no rows.
pub(crate) fn reset_selection(table_state: &mut TableState, len: usize) {
    let selection = if len == 0 { None } else { Some(0) };
    table_state.select(selection);
    *table_state.offset_mut() = 0;
}

#[cfg(test)]
mod tests {
    use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

    use super::*;
    use crate::model::book;

    fn books() -> Vec<BookSummary> {
        (0..25)
            .map(|i| book(&format!("b{i}"), &format!("Book {i}"), "Author"))
            .collect()
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn navigation_wraps_around() {
        let books = books();
        let mut state = TableState::default();
        let mut table = BookTable::new(&books, &mut state, None);

        table.goto_previous();
        assert_eq!(table.selected().map(|b| b.id.as_str()), Some("b0"));

        table.goto_previous();
        assert_eq!(table.selected().map(|b| b.id.as_str()), Some("b24"));

        table.goto_next();
        assert_eq!(table.selected().map(|b| b.id.as_str()), Some("b0"));
    }

    #[test]
    fn paging_stops_at_the_ends() {
        let books = books();
        let mut state = TableState::default();
        let mut table = BookTable::new(&books, &mut state, None);

        table.goto_page_forward();
        table.goto_page_forward();
        table.goto_page_forward();
        assert_eq!(table.selected().map(|b| b.id.as_str()), Some("b24"));

        table.goto_first();
        table.goto_page_back();
        assert_eq!(table.selected().map(|b| b.id.as_str()), Some("b0"));
    }

    #[test]
    fn empty_table_has_no_selection() {
        let mut state = TableState::default();
        let mut table = BookTable::new(&[], &mut state, None);

        table.goto_next();
        table.goto_last();
        table.goto_page_forward();

        assert!(table.selected().is_none());
        assert_eq!(table.process_event(&key(KeyCode::Enter)), None);
    }

    #[test]
    fn only_the_playing_row_is_marked() {
        let books = books();
        let mut state = TableState::default();
        let table = BookTable::new(&books, &mut state, Some("b3"));

        let marked: Vec<&str> = books
            .iter()
            .filter(|b| table.is_playing(b))
            .map(|b| b.id.as_str())
            .collect();
        assert_eq!(marked, ["b3"]);
    }

    #[test]
    fn enter_toggles_selected_sample() {
        let books = books();
        let mut state = TableState::default();
        let mut table = BookTable::new(&books, &mut state, None);

        assert_eq!(
            table.process_event(&key(KeyCode::Down)),
            Some(BookTableAction::Select(books[0].clone()))
        );
        assert_eq!(
            table.process_event(&key(KeyCode::Enter)),
            Some(BookTableAction::ToggleSample(books[0].clone()))
        );
    }

    #[test]
    fn l_listens_to_selected_book() {
        let books = books();
        let mut state = TableState::default();
        let mut table = BookTable::new(&books, &mut state, None);

        assert_eq!(table.process_event(&key(KeyCode::Char('l'))), None);

        table.process_event(&key(KeyCode::Char('G')));
        assert_eq!(
            table.process_event(&key(KeyCode::Char('l'))),
            Some(BookTableAction::Listen(books[24].clone()))
        );
    }

    #[test]
    fn reset_selection_points_at_first_row() {
        let mut state = TableState::default();
        state.select(Some(7));

        reset_selection(&mut state, 3);
        assert_eq!(state.selected(), Some(0));

        reset_selection(&mut state, 0);
        assert_eq!(state.selected(), None);
    }
}
