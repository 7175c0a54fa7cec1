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

//! Search page view state.
//!
//! The search page is a text field above a table of results. While the field
//! is being edited it takes every key; otherwise keys go to the results
//! table.

mod event;
mod render;

use ratatui::widgets::TableState;
use tui_input::Input;

use crate::{
    components::{BookTable, book_table},
    model::BookSummary,
};

#[derive(Debug, PartialEq)]
pub(crate) enum SearchInputAction {
    /// The query text changed to this value.
    Changed(String),
    /// Search now, skipping the debounce.
    Submit,
    None,
}

pub(crate) struct SearchView {
    pub(crate) input: Input,
    pub(crate) editing: bool,
    table_state: TableState,
}

impl SearchView {
    pub(crate) fn new() -> Self {
        Self {
            input: Input::default(),
            editing: false,
            table_state: TableState::default(),
        }
    }

    pub(crate) fn reset_selection(&mut self, len: usize) {
        book_table::reset_selection(&mut self.table_state, len);
    }

    pub(crate) fn table<'a>(
        &'a mut self,
        books: &'a [BookSummary],
        playing_id: Option<&'a str>,
    ) -> BookTable<'a> {
        BookTable::new(books, &mut self.table_state, playing_id)
    }
}
