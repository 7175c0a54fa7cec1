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

//! Catalog page view state.

mod render;

use ratatui::widgets::TableState;

use crate::{
    components::{BookTable, book_table},
    model::BookSummary,
};

pub(crate) struct CatalogView {
    table_state: TableState,
}

impl CatalogView {
    pub(crate) fn new() -> Self {
        Self {
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
