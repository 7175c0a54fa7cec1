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

//! Input handling for the book table.
//!
//! Navigation keys move the selection and report the newly selected book.
//! Activating a row asks for its sample to be toggled, `l` asks to listen to
//! its full summary.

use crossterm::event::{Event, KeyCode, KeyModifiers};

use crate::components::{BookTable, BookTableAction};

impl BookTable<'_> {
    pub(crate) fn process_event(&mut self, event: &Event) -> Option<BookTableAction> {
        let Event::Key(key_event) = event else {
            return None;
        };

        let before = self.table_state.selected();

        match (key_event.code, key_event.modifiers) {
            (KeyCode::Char('j'), _) | (KeyCode::Down, _) => self.goto_next(),
            (KeyCode::Char('k'), _) | (KeyCode::Up, _) => self.goto_previous(),
            (KeyCode::Char('g'), _) => self.goto_first(),
            (KeyCode::Char('G'), _) => self.goto_last(),

            (KeyCode::Char('f'), KeyModifiers::CONTROL) => self.goto_page_forward(),
            (KeyCode::Char('b'), KeyModifiers::CONTROL) => self.goto_page_back(),

            (KeyCode::Enter, _) | (KeyCode::Char('p'), _) => {
                return self
                    .selected()
                    .map(|book| BookTableAction::ToggleSample(book.clone()));
            }

            (KeyCode::Char('l'), _) => {
                return self
                    .selected()
                    .map(|book| BookTableAction::Listen(book.clone()));
            }

            _ => return None,
        }

        if self.table_state.selected() == before {
            return None;
        }

        self.selected()
            .map(|book| BookTableAction::Select(book.clone()))
    }
}
