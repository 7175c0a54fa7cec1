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

//! Event routing for the search text field.

use crossterm::event::{Event, KeyCode};
use tui_input::backend::crossterm::EventHandler;

use crate::components::{SearchInputAction, SearchView};

impl SearchView {
    /// Applies a key to the query text while editing.
    ///
    /// `Esc` leaves the field and hands keys back to the results table,
    /// `Enter` does the same and asks for an immediate search.
    pub(crate) fn process_input(&mut self, event: &Event) -> SearchInputAction {
        let Event::Key(key_event) = event else {
            return SearchInputAction::None;
        };

        match key_event.code {
            KeyCode::Esc => {
                self.editing = false;
                SearchInputAction::None
            }

            KeyCode::Enter => {
                self.editing = false;
                SearchInputAction::Submit
            }

            _ => {
                let before = self.input.value().to_string();
                self.input.handle_event(event);

                if self.input.value() == before {
                    SearchInputAction::None
                } else {
                    SearchInputAction::Changed(self.input.value().to_string())
                }
            }
        }
    }
}
