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

//! UI rendering logic for the search page.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::{
    components::SearchView,
    model::{BookSummary, search::Search},
    render::Render,
    theme::Theme,
};

const PLACEHOLDER: &str = "Search for books by title or author";

impl SearchView {
    pub(crate) fn draw(
        &mut self,
        f: &mut Frame,
        area: Rect,
        search: &Search,
        playing_id: Option<&str>,
        theme: &Theme,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let border_colour = if self.editing {
            theme.accent_colour
        } else {
            theme.border_colour
        };

        let title = if search.is_pending() {
            " Search (typing...) "
        } else {
            " Search "
        };

        let field_block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_colour))
            .padding(Padding::horizontal(1));

        let field = if self.input.value().is_empty() && !self.editing {
            Paragraph::new(PLACEHOLDER).style(Style::default().fg(theme.border_colour))
        } else {
            Paragraph::new(self.input.value())
        };

        let field_area = chunks[0];
        f.render_widget(field.block(field_block), field_area);

        if self.editing {
            // Border plus padding on the left.
            let cursor_x = field_area.x + 2 + self.input.visual_cursor() as u16;
            f.set_cursor_position((cursor_x, field_area.y + 1));
        }

        draw_results(self, f, chunks[1], search.results(), playing_id, theme);
    }
}

fn draw_results(
    view: &mut SearchView,
    f: &mut Frame,
    area: Rect,
    results: &[BookSummary],
    playing_id: Option<&str>,
    theme: &Theme,
) {
    if results.is_empty() {
        let empty = Paragraph::new("No books found")
            .style(Style::default().fg(theme.border_colour))
            .block(Block::default().padding(Padding::horizontal(1)));
        f.render_widget(empty, area);
        return;
    }

    view.table(results, playing_id).draw(f, area, theme);
}
