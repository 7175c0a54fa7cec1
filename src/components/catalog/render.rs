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

//! UI rendering logic for the catalog view.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    prelude::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::{
    components::CatalogView,
    model::catalog::{Catalog, CatalogStatus},
    render::Render,
    theme::Theme,
};

impl CatalogView {
    pub(crate) fn draw(
        &mut self,
        f: &mut Frame,
        area: Rect,
        catalog: &Catalog,
        playing_id: Option<&str>,
        theme: &Theme,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(area);

        let header_block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(theme.border_colour))
            .padding(Padding::horizontal(1));

        let list_name = catalog
            .only()
            .map_or("All books".to_string(), |status| format!("{status} books"));

        let (status_text, status_style) = match &catalog.status {
            CatalogStatus::Idle => ("Idle".to_string(), Style::default().fg(Color::DarkGray)),
            CatalogStatus::Loading => (
                "Loading...".to_string(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            ),
            CatalogStatus::Loaded => (
                format!("{} books", catalog.books().len()),
                Style::default().fg(Color::Green),
            ),
            CatalogStatus::Failed(reason) => {
                (format!("Failed: {reason}"), Style::default().fg(Color::Red))
            }
        };

        let header = Paragraph::new(Line::from(vec![
            Span::styled(list_name, Style::default().fg(theme.accent_colour)),
            Span::raw(" | "),
            Span::styled(status_text, status_style),
        ]))
        .block(header_block);
        f.render_widget(header, chunks[0]);

        self.table(catalog.books(), playing_id)
            .draw(f, chunks[1], theme);
    }
}
