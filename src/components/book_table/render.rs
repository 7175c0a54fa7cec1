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

//! UI rendering logic for the book table.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Rect},
    style::{Style, Stylize},
    text::Line,
    widgets::{Block, Cell, Row, Table},
};

use crate::{
    components::BookTable,
    render::{
        Render,
        icons::{ICON_PLAY, ICON_PREMIUM},
    },
    theme::Theme,
    util::format::{format_duration, format_rating},
};

impl Render for BookTable<'_> {
    fn draw(&mut self, f: &mut Frame, area: Rect, theme: &Theme) {
        let rows = self.books.iter().map(|book| {
            let marker = if self.is_playing(book) {
                Line::from(ICON_PLAY).style(Style::default().fg(theme.accent_colour))
            } else {
                Line::from("")
            };

            let length = book
                .audio_length
                .map(format_duration)
                .unwrap_or_default();

            let rating = book.average_rating.map(format_rating).unwrap_or_default();

            let premium = if book.subscription_required {
                ICON_PREMIUM
            } else {
                ""
            };

            Row::new(vec![
                Cell::from(marker),
                Cell::from(Line::from(book.title.as_str()).style(Style::default().fg(theme.table_title_fg))),
                Cell::from(Line::from(book.author.as_str()).style(Style::default().fg(theme.table_author_fg))),
                Cell::from(Line::from(length).style(Style::default().fg(theme.table_length_fg)).alignment(Alignment::Right)),
                Cell::from(Line::from(rating).style(Style::default().fg(theme.table_rating_fg)).alignment(Alignment::Right)),
                Cell::from(Line::from(premium).style(Style::default().fg(theme.accent_colour))),
            ])
        });

        let table = Table::new(
            rows,
            [
                Constraint::Length(2),
                Constraint::Percentage(55),
                Constraint::Percentage(30),
                Constraint::Length(8),
                Constraint::Length(6),
                Constraint::Length(2),
            ],
        )
        .header(
            Row::new(vec![
                Cell::from(""),
                Cell::from("Title"),
                Cell::from("Author"),
                Cell::from(Line::from("Length").alignment(Alignment::Right)),
                Cell::from(Line::from("Rating").alignment(Alignment::Right)),
                Cell::from(""),
            ])
            .style(Style::default().bold().fg(theme.accent_colour))
            .bottom_margin(1),
        )
        .row_highlight_style(Style::default().bg(theme.highlight_bg).fg(theme.highlight_fg))
        .block(Block::default());

        f.render_stateful_widget(table, area, &mut *self.table_state);
    }
}
