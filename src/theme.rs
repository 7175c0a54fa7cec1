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

//! Visual styling and color configuration for the TUI.
//!
//! This module defines the application's color palette. Every widget takes
//! its colours from a [`Theme`] rather than naming colours directly.

use ratatui::style::Color;

#[derive(Clone, Copy)]
pub(crate) struct Theme {
    pub(crate) background_colour: Color,
    pub(crate) accent_colour: Color,
    pub(crate) border_colour: Color,
    pub(crate) gauge_track_colour: Color,
    pub(crate) commander_colour: Color,
    pub(crate) status_colour: Color,

    pub(crate) highlight_fg: Color,
    pub(crate) highlight_bg: Color,

    pub(crate) table_title_fg: Color,
    pub(crate) table_author_fg: Color,
    pub(crate) table_length_fg: Color,
    pub(crate) table_rating_fg: Color,
}

impl Default for Theme {
    // Returns the standard application theme.
    fn default() -> Self {
        Self::default_theme()
    }
}

impl Theme {
    // Constructs the default theme.
    pub(crate) const fn default_theme() -> Self {
        Self {
            background_colour: Color::Rgb(3, 40, 55),
            accent_colour: Color::Rgb(32, 186, 104),
            border_colour: Color::Rgb(102, 102, 102),
            gauge_track_colour: Color::Rgb(20, 60, 75),
            commander_colour: Color::Rgb(255, 255, 255),
            status_colour: Color::Rgb(250, 189, 47),

            highlight_fg: Color::White,
            highlight_bg: Color::Rgb(33, 100, 160),

            table_title_fg: Color::Rgb(255, 255, 255),
            table_author_fg: Color::Rgb(179, 157, 219),
            table_length_fg: Color::Rgb(162, 161, 166),
            table_rating_fg: Color::Rgb(255, 215, 0),
        }
    }
}
