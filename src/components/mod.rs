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

//! Interactive UI components.
//!
//! Each component owns its view state (selection, text input) and handles
//! its own key events. Book data is borrowed from the model at the point of
//! use, so the views never hold a stale copy.

mod book_table;
mod catalog;
mod search;

pub(crate) use book_table::{BookTable, BookTableAction};
pub(crate) use catalog::CatalogView;
pub(crate) use search::{SearchInputAction, SearchView};
