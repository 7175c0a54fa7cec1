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

//! Domain models and core data structures.
//!
//! This module defines the central entities of the application, the book
//! summaries served by the content API, along with the search and catalog
//! state built on top of them.

pub(crate) mod catalog;
pub(crate) mod matcher;
pub(crate) mod search;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// The curated list a book summary is published under.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum BookStatus {
    Selected,
    Recommended,
    Suggested,
}

impl BookStatus {
    pub(crate) const ALL: [BookStatus; 3] = [
        BookStatus::Selected,
        BookStatus::Recommended,
        BookStatus::Suggested,
    ];

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Selected => "selected",
            BookStatus::Recommended => "recommended",
            BookStatus::Suggested => "suggested",
        }
    }

    pub(crate) fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A book summary as served by the content API.
///
/// The identifier is stable for the lifetime of a listing session. Title and
/// author are always present, possibly empty.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BookSummary {
    pub(crate) id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) author: String,
    #[serde(default, rename = "subTitle")]
    pub(crate) subtitle: Option<String>,
    #[serde(default)]
    pub(crate) audio_link: Option<String>,

    #[serde(default)]
    pub(crate) status: Option<BookStatus>,
    #[serde(default)]
    pub(crate) average_rating: Option<f64>,
    #[serde(default)]
    pub(crate) total_rating: Option<u64>,
    #[serde(default)]
    pub(crate) audio_length: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) subscription_required: bool,
    #[serde(default)]
    pub(crate) summary: Option<String>,
}

impl BookSummary {
    /// The audio reference, if it names something playable.
    pub(crate) fn sample_uri(&self) -> Option<&str> {
        self.audio_link
            .as_deref()
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
    }
}

/// Decodes `null` as the default value, the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
pub(crate) fn book(id: &str, title: &str, author: &str) -> BookSummary {
    BookSummary {
        id: id.to_string(),
        title: title.to_string(),
        author: author.to_string(),
        ..BookSummary::default()
    }
}
