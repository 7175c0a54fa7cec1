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

use std::time::Duration;

/// Formats a duration in seconds as `M:SS`, or `H:MM:SS` from one hour up.
///
/// Used for book audio lengths and the elapsed time of the playing sample.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(format_duration(65), "1:05");
/// assert_eq!(format_duration(3725), "1:02:05");
/// ```
pub(crate) fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let mins = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{hours}:{mins:02}:{secs:02}")
    } else {
        format!("{mins}:{secs:02}")
    }
}

/// Parses a position typed as seconds, `M:SS` or `H:MM:SS`.
///
/// ```ignore
/// assert_eq!(parse_duration("1:30"), Some(Duration::from_secs(90)));
/// ```
pub(crate) fn parse_duration(text: &str) -> Option<Duration> {
    let mut total: u64 = 0;
    let mut fields = 0;

    for field in text.trim().split(':') {
        let value: u64 = field.parse().ok()?;
        if fields > 0 && value >= 60 {
            return None;
        }
        total = total.checked_mul(60)?.checked_add(value)?;
        fields += 1;
    }

    (fields <= 3).then_some(Duration::from_secs(total))
}

/// Formats an average rating to one decimal place.
pub(crate) fn format_rating(rating: f64) -> String {
    format!("{rating:.1}")
}
