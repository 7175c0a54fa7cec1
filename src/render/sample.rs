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

//! Render the playback panel.
//!
//! The panel shows the sample that is playing, with its elapsed time, the
//! summary open in the summary player, with its position, and the details
//! of the most recently selected book.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Padding, Paragraph},
};

use crate::{
    App,
    model::BookSummary,
    player::TrackState,
    render::icons::{ICON_PAUSE, ICON_PLAY, ICON_PREMIUM, ICON_RATING, ICON_STOP},
    util::format::{format_duration, format_rating},
};

pub(crate) fn draw_sample_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::TOP | Borders::BOTTOM)
        .border_style(Style::default().fg(app.theme.border_colour))
        .padding(Padding::horizontal(1));

    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner_area);

    draw_now_playing(f, chunks[0], app);
    draw_progress(f, chunks[1], app);
    draw_summary_player(f, chunks[2], app);

    if let Some(book) = &app.details {
        draw_details(f, chunks[3], chunks[4], book, app);
    }
}

fn draw_now_playing(f: &mut Frame, area: Rect, app: &App) {
    let info_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(20)])
        .split(area);

    let Some(id) = app.sampler.playing_id() else {
        let idle = Line::from(vec![
            Span::styled(format!(" {ICON_STOP} "), Style::default().add_modifier(Modifier::BOLD)).fg(Color::White),
            Span::raw("No sample playing"),
        ]);
        f.render_widget(Paragraph::new(idle).fg(app.theme.border_colour), info_chunks[0]);
        return;
    };

    let book = find_book(app, id);
    let title = book.map_or(id, |book| book.title.as_str());
    let author = book.map_or("", |book| book.author.as_str());

    let mut spans = vec![
        Span::styled(format!(" {ICON_PLAY} "), Style::default().add_modifier(Modifier::BOLD)).fg(Color::White),
        Span::styled(title, Style::default().add_modifier(Modifier::BOLD)).fg(app.theme.accent_colour),
    ];
    if !author.is_empty() {
        spans.push(Span::raw(" by "));
        spans.push(Span::styled(author, Style::default().add_modifier(Modifier::BOLD)).fg(app.theme.accent_colour));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), info_chunks[0]);

    let elapsed = app.sampler.elapsed().unwrap_or_default().as_secs();
    let time = match app.config.preview_limit() {
        Some(limit) => format!("{} / {}", format_duration(elapsed), format_duration(limit.as_secs())),
        None => format_duration(elapsed),
    };
    let time_p = Paragraph::new(time)
        .alignment(Alignment::Right)
        .fg(app.theme.accent_colour);
    f.render_widget(time_p, info_chunks[1]);
}

fn draw_summary_player(f: &mut Frame, area: Rect, app: &App) {
    let Some(track) = app.listener.track() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(24), Constraint::Length(20)])
        .split(area);

    let (icon, state) = match track.state {
        TrackState::Loading => (ICON_PAUSE, " (loading)"),
        TrackState::Playing => (ICON_PLAY, ""),
        TrackState::Paused => (ICON_PAUSE, ""),
        TrackState::Finished => (ICON_STOP, " (finished)"),
    };

    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().add_modifier(Modifier::BOLD)).fg(Color::White),
        Span::styled(track.title.as_str(), Style::default().add_modifier(Modifier::BOLD)).fg(app.theme.accent_colour),
        Span::raw(state),
    ]);
    f.render_widget(Paragraph::new(line), chunks[0]);

    let Some(duration) = track.duration.filter(|d| !d.is_zero()) else {
        let time = Paragraph::new(format_duration(track.position.as_secs()))
            .alignment(Alignment::Right)
            .fg(app.theme.accent_colour);
        f.render_widget(time, chunks[2]);
        return;
    };

    let ratio = (track.position.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .gauge_style(Style::default()
            .fg(app.theme.accent_colour)
            .bg(app.theme.gauge_track_colour)
        )
        .ratio(ratio)
        .label("")
        .use_unicode(true);
    f.render_widget(gauge, chunks[1]);

    let time = format!(
        "{} / {}",
        format_duration(track.position.as_secs()),
        format_duration(duration.as_secs())
    );
    let time_p = Paragraph::new(time)
        .alignment(Alignment::Right)
        .fg(app.theme.accent_colour);
    f.render_widget(time_p, chunks[2]);
}

fn draw_details(f: &mut Frame, title_area: Rect, summary_area: Rect, book: &BookSummary, app: &App) {
    let mut spans = vec![Span::styled(book.title.as_str(), Style::default().add_modifier(Modifier::BOLD)).fg(Color::White)];

    if let Some(subtitle) = book.subtitle.as_deref().filter(|s| !s.is_empty()) {
        spans.push(Span::raw(": "));
        spans.push(Span::raw(subtitle));
    }

    if let Some(rating) = book.average_rating {
        let votes = book.total_rating.map(|n| format!(" ({n})")).unwrap_or_default();
        spans.push(Span::styled(
            format!("  {ICON_RATING} {}{votes}", format_rating(rating)),
            Style::default().fg(app.theme.table_rating_fg),
        ));
    }

    if book.subscription_required {
        spans.push(Span::styled(format!("  {ICON_PREMIUM} Premium"), Style::default().fg(app.theme.accent_colour)));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), title_area);

    if let Some(summary) = book.summary.as_deref() {
        let summary = Paragraph::new(summary).fg(app.theme.table_length_fg);
        f.render_widget(summary, summary_area);
    }
}

fn draw_progress(f: &mut Frame, area: Rect, app: &App) {
    let (Some(limit), Some(elapsed)) = (app.config.preview_limit(), app.sampler.elapsed()) else {
        return;
    };

    let ratio = if limit.is_zero() {
        0.0
    } else {
        (elapsed.as_secs_f64() / limit.as_secs_f64()).clamp(0.0, 1.0)
    };

    let gauge = Gauge::default()
        .gauge_style(Style::default()
            .fg(app.theme.accent_colour)
            .bg(app.theme.gauge_track_colour)
        )
        .ratio(ratio)
        .label("")
        .use_unicode(true);

    f.render_widget(gauge, area);
}

fn find_book<'a>(app: &'a App, id: &str) -> Option<&'a BookSummary> {
    app.catalog
        .find(id)
        .or_else(|| app.search.results().iter().find(|b| b.id == id))
        .or_else(|| app.details.as_ref().filter(|b| b.id == id))
}
