//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Bar as ChartBar, BarChart, BarGroup, Block, Borders, List, ListItem, Padding, Paragraph, Wrap},
};
use std::{rc::Rc, time::Duration};

use crate::catalog::Track;
use crate::player::TransportState;
use crate::visualizer::Bar;

/// Everything one frame needs; assembled by the event loop each tick.
pub struct View<'a> {
    pub bars: &'a [Bar],
    pub playlist: &'a [Track],
    /// Index of the staged/playing track, if any.
    pub playing: Option<usize>,
    /// Cursor position in the list, moved independently of playback.
    pub selected: usize,
    pub state: TransportState,
    pub position: Duration,
    pub duration: Option<Duration>,
    pub random: bool,
    pub autoplay: bool,
    pub can_replay: bool,
    pub volume: f32,
    pub list_title: &'a str,
    /// Live search input when search mode is active.
    pub search_input: Option<&'a str>,
    pub notice: Option<&'a str>,
}

/// Vertical screen layout: bar strip, status, track list, footer.
/// Shared with the event loop so mouse clicks map onto the same rectangles
/// the renderer used.
pub fn screen_chunks(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(10),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(area)
}

/// The drawable region inside the bar strip's border.
pub fn bar_strip_inner(strip: Rect) -> Rect {
    Rect {
        x: strip.x + 1,
        y: strip.y + 1,
        width: strip.width.saturating_sub(2),
        height: strip.height.saturating_sub(2),
    }
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn time_text(position: Duration, duration: Option<Duration>) -> String {
    match duration {
        Some(total) => format!("{} / {}", format_mmss(position), format_mmss(total)),
        None => format!("{} / --:--", format_mmss(position)),
    }
}

fn state_glyph(state: TransportState) -> &'static str {
    match state {
        TransportState::Empty => "·",
        TransportState::Stopped => "■",
        TransportState::Playing => "▶",
        TransportState::Paused => "⏸",
        TransportState::Ended => "↻",
    }
}

fn controls_text() -> &'static str {
    "[j/k] up/down | [enter] play selected | [space/p] play/pause | [h/l] prev/next \
     | [r] random | [a] autoplay | [-/+] volume | [/] search | [click bars] seek | [q] quit"
}

fn draw_bars(frame: &mut Frame, area: Rect, view: &View) {
    let inner = bar_strip_inner(area);
    let count = view.bars.len().max(1) as u16;
    let bar_width = (inner.width / count).max(1);

    let chart_bars: Vec<ChartBar> = view
        .bars
        .iter()
        .map(|b| {
            let style = if b.played {
                Style::default().fg(Color::Magenta)
            } else {
                Style::default().fg(Color::Cyan)
            };
            ChartBar::default()
                .value(b.height.round() as u64)
                .style(style)
                .text_value(String::new())
        })
        .collect();

    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(" vivace "))
        .data(BarGroup::default().bars(&chart_bars))
        .bar_width(bar_width)
        .bar_gap(0)
        // Bar heights cap at 127.5 (mean byte magnitude halved).
        .max(128);
    frame.render_widget(chart, area);
}

fn draw_status(frame: &mut Frame, area: Rect, view: &View) {
    let mut parts: Vec<String> = Vec::new();
    parts.push(state_glyph(view.state).to_string());

    if let Some(index) = view.playing {
        if let Some(track) = view.playlist.get(index) {
            let (artist, name) = track.artist_and_name();
            parts.push(format!(
                "{name} by {artist} [{}]",
                time_text(view.position, view.duration)
            ));
        }
    }
    if view.can_replay && !view.autoplay {
        parts.push("press space to replay".to_string());
    }

    parts.push(format!("Random: {}", if view.random { "ON" } else { "OFF" }));
    parts.push(format!("Autoplay: {}", if view.autoplay { "ON" } else { "OFF" }));
    parts.push(format!("Vol: {:.0}%", view.volume * 100.0));

    if let Some(notice) = view.notice {
        parts.push(notice.to_string());
    }

    let status = Paragraph::new(parts.join(" • "))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status, area);
}

fn draw_playlist(frame: &mut Frame, area: Rect, view: &View) {
    // Center the selected item when possible by creating a visible window.
    // Only build ListItems for the visible window.
    let total = view.playlist.len();
    let list_height = area.height.saturating_sub(2) as usize;
    let sel_pos = view.selected.min(total.saturating_sub(1));
    let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
        (0, total, sel_pos)
    } else {
        let half = list_height / 2;
        let mut start = if sel_pos > half { sel_pos - half } else { 0 };
        if start + list_height > total {
            start = total - list_height;
        }
        (start, start + list_height, sel_pos - start)
    };

    let visible_items: Vec<ListItem> = view.playlist[start..end]
        .iter()
        .enumerate()
        .map(|(offset, track)| {
            let index = start + offset;
            let marker = if view.playing == Some(index) { "♪ " } else { "  " };
            ListItem::new(format!("{marker}{}", track.title))
        })
        .collect();

    let title = format!(" {} ", view.list_title);
    let list = List::new(visible_items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ratatui::widgets::ListState::default();
    if total > 0 {
        state.select(Some(selected_pos_in_visible));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_footer(frame: &mut Frame, area: Rect, view: &View) {
    let (title, text) = match view.search_input {
        Some(input) => (" search ", format!("/{input}█")),
        None => (" controls ", controls_text().to_string()),
    };
    let footer = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, area);
}

/// Render the entire UI into the provided `frame`.
pub fn draw(frame: &mut Frame, view: &View) {
    let chunks = screen_chunks(frame.area());
    draw_bars(frame, chunks[0], view);
    draw_status(frame, chunks[1], view);
    draw_playlist(frame, chunks[2], view);
    draw_footer(frame, chunks[3], view);
}
