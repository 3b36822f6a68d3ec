use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, List, ListItem, Paragraph, Widget, Wrap},
};

use crate::models::{AdminStats, ContactQuery, ContactStatus, Feedback};

fn panel_block(title: &str, is_selected: bool) -> Block<'_> {
    let border_style = if is_selected {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Gray)
    };

    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style)
}

fn line_style(highlighted: bool) -> Style {
    if highlighted {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

pub fn render_header(area: Rect, buf: &mut Buffer, admin_name: &str) {
    let line = Line::from(vec![
        Span::styled(
            " 🏋 Admin Dashboard ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" Welcome back, {admin_name} "),
            Style::default().fg(Color::Gray),
        ),
    ]);

    Paragraph::new(line).render(area, buf);
}

/// Render the counts as a bar chart
pub fn render_stats(
    area: Rect,
    buf: &mut Buffer,
    stats: &AdminStats,
    selected_index: usize,
    is_selected: bool,
) {
    let block = panel_block(" 📊 Overview ", is_selected);
    let inner = block.inner(area);
    block.render(area, buf);

    let colors = [
        Color::Green,
        Color::Yellow,
        Color::Magenta,
        Color::Cyan,
        Color::Blue,
    ];

    let bars: Vec<Bar> = stats
        .entries()
        .iter()
        .zip(colors)
        .enumerate()
        .map(|(idx, ((label, value), color))| {
            let style = if is_selected && idx == selected_index {
                Style::default().fg(color).add_modifier(Modifier::REVERSED)
            } else {
                Style::default().fg(color)
            };

            Bar::default()
                .label(Line::from(*label))
                .value(*value)
                .style(style)
                .value_style(Style::default().fg(Color::Black).bg(color))
        })
        .collect();

    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(11)
        .bar_gap(2);

    chart.render(inner, buf);
}

pub fn render_recent_feedbacks(
    area: Rect,
    buf: &mut Buffer,
    feedbacks: &[Feedback],
    selected_index: usize,
    is_selected: bool,
) {
    let block = panel_block(" 💬 Recent Feedbacks ", is_selected);
    let inner = block.inner(area);
    block.render(area, buf);

    if feedbacks.is_empty() {
        Paragraph::new("No feedback yet.")
            .style(Style::default().fg(Color::Gray))
            .render(inner, buf);
        return;
    }

    let width = usize::from(inner.width);
    let items: Vec<ListItem> = feedbacks
        .iter()
        .enumerate()
        .map(|(idx, feedback)| {
            let author = feedback
                .user
                .as_ref()
                .map(|u| u.display_name().to_string())
                .unwrap_or_else(|| "Anonymous".to_string());

            let header = Line::from(vec![
                Span::styled(feedback.stars(), Style::default().fg(Color::Yellow)),
                Span::raw(" "),
                Span::styled(author, line_style(is_selected && idx == selected_index)),
            ]);
            let body = Line::from(Span::styled(
                format!("  {}", truncate(&feedback.message, width.saturating_sub(2))),
                Style::default().fg(Color::Gray),
            ));

            ListItem::new(vec![header, body])
        })
        .collect();

    List::new(items).render(inner, buf);
}

pub fn render_recent_queries(
    area: Rect,
    buf: &mut Buffer,
    queries: &[ContactQuery],
    selected_index: usize,
    is_selected: bool,
) {
    let block = panel_block(" ✉ Recent Queries ", is_selected);
    let inner = block.inner(area);
    block.render(area, buf);

    if queries.is_empty() {
        Paragraph::new("No contact queries.")
            .style(Style::default().fg(Color::Gray))
            .render(inner, buf);
        return;
    }

    let width = usize::from(inner.width);
    let items: Vec<ListItem> = queries
        .iter()
        .enumerate()
        .map(|(idx, query)| {
            let status_color = match query.status {
                ContactStatus::Pending => Color::Yellow,
                ContactStatus::Resolved => Color::Green,
                ContactStatus::Unknown => Color::DarkGray,
            };

            let header = Line::from(vec![
                Span::styled(
                    format!("[{}] ", query.status),
                    Style::default().fg(status_color),
                ),
                Span::styled(
                    format!("{} <{}>", query.name, query.email),
                    line_style(is_selected && idx == selected_index),
                ),
            ]);
            let body = Line::from(Span::styled(
                format!("  {}", truncate(&query.message, width.saturating_sub(2))),
                Style::default().fg(Color::Gray),
            ));

            ListItem::new(vec![header, body])
        })
        .collect();

    List::new(items).render(inner, buf);
}

/// Render help overlay
pub fn render_help_overlay(area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" ❓ Help ")
        .border_style(Style::default().fg(Color::Cyan))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(area);
    block.render(area, buf);

    let help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("Navigation:", Style::default().fg(Color::Cyan))),
        Line::from("  ↑/k       - Move up"),
        Line::from("  ↓/j       - Move down"),
        Line::from("  ←/h       - Previous panel"),
        Line::from("  →/l       - Next panel"),
        Line::from("  Tab       - Next panel"),
        Line::from("  Shift+Tab - Previous panel"),
        Line::from(""),
        Line::from(Span::styled("Other:", Style::default().fg(Color::Cyan))),
        Line::from("  r         - Refresh data"),
        Line::from("  ?         - Toggle this help"),
        Line::from("  q/Esc     - Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "Press ? or ESC to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    Paragraph::new(help_text)
        .wrap(Wrap { trim: false })
        .render(inner, buf);
}

/// Render status bar at bottom
pub fn render_status_bar(area: Rect, buf: &mut Buffer, failed: &[String], notice: Option<&str>) {
    let status = match (failed.is_empty(), notice) {
        (true, None) => Span::styled(
            " ✓ All counts loaded ",
            Style::default().fg(Color::Green).bg(Color::DarkGray),
        ),
        (true, Some(notice)) => Span::styled(
            format!(" ✗ {notice} "),
            Style::default().fg(Color::Red).bg(Color::DarkGray),
        ),
        (false, _) => Span::styled(
            format!(" ⚠ Failed: {} ", failed.join(", ")),
            Style::default().fg(Color::Yellow).bg(Color::DarkGray),
        ),
    };

    let help_hint = Span::styled(
        " r refresh · ? help · q quit ",
        Style::default().fg(Color::Gray).bg(Color::DarkGray),
    );

    Paragraph::new(Line::from(vec![status, help_hint])).render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer message", 6), "a lon…");
    }

    #[test]
    fn test_status_bar_lists_failures() {
        let area = Rect::new(0, 0, 80, 1);
        let mut buf = Buffer::empty(area);
        render_status_bar(area, &mut buf, &["plans".to_string()], None);

        let text: String = (0..area.width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect();
        assert!(text.contains("Failed: plans"));
    }
}
