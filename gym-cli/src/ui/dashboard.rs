use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

use super::app::{App, DashboardData, Panel};
use super::widgets;
use crate::api::ApiClient;
use crate::notify::MemoryNotifier;

/// Dashboard manages the TUI lifecycle
pub struct Dashboard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    app: App,
}

impl Dashboard {
    /// Take over the terminal
    pub fn new(app: App) -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
            .context("Failed to setup terminal")?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).context("Failed to create terminal")?;

        Ok(Self { terminal, app })
    }

    /// Run the event loop. `api` must report through `notices` so toasts land
    /// in the status bar instead of on the alternate screen.
    pub async fn run(&mut self, api: &ApiClient, notices: &MemoryNotifier) -> Result<()> {
        loop {
            let app = &self.app;
            self.terminal.draw(|f| ui(f, app))?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == event::KeyEventKind::Press {
                        self.app.handle_key(key.code)?;
                    }
                }
            }

            if self.app.refresh_requested {
                self.app.refresh_requested = false;
                tracing::debug!("Refreshing dashboard");

                let data = DashboardData::fetch(api).await?;
                self.app.apply(data);
                self.app.notice = notices.errors().pop();
            }

            if self.app.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Cleanup terminal on exit
    pub fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )
        .context("Failed to restore terminal")?;
        self.terminal.show_cursor().context("Failed to show cursor")?;

        Ok(())
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

fn ui(f: &mut Frame, app: &App) {
    let size = f.area();

    // header, body, status bar
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(size);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(main_chunks[1]);

    let lists = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    widgets::render_header(main_chunks[0], f.buffer_mut(), &app.admin_name);

    widgets::render_stats(
        rows[0],
        f.buffer_mut(),
        &app.stats,
        app.selected_index,
        app.selected_panel == Panel::Stats,
    );

    widgets::render_recent_feedbacks(
        lists[0],
        f.buffer_mut(),
        &app.recent_feedbacks,
        app.selected_index,
        app.selected_panel == Panel::Feedbacks,
    );

    widgets::render_recent_queries(
        lists[1],
        f.buffer_mut(),
        &app.recent_queries,
        app.selected_index,
        app.selected_panel == Panel::Queries,
    );

    widgets::render_status_bar(
        main_chunks[2],
        f.buffer_mut(),
        &app.failed_counts,
        app.notice.as_deref(),
    );

    if app.show_help {
        let help_area = centered_rect(60, 70, size);
        widgets::render_help_overlay(help_area, f.buffer_mut());
    }
}

/// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
