use anyhow::Result;
use crossterm::event::KeyCode;

use crate::api::{ApiClient, ApiError, StatsReport, RECENT_LIMIT};
use crate::models::{AdminStats, ContactQuery, Feedback};

/// Everything the admin dashboard shows
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub report: StatsReport,
    pub recent_feedbacks: Vec<Feedback>,
    pub recent_queries: Vec<ContactQuery>,
}

impl DashboardData {
    /// Fetch counts and both recent lists. Failures degrade to empty panels,
    /// except an expired session, which ends the dashboard.
    pub async fn fetch(api: &ApiClient) -> Result<Self, ApiError> {
        let (report, feedbacks, queries) = tokio::join!(
            api.admin_stats(),
            api.admin_feedbacks(RECENT_LIMIT),
            api.admin_contacts(RECENT_LIMIT),
        );

        Ok(Self {
            report: report?,
            recent_feedbacks: degrade(feedbacks, "recent feedbacks")?,
            recent_queries: degrade(queries, "recent queries")?,
        })
    }
}

fn degrade<T>(result: Result<Vec<T>, ApiError>, what: &str) -> Result<Vec<T>, ApiError> {
    match result {
        Ok(items) => Ok(items),
        Err(e @ ApiError::SessionExpired { .. }) => Err(e),
        Err(e) => {
            tracing::error!("Error fetching {}: {}", what, e);
            Ok(Vec::new())
        }
    }
}

/// Application state for the admin dashboard
pub struct App {
    /// Should the application quit?
    pub should_quit: bool,
    /// Set by `r`; the event loop refetches and clears it
    pub refresh_requested: bool,
    /// Currently selected panel
    pub selected_panel: Panel,
    /// Selected index in the current panel
    pub selected_index: usize,
    /// Show help overlay
    pub show_help: bool,
    pub admin_name: String,
    pub stats: AdminStats,
    /// Counts that could not be fetched
    pub failed_counts: Vec<String>,
    pub recent_feedbacks: Vec<Feedback>,
    pub recent_queries: Vec<ContactQuery>,
    /// Latest error toast raised while fetching
    pub notice: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Stats,
    Feedbacks,
    Queries,
}

impl App {
    pub fn new(admin_name: impl Into<String>, data: DashboardData) -> Self {
        let mut app = Self {
            should_quit: false,
            refresh_requested: false,
            selected_panel: Panel::Stats,
            selected_index: 0,
            show_help: false,
            admin_name: admin_name.into(),
            stats: AdminStats::default(),
            failed_counts: Vec::new(),
            recent_feedbacks: Vec::new(),
            recent_queries: Vec::new(),
            notice: None,
        };
        app.apply(data);
        app
    }

    /// Replace the displayed data
    pub fn apply(&mut self, data: DashboardData) {
        self.stats = data.report.stats;
        self.failed_counts = data.report.failed;
        self.recent_feedbacks = data.recent_feedbacks;
        self.recent_queries = data.recent_queries;
        self.selected_index = self.selected_index.min(self.max_index());
    }

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyCode) -> Result<()> {
        // Help overlay takes precedence
        if self.show_help {
            if matches!(key, KeyCode::Char('?') | KeyCode::Esc) {
                self.show_help = false;
            }
            return Ok(());
        }

        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('r') | KeyCode::Char('R') => self.refresh_requested = true,
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => self.next_panel(),
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => self.prev_panel(),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection_up(),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection_down(),
            _ => {}
        }

        Ok(())
    }

    fn next_panel(&mut self) {
        self.selected_panel = match self.selected_panel {
            Panel::Stats => Panel::Feedbacks,
            Panel::Feedbacks => Panel::Queries,
            Panel::Queries => Panel::Stats,
        };
        self.selected_index = 0;
    }

    fn prev_panel(&mut self) {
        self.selected_panel = match self.selected_panel {
            Panel::Stats => Panel::Queries,
            Panel::Feedbacks => Panel::Stats,
            Panel::Queries => Panel::Feedbacks,
        };
        self.selected_index = 0;
    }

    fn max_index(&self) -> usize {
        match self.selected_panel {
            Panel::Stats => self.stats.entries().len() - 1,
            Panel::Feedbacks => self.recent_feedbacks.len().saturating_sub(1),
            Panel::Queries => self.recent_queries.len().saturating_sub(1),
        }
    }

    fn move_selection_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    fn move_selection_down(&mut self) {
        if self.selected_index < self.max_index() {
            self.selected_index += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feedback(id: &str) -> Feedback {
        serde_json::from_value(serde_json::json!({"_id": id, "message": "Nice", "rating": 4}))
            .unwrap()
    }

    fn app() -> App {
        let data = DashboardData {
            report: StatsReport {
                stats: AdminStats {
                    users: 12,
                    ..Default::default()
                },
                failed: vec!["plans: Server error: boom".into()],
            },
            recent_feedbacks: vec![feedback("f1"), feedback("f2")],
            recent_queries: Vec::new(),
        };
        App::new("Root", data)
    }

    #[test]
    fn test_panels_cycle() -> Result<()> {
        let mut app = app();
        assert_eq!(app.selected_panel, Panel::Stats);

        app.handle_key(KeyCode::Tab)?;
        assert_eq!(app.selected_panel, Panel::Feedbacks);
        app.handle_key(KeyCode::Tab)?;
        app.handle_key(KeyCode::Tab)?;
        assert_eq!(app.selected_panel, Panel::Stats);
        app.handle_key(KeyCode::Left)?;
        assert_eq!(app.selected_panel, Panel::Queries);
        Ok(())
    }

    #[test]
    fn test_selection_stays_in_bounds() -> Result<()> {
        let mut app = app();
        app.handle_key(KeyCode::Tab)?;

        for _ in 0..5 {
            app.handle_key(KeyCode::Down)?;
        }
        assert_eq!(app.selected_index, 1);

        app.handle_key(KeyCode::Tab)?;
        app.handle_key(KeyCode::Down)?;
        assert_eq!(app.selected_index, 0);
        Ok(())
    }

    #[test]
    fn test_help_overlay_swallows_keys() -> Result<()> {
        let mut app = app();
        app.handle_key(KeyCode::Char('?'))?;
        app.handle_key(KeyCode::Char('q'))?;
        assert!(!app.should_quit);

        app.handle_key(KeyCode::Esc)?;
        app.handle_key(KeyCode::Char('r'))?;
        assert!(app.refresh_requested);
        app.handle_key(KeyCode::Char('q'))?;
        assert!(app.should_quit);
        Ok(())
    }

    #[test]
    fn test_failed_counts_read_as_zero() {
        let app = app();
        assert_eq!(app.stats.plans, 0);
        assert_eq!(app.failed_counts.len(), 1);
    }
}
