mod admin;
mod config_cmd;
mod contact;
mod exercises;
mod favorites;
mod feedback;
mod login;
mod logout;
mod plans;
mod register;
mod whoami;

use anyhow::{anyhow, Context as _, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::api::{ApiClient, ApiError};
use crate::config::Config;
use crate::exercise::ExerciseDbClient;
use crate::guard::{GuardOutcome, RouteGuard};
use crate::notify::{ConsoleNotifier, Notifier};
use crate::routes::Route;
use crate::session::{Session, SessionStore};
use crate::storage::Storage;

pub use admin::AdminSubcommands;
pub use contact::ContactSubcommands;
pub use exercises::ExercisesSubcommands;
pub use favorites::FavoritesSubcommands;
pub use feedback::FeedbackSubcommands;
pub use login::LoginCommand;
pub use logout::LogoutCommand;
pub use plans::PlansSubcommands;
pub use register::RegisterCommand;
pub use whoami::WhoamiCommand;

#[derive(Parser)]
#[command(name = "gym")]
#[command(about = "Terminal client for the Gym App membership backend", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "GYM_CLI_CONFIG")]
    config: Option<PathBuf>,

    /// Backend base URL, without the /api/v1 suffix
    #[arg(long, global = true, env = "GYM_BASE_URL")]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to the gym backend
    Login(LoginCommand),

    /// Create a new member account
    Register(RegisterCommand),

    /// Log out and clear the stored session
    Logout(LogoutCommand),

    /// Show the logged-in user
    Whoami(WhoamiCommand),

    /// Browse and manage membership plans
    #[command(subcommand)]
    Plans(PlansSubcommands),

    /// Browse the exercise library
    #[command(subcommand)]
    Exercises(ExercisesSubcommands),

    /// Manage favourite exercises
    #[command(subcommand)]
    Favorites(FavoritesSubcommands),

    /// Submit and manage your feedback
    #[command(subcommand)]
    Feedback(FeedbackSubcommands),

    /// Send and manage contact queries
    #[command(subcommand)]
    Contact(ContactSubcommands),

    /// Administration screens
    #[command(subcommand)]
    Admin(AdminSubcommands),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigSubcommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Show current configuration
    Show,

    /// Edit configuration file
    Edit,

    /// Initialize configuration with defaults
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub async fn execute(self) -> Result<()> {
        if self.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        let config_path = self.config.as_deref();

        match self.command {
            Commands::Config(subcmd) => match subcmd {
                ConfigSubcommands::Show => config_cmd::show_config(config_path),
                ConfigSubcommands::Edit => config_cmd::edit_config(config_path),
                ConfigSubcommands::Init { force } => config_cmd::init_config(config_path, force),
            },
            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
            command => {
                let ctx = Context::init(config_path, self.base_url.as_deref()).await?;
                match command {
                    Commands::Login(cmd) => cmd.execute(&ctx).await,
                    Commands::Register(cmd) => cmd.execute(&ctx).await,
                    Commands::Logout(cmd) => cmd.execute(&ctx).await,
                    Commands::Whoami(cmd) => cmd.execute(&ctx).await,
                    Commands::Plans(subcmd) => subcmd.execute(&ctx).await,
                    Commands::Exercises(subcmd) => subcmd.execute(&ctx).await,
                    Commands::Favorites(subcmd) => subcmd.execute(&ctx).await,
                    Commands::Feedback(subcmd) => subcmd.execute(&ctx).await,
                    Commands::Contact(subcmd) => subcmd.execute(&ctx).await,
                    Commands::Admin(subcmd) => subcmd.execute(&ctx).await,
                    Commands::Config(_) | Commands::Completions { .. } => Ok(()),
                }
            }
        }
    }
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

/// A protected screen was opened without a usable session
#[derive(Error, Debug)]
#[error("Login required to open {route}")]
pub struct LoginRequired {
    pub route: String,
    pub return_to: Option<String>,
}

/// Suggested follow-up when `err` means the user has to log in again
pub fn login_hint(err: &anyhow::Error) -> Option<String> {
    let return_to = if let Some(required) = err.downcast_ref::<LoginRequired>() {
        required.return_to.clone()
    } else if let Some(ApiError::SessionExpired { return_to }) = err.downcast_ref::<ApiError>() {
        return_to.clone()
    } else {
        return None;
    };

    Some(match return_to {
        Some(path) => format!("Run 'gym login --return-to {path}' to continue."),
        None => "Run 'gym login' to continue.".to_string(),
    })
}

/// Everything a screen needs: configuration, the session and the clients
pub struct Context {
    pub config: Config,
    pub storage: Storage,
    pub session: Arc<SessionStore>,
    pub notifier: Arc<dyn Notifier>,
    pub api: Arc<ApiClient>,
    pub guard: RouteGuard,
}

impl Context {
    /// Load configuration, open local storage and restore the session
    pub async fn init(config_path: Option<&std::path::Path>, base_url: Option<&str>) -> Result<Self> {
        let mut config = Config::load_from(config_path)?;
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            config.api.base_url = url.to_string();
        }
        if !config.ui.color {
            colored::control::set_override(false);
            console::set_colors_enabled(false);
        }

        let storage = Storage::init().context("Failed to open local storage")?;
        let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);
        let ctx = Self::with_parts(config, storage, notifier)?;
        ctx.bootstrap().await?;
        Ok(ctx)
    }

    pub fn with_parts(config: Config, storage: Storage, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let session = Arc::new(SessionStore::new(storage.clone(), &config.session));
        let api = Arc::new(ApiClient::new(&config, session.clone(), notifier.clone())?);
        let guard = RouteGuard::new(api.clone());

        Ok(Self {
            config,
            storage,
            session,
            notifier,
            api,
            guard,
        })
    }

    /// Restore the persisted session. A bare cookie is exchanged for the user
    /// record; a token the backend rejects is dropped.
    pub async fn bootstrap(&self) -> Result<Session> {
        let session = self.session.restore()?;
        if !session.is_authenticated() || session.user.is_some() {
            return Ok(session);
        }

        match self.api.verify_token(&session.token).await {
            Ok(user) => {
                let verified = Session::new(Some(user), session.token);
                self.session.set_auth(verified.clone(), true)?;
                Ok(verified)
            }
            Err(e) => {
                tracing::info!("Stored token rejected: {}", e);
                self.session.clear()?;
                Ok(Session::default())
            }
        }
    }

    /// Pass the route guard for `route`
    pub async fn enter(&self, route: &Route) -> Result<Session> {
        match self.guard.check(route).await? {
            GuardOutcome::Render(session) => Ok(session),
            GuardOutcome::Redirect(Route::Login { return_to }) => Err(LoginRequired {
                route: route.path(),
                return_to,
            }
            .into()),
            GuardOutcome::Redirect(other) => Err(anyhow!("Redirected to {other}")),
            GuardOutcome::Superseded => Err(anyhow!("Navigation to {route} was superseded")),
        }
    }

    /// The current session's user id, for screens that act as the user
    pub fn user_id(session: &Session) -> Result<&str> {
        session
            .user
            .as_ref()
            .map(|u| u.id.as_str())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| anyhow!("Logged-in user is unknown; log in again"))
    }

    pub fn exercise_client(&self) -> Result<ExerciseDbClient> {
        ExerciseDbClient::new(
            &self.config.exercise_db,
            Duration::from_secs(self.config.api.timeout_seconds),
            self.notifier.clone(),
        )
    }

    pub fn date_format(&self) -> &str {
        &self.config.ui.date_format
    }
}

/// Spinner shown while a request is in flight
pub(crate) fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Fixed-width table cell
pub(crate) fn cell(text: &str, width: usize) -> String {
    console::pad_str(text, width, console::Alignment::Left, Some("…")).into_owned()
}

/// Print every field error of a rejected form
pub(crate) fn report_form_errors(err: &crate::forms::FormError) {
    use colored::Colorize;
    for (field, message) in &err.fields {
        eprintln!("  {} {}", format!("{field}:").yellow(), message);
    }
}

/// The command that renders `route`, used to print the next step
pub fn command_for(route: &Route) -> String {
    match route {
        Route::Home | Route::UserDashboard => "gym whoami".into(),
        Route::Login { return_to: Some(path) } => format!("gym login --return-to {path}"),
        Route::Login { return_to: None } => "gym login".into(),
        Route::Register => "gym register".into(),
        Route::Contact => "gym contact submit".into(),
        Route::Exercises => "gym exercises list".into(),
        Route::ExerciseDetail { id } => format!("gym exercises show {id}"),
        Route::Favorites => "gym favorites list".into(),
        Route::Plans => "gym plans list".into(),
        Route::PlanDetail { id } => format!("gym plans show {id}"),
        Route::SubmitFeedback => "gym feedback submit".into(),
        Route::MyFeedbacks => "gym feedback list".into(),
        Route::AdminDashboard => "gym admin dashboard".into(),
        Route::AdminUsers => "gym admin users".into(),
        Route::AdminUserDetail { id } => format!("gym admin user {id}"),
        Route::Subscribers => "gym admin subscribers".into(),
        Route::NewSubscription => "gym admin subscribe".into(),
        Route::AdminFeedbacks => "gym admin feedbacks".into(),
        Route::ContactQueries => "gym contact list".into(),
        Route::AdminPlans => "gym plans list --all".into(),
        Route::CreatePlan => "gym plans create".into(),
        Route::EditPlan { id } => format!("gym plans edit {id}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_login_hint() {
        let err: anyhow::Error = LoginRequired {
            route: "/dashboard/admin".into(),
            return_to: Some("/dashboard/admin".into()),
        }
        .into();
        assert_eq!(
            login_hint(&err).as_deref(),
            Some("Run 'gym login --return-to /dashboard/admin' to continue.")
        );

        let err: anyhow::Error = ApiError::SessionExpired { return_to: None }.into();
        assert_eq!(login_hint(&err).as_deref(), Some("Run 'gym login' to continue."));

        let err = anyhow!("something else");
        assert!(login_hint(&err).is_none());
    }

    #[test]
    fn test_every_route_has_a_command() {
        for path in [
            "/dashboard/user/exercise",
            "/dashboard/user/favourite-exercises",
            "/dashboard/admin/plans",
            "/dashboard/admin/contact-us",
        ] {
            let route = Route::parse(path).unwrap();
            assert!(command_for(&route).starts_with("gym "));
        }
        assert_eq!(
            command_for(&Route::EditPlan { id: "p1".into() }),
            "gym plans edit p1"
        );
    }

    #[test]
    fn test_cell_pads_and_truncates() {
        assert_eq!(cell("abc", 5), "abc  ");
        assert_eq!(console::measure_text_width(&cell("abcdefgh", 5)), 5);
    }
}
