use anyhow::{anyhow, bail, Result};
use chrono::{Local, NaiveDate};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Select;
use std::sync::Arc;

use super::feedback::print_feedback;
use super::{cell, spinner, Context};
use crate::api::ApiClient;
use crate::models::{Billing, Plan, Subscription, SubscriptionDraft, User};
use crate::notify::MemoryNotifier;
use crate::routes::Route;
use crate::ui::{App, Dashboard, DashboardData};

#[derive(Subcommand)]
pub enum AdminSubcommands {
    /// Launch the interactive admin dashboard
    Dashboard {
        /// Print the dashboard once instead of opening the TUI
        #[arg(long)]
        print: bool,
    },

    /// List registered users
    Users,

    /// Show a user and their subscriptions
    User {
        /// User ID
        id: String,
    },

    /// List subscribers, page by page
    Subscribers {
        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Entries per page
        #[arg(short, long, default_value = "10")]
        limit: u32,
    },

    /// Subscribe a user to a plan
    Subscribe {
        /// User ID (chosen interactively when omitted)
        #[arg(long)]
        user: Option<String>,

        /// Plan ID (chosen interactively when omitted)
        #[arg(long)]
        plan: Option<String>,

        /// Billing period
        #[arg(long, value_enum, default_value = "monthly")]
        billing: Billing,

        /// Start date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        start: Option<NaiveDate>,
    },

    /// List recent feedback from all members
    Feedbacks {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: u32,
    },
}

impl AdminSubcommands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            AdminSubcommands::Dashboard { print } => dashboard(ctx, print).await,
            AdminSubcommands::Users => users(ctx).await,
            AdminSubcommands::User { id } => user(ctx, &id).await,
            AdminSubcommands::Subscribers { page, limit } => subscribers(ctx, page, limit).await,
            AdminSubcommands::Subscribe {
                user,
                plan,
                billing,
                start,
            } => subscribe(ctx, user, plan, billing, start).await,
            AdminSubcommands::Feedbacks { limit } => feedbacks(ctx, limit).await,
        }
    }
}

async fn dashboard(ctx: &Context, print: bool) -> Result<()> {
    let session = ctx.enter(&Route::AdminDashboard).await?;
    let admin_name = session
        .user
        .as_ref()
        .map(|u| u.name.clone())
        .unwrap_or_else(|| "Admin".to_string());

    // Toasts would corrupt the alternate screen; collect them for the status bar
    let notices = Arc::new(MemoryNotifier::default());
    let api = ApiClient::new(&ctx.config, ctx.session.clone(), notices.clone())?;
    api.set_location(&Route::AdminDashboard.path());

    let pb = spinner("Loading dashboard...");
    let data = DashboardData::fetch(&api).await;
    pb.finish_and_clear();
    let data = data?;

    if print {
        print_dashboard(&admin_name, &data);
        return Ok(());
    }

    let mut app = App::new(admin_name, data);
    app.notice = notices.errors().pop();

    let mut dashboard = Dashboard::new(app)?;
    dashboard.run(&api, &notices).await?;
    dashboard.cleanup()?;

    Ok(())
}

fn print_dashboard(admin_name: &str, data: &DashboardData) {
    println!("Admin Dashboard - {}", admin_name.bold());
    println!("────────────────────────────────");
    for (label, value) in data.report.stats.entries() {
        println!("  {} {}", cell(label, 12), value);
    }
    for failed in &data.report.failed {
        println!("  {} {}", "⚠".yellow(), failed);
    }

    println!();
    println!("Recent feedback:");
    if data.recent_feedbacks.is_empty() {
        println!("  none");
    }
    for feedback in &data.recent_feedbacks {
        println!("  {} {}", feedback.stars().yellow(), feedback.message);
    }

    println!();
    println!("Recent queries:");
    if data.recent_queries.is_empty() {
        println!("  none");
    }
    for query in &data.recent_queries {
        println!("  [{}] {} <{}>", query.status, query.name, query.email);
    }
}

fn print_user_row(user: &User) {
    let role = if user.has_admin_role() {
        "admin".cyan().to_string()
    } else {
        "member".to_string()
    };
    println!(
        "{} {} {} {} {}",
        cell(&user.id, 26),
        cell(&user.name, 20),
        cell(&user.email, 30),
        cell(&user.city, 12),
        role
    );
}

async fn users(ctx: &Context) -> Result<()> {
    ctx.enter(&Route::AdminUsers).await?;

    let pb = spinner("Loading users...");
    let users = ctx.api.list_users().await;
    pb.finish_and_clear();
    let users = users?;

    if users.is_empty() {
        println!("No users found.");
        return Ok(());
    }

    for user in &users {
        print_user_row(user);
    }
    println!();
    println!("{} user(s)", users.len());

    Ok(())
}

fn print_subscription_row(sub: &Subscription) {
    let amount = sub
        .plan_amount
        .map(|a| format!("₹{a:.0}"))
        .unwrap_or_else(|| "N/A".to_string());
    let status = if sub.status == "active" {
        sub.status.green()
    } else {
        sub.status.normal()
    };

    println!(
        "{} {} {} {} {} {}",
        cell(sub.subscriber_name(), 20),
        cell(sub.subscriber_email(), 28),
        cell(sub.plan_name(), 14),
        cell(&amount, 9),
        cell(&sub.period(), 25),
        status
    );
}

async fn user(ctx: &Context, id: &str) -> Result<()> {
    ctx.enter(&Route::AdminUserDetail { id: id.to_string() }).await?;

    let (user, subscriptions) = tokio::join!(
        ctx.api.admin_user(id),
        ctx.api.admin_user_subscriptions(id)
    );
    let user = user?;

    println!("{}", user.name.bold());
    println!("────────────────────────────────");
    println!("  Email:   {}", user.email);
    println!("  City:    {}", user.city);
    println!("  Contact: {}", user.contact);
    println!("  Role:    {}", if user.has_admin_role() { "admin" } else { "member" });
    if let Some(joined) = user.created_at {
        println!("  Joined:  {}", joined.format(ctx.date_format()));
    }

    println!();
    println!("Subscriptions:");
    let subscriptions = subscriptions.unwrap_or_else(|e| {
        tracing::warn!(user = %id, "Could not load subscriptions: {}", e);
        Vec::new()
    });
    if subscriptions.is_empty() {
        println!("  none");
    }
    for sub in &subscriptions {
        print_subscription_row(sub);
    }

    Ok(())
}

async fn subscribers(ctx: &Context, page: u32, limit: u32) -> Result<()> {
    ctx.enter(&Route::Subscribers).await?;

    let pb = spinner("Loading subscribers...");
    let result = ctx.api.subscribers(page.max(1), limit.max(1)).await;
    pb.finish_and_clear();
    let listing = result?;

    if listing.subscriptions.is_empty() {
        println!("No subscribers found.");
        return Ok(());
    }

    for sub in &listing.subscriptions {
        print_subscription_row(sub);
    }

    let total_pages = listing.total.div_ceil(u64::from(limit.max(1))).max(1);
    println!();
    println!(
        "Page {} of {} ({} subscribers)",
        listing.current_page, total_pages, listing.total
    );

    Ok(())
}

/// Pick the item whose key is `id`, or let the admin choose one
fn choose<'a, T>(
    items: &'a [T],
    id: Option<&str>,
    prompt: &str,
    key: impl Fn(&T) -> &str,
    label: impl Fn(&T) -> String,
) -> Result<&'a T> {
    if let Some(id) = id {
        return items
            .iter()
            .find(|item| key(item) == id)
            .ok_or_else(|| anyhow!("No match for {id}"));
    }

    if items.is_empty() {
        bail!("Nothing to choose from for: {prompt}");
    }

    let labels: Vec<String> = items.iter().map(label).collect();
    let idx = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(&items[idx])
}

async fn subscribe(
    ctx: &Context,
    user_id: Option<String>,
    plan_id: Option<String>,
    billing: Billing,
    start: Option<NaiveDate>,
) -> Result<()> {
    ctx.enter(&Route::NewSubscription).await?;

    let pb = spinner("Loading users and plans...");
    let loaded = tokio::try_join!(ctx.api.admin_users(), ctx.api.list_plans());
    pb.finish_and_clear();
    let (users, plans) = loaded?;

    let plans: Vec<Plan> = plans.into_iter().filter(|p| p.is_active).collect();

    let user = choose(
        &users,
        user_id.as_deref(),
        "User",
        |u| u.id.as_str(),
        |u| format!("{} <{}>", u.name, u.email),
    )?;
    let plan = choose(
        &plans,
        plan_id.as_deref(),
        "Plan",
        |p| p.id.as_str(),
        |p| {
            format!(
                "{} (₹{:.0}/mo, ₹{:.0}/yr)",
                p.plan_name, p.monthly_plan_amount, p.yearly_plan_amount
            )
        },
    )?;

    let start = start.unwrap_or_else(|| Local::now().date_naive());
    let draft = SubscriptionDraft::for_plan(user, plan, start, billing)?;

    println!(
        "Subscribing {} to {} from {} to {} for ₹{:.2}",
        draft.user_name, draft.plan_type, draft.start_date, draft.end_date, draft.plan_amount
    );

    let message = ctx.api.create_subscription(&draft).await?;
    ctx.notifier.success(&message);

    Ok(())
}

async fn feedbacks(ctx: &Context, limit: u32) -> Result<()> {
    ctx.enter(&Route::AdminFeedbacks).await?;

    let pb = spinner("Loading feedback...");
    let result = ctx.api.admin_feedbacks(limit).await;
    pb.finish_and_clear();
    let feedbacks = result?;

    if feedbacks.is_empty() {
        println!("No feedback yet.");
        return Ok(());
    }

    for feedback in &feedbacks {
        print_feedback(feedback, ctx.date_format());
    }

    Ok(())
}
