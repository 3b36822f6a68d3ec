use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use dialoguer::{Confirm, Input, MultiSelect};

use super::{cell, report_form_errors, spinner, Context};
use crate::forms::PlanForm;
use crate::models::{feature_label, Plan, PlanFeatures, KNOWN_FEATURES};
use crate::routes::Route;

#[derive(Subcommand)]
pub enum PlansSubcommands {
    /// List membership plans
    List {
        /// Include inactive plans (admin)
        #[arg(short, long)]
        all: bool,
    },

    /// Show plan details
    Show {
        /// Plan ID
        id: String,
    },

    /// Create a plan (admin)
    Create(PlanFields),

    /// Edit a plan (admin)
    Edit {
        /// Plan ID
        id: String,

        #[command(flatten)]
        fields: PlanFields,
    },

    /// Delete a plan (admin)
    Delete {
        /// Plan ID
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Activate or deactivate a plan (admin)
    ToggleActive {
        /// Plan ID
        id: String,
    },

    /// Mark or unmark a plan as popular (admin)
    TogglePopular {
        /// Plan ID
        id: String,
    },
}

/// Plan form fields; anything omitted is prompted for (create) or kept (edit)
#[derive(Args, Default)]
pub struct PlanFields {
    /// Plan name
    #[arg(long)]
    name: Option<String>,

    /// Monthly amount
    #[arg(long)]
    monthly: Option<String>,

    /// Yearly amount, at most 12x the monthly amount
    #[arg(long)]
    yearly: Option<String>,

    /// Enabled features, e.g. lockerRooms,wifiService
    #[arg(long, value_delimiter = ',')]
    features: Option<Vec<String>>,

    /// Mark the plan as popular
    #[arg(long)]
    popular: Option<bool>,

    /// Whether members can subscribe to the plan
    #[arg(long)]
    active: Option<bool>,
}

impl PlansSubcommands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            PlansSubcommands::List { all } => list_plans(ctx, all).await,
            PlansSubcommands::Show { id } => show_plan(ctx, &id).await,
            PlansSubcommands::Create(fields) => create_plan(ctx, fields).await,
            PlansSubcommands::Edit { id, fields } => edit_plan(ctx, &id, fields).await,
            PlansSubcommands::Delete { id, force } => delete_plan(ctx, &id, force).await,
            PlansSubcommands::ToggleActive { id } => toggle_active(ctx, &id).await,
            PlansSubcommands::TogglePopular { id } => toggle_popular(ctx, &id).await,
        }
    }
}

fn print_plan_row(plan: &Plan) {
    let mut badges = Vec::new();
    if plan.is_popular {
        badges.push("★ popular".yellow().to_string());
    }
    if !plan.is_active {
        badges.push("inactive".red().to_string());
    }

    println!(
        "{} {} {} {} {}",
        cell(&plan.id, 26),
        cell(&plan.plan_name, 20),
        cell(&format!("₹{:.0}/mo", plan.monthly_plan_amount), 12),
        cell(&format!("₹{:.0}/yr", plan.yearly_plan_amount), 12),
        badges.join(" ")
    );
}

async fn list_plans(ctx: &Context, all: bool) -> Result<()> {
    let route = if all { Route::AdminPlans } else { Route::Plans };
    ctx.enter(&route).await?;

    let pb = spinner("Loading plans...");
    let plans = ctx.api.list_plans().await;
    pb.finish_and_clear();

    let plans: Vec<Plan> = plans?
        .into_iter()
        .filter(|plan| all || plan.is_active)
        .collect();

    if plans.is_empty() {
        println!("No plans available.");
        return Ok(());
    }

    println!("Membership Plans");
    println!();
    for plan in &plans {
        print_plan_row(plan);
    }
    println!();
    println!("{} plan(s)", plans.len());

    Ok(())
}

async fn show_plan(ctx: &Context, id: &str) -> Result<()> {
    ctx.enter(&Route::PlanDetail { id: id.to_string() }).await?;

    let plan = ctx.api.get_plan(id).await?;

    println!("{}", plan.plan_name.bold());
    println!("────────────────────────────────");
    println!("  Monthly: ₹{:.2}", plan.monthly_plan_amount);
    println!("  Yearly:  ₹{:.2}", plan.yearly_plan_amount);
    if plan.yearly_savings() > 0.0 {
        println!(
            "  Save ₹{:.2} ({}%) by paying yearly",
            plan.yearly_savings(),
            plan.savings_percent()
        );
    }
    println!("  Status:  {}", if plan.is_active { "active" } else { "inactive" });
    if plan.is_popular {
        println!("  {}", "★ Most popular".yellow());
    }

    println!();
    println!("Features:");
    for (name, enabled) in plan.features.iter() {
        let mark = if enabled { "✓".green() } else { "✗".red() };
        println!("  {} {}", mark, feature_label(name));
    }

    Ok(())
}

fn prompt_features(current: &PlanFeatures) -> Result<PlanFeatures> {
    let labels: Vec<&str> = KNOWN_FEATURES.iter().map(|(_, label)| *label).collect();
    let defaults: Vec<bool> = KNOWN_FEATURES
        .iter()
        .map(|(name, _)| current.is_enabled(name))
        .collect();

    let chosen = MultiSelect::new()
        .with_prompt("Features (space to toggle)")
        .items(&labels)
        .defaults(&defaults)
        .interact()?;

    let mut features = current.clone();
    for (idx, (name, _)) in KNOWN_FEATURES.iter().enumerate() {
        features.set(name, chosen.contains(&idx));
    }
    Ok(features)
}

/// Apply the given flags over `form`; with `interactive`, prompt for the rest
fn fill_form(mut form: PlanForm, fields: PlanFields, interactive: bool) -> Result<PlanForm> {
    let text = |value: Option<String>, label: &str, current: &str| -> Result<String> {
        match value {
            Some(value) => Ok(value),
            None if interactive => Ok(Input::new()
                .with_prompt(label)
                .with_initial_text(current)
                .interact_text()?),
            None => Ok(current.to_string()),
        }
    };

    form.plan_name = text(fields.name, "Plan name", &form.plan_name)?;
    form.monthly_plan_amount = text(fields.monthly, "Monthly amount", &form.monthly_plan_amount)?;
    form.yearly_plan_amount = text(fields.yearly, "Yearly amount", &form.yearly_plan_amount)?;

    match fields.features {
        Some(names) => {
            let mut features = PlanFeatures::default();
            for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
                features.set(name, true);
            }
            form.features = features;
        }
        None if interactive => form.features = prompt_features(&form.features)?,
        None => {}
    }

    if let Some(popular) = fields.popular {
        form.is_popular = popular;
    }
    if let Some(active) = fields.active {
        form.is_active = active;
    }

    Ok(form)
}

fn validated(form: &PlanForm) -> Result<Plan> {
    match form.validate() {
        Ok(plan) => Ok(plan),
        Err(e) => {
            report_form_errors(&e);
            bail!("Plan form has {} invalid field(s)", e.fields.len());
        }
    }
}

async fn create_plan(ctx: &Context, fields: PlanFields) -> Result<()> {
    ctx.enter(&Route::CreatePlan).await?;

    let form = PlanForm {
        is_active: true,
        ..Default::default()
    };
    let form = fill_form(form, fields, true)?;
    let plan = validated(&form)?;

    let message = ctx.api.create_plan(&plan).await?;
    ctx.notifier.success(&message);

    Ok(())
}

async fn edit_plan(ctx: &Context, id: &str, fields: PlanFields) -> Result<()> {
    ctx.enter(&Route::EditPlan { id: id.to_string() }).await?;

    let existing = ctx.api.get_plan(id).await?;
    let interactive = fields.name.is_none()
        && fields.monthly.is_none()
        && fields.yearly.is_none()
        && fields.features.is_none();

    let form = fill_form(PlanForm::from_plan(&existing), fields, interactive)?;
    let plan = validated(&form)?;

    let message = ctx.api.update_plan(id, &plan).await?;
    ctx.notifier.success(&message);

    Ok(())
}

async fn delete_plan(ctx: &Context, id: &str, force: bool) -> Result<()> {
    ctx.enter(&Route::AdminPlans).await?;

    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete plan {id}?"))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    ctx.api.delete_plan(id).await?;
    ctx.notifier.success("Plan deleted successfully");

    Ok(())
}

async fn toggle_active(ctx: &Context, id: &str) -> Result<()> {
    ctx.enter(&Route::AdminPlans).await?;

    let plan = ctx.api.get_plan(id).await?;
    let active = !plan.is_active;
    ctx.api.set_plan_active(id, active).await?;

    ctx.notifier.success(&format!(
        "Plan {} {}",
        plan.plan_name,
        if active { "activated" } else { "deactivated" }
    ));

    Ok(())
}

async fn toggle_popular(ctx: &Context, id: &str) -> Result<()> {
    ctx.enter(&Route::AdminPlans).await?;

    ctx.api.toggle_plan_popular(id).await?;
    ctx.notifier.success("Plan popularity updated");

    Ok(())
}
