use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use tokio_util::sync::CancellationToken;

use super::{cell, spinner, Context};
use crate::exercise::{paginate, search, ExerciseError, ALL_BODY_PARTS};
use crate::favorites::Favorites;
use crate::models::Exercise;
use crate::routes::Route;

#[derive(Subcommand)]
pub enum ExercisesSubcommands {
    /// List exercises, optionally filtered
    List {
        /// Body part, e.g. chest or "upper legs"
        #[arg(short, long, default_value = ALL_BODY_PARTS)]
        body_part: String,

        /// Target muscle (overrides --body-part)
        #[arg(long, conflicts_with = "equipment")]
        target: Option<String>,

        /// Equipment, e.g. barbell (overrides --body-part)
        #[arg(long)]
        equipment: Option<String>,

        /// Filter by name, target or body part
        #[arg(short, long)]
        search: Option<String>,

        /// Page number
        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// List the body parts exercises are grouped by
    BodyParts,

    /// Show exercise details
    Show {
        /// Exercise ID
        id: String,
    },
}

impl ExercisesSubcommands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            ExercisesSubcommands::List {
                body_part,
                target,
                equipment,
                search,
                page,
            } => {
                list_exercises(
                    ctx,
                    &body_part,
                    target.as_deref(),
                    equipment.as_deref(),
                    search.as_deref(),
                    page,
                )
                .await
            }
            ExercisesSubcommands::BodyParts => list_body_parts(ctx).await,
            ExercisesSubcommands::Show { id } => show_exercise(ctx, &id).await,
        }
    }
}

/// Token cancelled on Ctrl-C, so a slow fetch can be abandoned
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            child.cancel();
        }
    });
    token
}

async fn list_exercises(
    ctx: &Context,
    body_part: &str,
    target: Option<&str>,
    equipment: Option<&str>,
    query: Option<&str>,
    page: usize,
) -> Result<()> {
    ctx.enter(&Route::Exercises).await?;

    let client = ctx.exercise_client()?;
    let favorites = Favorites::load(ctx.storage.clone())?;
    let cancel = cancel_on_ctrl_c();

    let pb = spinner("Loading exercises...");
    let result = match (target, equipment) {
        (Some(target), _) => client.by_target(target, &cancel).await,
        (None, Some(equipment)) => client.by_equipment(equipment, &cancel).await,
        (None, None) => client.list(body_part, &cancel).await,
    };
    pb.finish_and_clear();

    let exercises = match result {
        Ok(exercises) => exercises,
        Err(ExerciseError::Cancelled) => {
            println!("Cancelled.");
            return Ok(());
        }
        Err(e) => {
            tracing::debug!("Exercise listing unavailable: {}", e);
            Vec::new()
        }
    };

    let matching = search(&exercises, query.unwrap_or_default());
    if matching.is_empty() {
        println!("No exercises found.");
        return Ok(());
    }

    let page = paginate(&matching, page, ctx.config.exercise_db.page_size);

    for exercise in &page.items {
        let star = if favorites.contains(&exercise.id) {
            "♥".red().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "{} {} {} {} {}",
            star,
            cell(&exercise.id, 6),
            cell(&exercise.name, 34),
            cell(&exercise.body_part, 12),
            exercise.target.dimmed()
        );
    }

    println!();
    println!(
        "Page {} of {} ({} exercises)",
        page.page, page.total_pages, page.total
    );

    Ok(())
}

async fn list_body_parts(ctx: &Context) -> Result<()> {
    ctx.enter(&Route::Exercises).await?;

    let client = ctx.exercise_client()?;
    let cancel = cancel_on_ctrl_c();

    match client.body_parts(&cancel).await {
        Ok(parts) => {
            println!("Body parts:");
            for part in parts {
                println!("  {part}");
            }
        }
        Err(ExerciseError::Cancelled) => println!("Cancelled."),
        Err(e) => tracing::debug!("Body parts unavailable: {}", e),
    }

    Ok(())
}

fn print_exercise(exercise: &Exercise, favorite: bool) {
    let heart = if favorite { " ♥".red().to_string() } else { String::new() };
    println!("{}{}", exercise.name.bold(), heart);
    println!("────────────────────────────────");
    println!("  Body part: {}", exercise.body_part);
    println!("  Target:    {}", exercise.target);
    println!("  Equipment: {}", exercise.equipment);
    if !exercise.secondary_muscles.is_empty() {
        println!("  Secondary: {}", exercise.secondary_muscles.join(", "));
    }
    if !exercise.gif_url.is_empty() {
        println!("  Demo:      {}", exercise.gif_url);
    }

    println!();
    println!("Instructions:");
    for (step, instruction) in exercise.instructions.iter().enumerate() {
        println!("  {}. {}", step + 1, instruction);
    }
}

async fn show_exercise(ctx: &Context, id: &str) -> Result<()> {
    ctx.enter(&Route::ExerciseDetail { id: id.to_string() }).await?;

    let client = ctx.exercise_client()?;
    let favorites = Favorites::load(ctx.storage.clone())?;

    let exercise = client.detail_or_fallback(id).await;
    print_exercise(&exercise, favorites.contains(&exercise.id));

    Ok(())
}
