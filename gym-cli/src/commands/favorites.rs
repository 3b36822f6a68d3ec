use anyhow::Result;
use clap::Subcommand;
use dialoguer::Confirm;

use super::{cell, Context};
use crate::favorites::Favorites;
use crate::routes::Route;

#[derive(Subcommand)]
pub enum FavoritesSubcommands {
    /// List favourite exercises
    List,

    /// Add an exercise to favourites
    Add {
        /// Exercise ID
        id: String,
    },

    /// Remove an exercise from favourites
    Remove {
        /// Exercise ID
        id: String,
    },

    /// Add the exercise if missing, remove it otherwise
    Toggle {
        /// Exercise ID
        id: String,
    },

    /// Remove every favourite
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

impl FavoritesSubcommands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        ctx.enter(&Route::Favorites).await?;
        let mut favorites = Favorites::load(ctx.storage.clone())?;

        match self {
            FavoritesSubcommands::List => {
                if favorites.is_empty() {
                    println!("No favourite exercises yet.");
                    println!();
                    println!("Add one with: gym favorites add <id>");
                    return Ok(());
                }

                println!("Favourite Exercises");
                println!();
                for exercise in favorites.list() {
                    println!(
                        "{} {} {}",
                        cell(&exercise.id, 6),
                        cell(&exercise.name, 34),
                        exercise.target
                    );
                }
            }
            FavoritesSubcommands::Add { id } => {
                let exercise = ctx.exercise_client()?.detail_or_fallback(&id).await;
                if favorites.add(exercise)? {
                    ctx.notifier.success("Exercise added to Favourite");
                } else {
                    ctx.notifier.info("Exercise is already in the Favourite");
                }
            }
            FavoritesSubcommands::Remove { id } => {
                if favorites.remove(&id)? {
                    ctx.notifier.success("Exercise removed from Favourite");
                } else {
                    ctx.notifier.info("Exercise is not in the Favourite");
                }
            }
            FavoritesSubcommands::Toggle { id } => {
                let added = if favorites.contains(&id) {
                    favorites.remove(&id)?;
                    false
                } else {
                    let exercise = ctx.exercise_client()?.detail_or_fallback(&id).await;
                    favorites.toggle(exercise)?
                };

                if added {
                    ctx.notifier.success("Exercise added to Favourite");
                } else {
                    ctx.notifier.success("Exercise removed from Favourite");
                }
            }
            FavoritesSubcommands::Clear { force } => {
                if !force
                    && !Confirm::new()
                        .with_prompt(format!("Remove all {} favourites?", favorites.len()))
                        .default(false)
                        .interact()?
                {
                    println!("Cancelled.");
                    return Ok(());
                }

                favorites.clear()?;
                ctx.notifier.success("Favourites cleared");
            }
        }

        Ok(())
    }
}
