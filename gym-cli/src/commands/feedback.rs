use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::{Confirm, Input};

use super::{report_form_errors, spinner, Context};
use crate::forms::FeedbackForm;
use crate::models::Feedback;
use crate::routes::Route;

#[derive(Subcommand)]
pub enum FeedbackSubcommands {
    /// Submit feedback
    Submit {
        /// Feedback text (prompted when omitted)
        #[arg(short, long)]
        message: Option<String>,

        /// Rating from 1 to 5 (prompted when omitted)
        #[arg(short, long)]
        rating: Option<u8>,
    },

    /// List your feedback
    List,

    /// Edit one of your feedback entries
    Edit {
        /// Feedback ID
        id: String,

        /// New text
        #[arg(short, long)]
        message: Option<String>,

        /// New rating from 1 to 5
        #[arg(short, long)]
        rating: Option<u8>,
    },

    /// Delete one of your feedback entries
    Delete {
        /// Feedback ID
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

impl FeedbackSubcommands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            FeedbackSubcommands::Submit { message, rating } => submit(ctx, message, rating).await,
            FeedbackSubcommands::List => list(ctx).await,
            FeedbackSubcommands::Edit {
                id,
                message,
                rating,
            } => edit(ctx, &id, message, rating).await,
            FeedbackSubcommands::Delete { id, force } => delete(ctx, &id, force).await,
        }
    }
}

fn validated(form: FeedbackForm) -> Result<(String, u8)> {
    match form.validate() {
        Ok(fields) => Ok(fields),
        Err(e) => {
            report_form_errors(&e);
            bail!("Feedback form has {} invalid field(s)", e.fields.len());
        }
    }
}

async fn submit(ctx: &Context, message: Option<String>, rating: Option<u8>) -> Result<()> {
    let session = ctx.enter(&Route::SubmitFeedback).await?;
    let user_id = Context::user_id(&session)?;

    let message = match message {
        Some(message) => message,
        None => Input::new().with_prompt("Your feedback").interact_text()?,
    };
    let rating = match rating {
        Some(rating) => rating,
        None => Input::new()
            .with_prompt("Rating (1-5)")
            .default(5u8)
            .interact_text()?,
    };

    let (message, rating) = validated(FeedbackForm { message, rating })?;
    let response = ctx.api.create_feedback(user_id, &message, rating).await?;
    ctx.notifier.success(&response);

    Ok(())
}

pub(super) fn print_feedback(feedback: &Feedback, date_format: &str) {
    let date = feedback
        .created_at
        .map(|at| at.format(date_format).to_string())
        .unwrap_or_default();
    let author = feedback
        .user
        .as_ref()
        .map(|u| u.display_name().to_string())
        .unwrap_or_default();

    println!(
        "{} {} {} {}",
        feedback.id.dimmed(),
        feedback.stars().yellow(),
        date,
        author
    );
    println!("    {}", feedback.message);
}

async fn list(ctx: &Context) -> Result<()> {
    ctx.enter(&Route::MyFeedbacks).await?;

    let pb = spinner("Loading feedback...");
    let feedbacks = ctx.api.my_feedbacks().await;
    pb.finish_and_clear();
    let feedbacks = feedbacks?;

    if feedbacks.is_empty() {
        println!("You have not submitted any feedback yet.");
        return Ok(());
    }

    println!("Your Feedback");
    println!();
    for feedback in &feedbacks {
        print_feedback(feedback, ctx.date_format());
    }

    Ok(())
}

async fn edit(ctx: &Context, id: &str, message: Option<String>, rating: Option<u8>) -> Result<()> {
    ctx.enter(&Route::MyFeedbacks).await?;

    let existing = ctx
        .api
        .my_feedbacks()
        .await?
        .into_iter()
        .find(|f| f.id == id);
    let Some(existing) = existing else {
        bail!("Feedback {id} not found among your entries");
    };

    let message = match message {
        Some(message) => message,
        None if rating.is_some() => existing.message.clone(),
        None => Input::new()
            .with_prompt("Your feedback")
            .with_initial_text(&existing.message)
            .interact_text()?,
    };

    let (message, rating) = validated(FeedbackForm {
        message,
        rating: rating.unwrap_or(existing.rating),
    })?;

    match ctx.api.update_feedback(id, &message, rating).await? {
        Some(updated) => {
            ctx.notifier.success("Feedback updated successfully");
            print_feedback(&updated, ctx.date_format());
        }
        None => ctx.notifier.success("Feedback updated successfully"),
    }

    Ok(())
}

async fn delete(ctx: &Context, id: &str, force: bool) -> Result<()> {
    ctx.enter(&Route::MyFeedbacks).await?;

    if !force
        && !Confirm::new()
            .with_prompt(format!("Delete feedback {id}?"))
            .default(false)
            .interact()?
    {
        println!("Cancelled.");
        return Ok(());
    }

    ctx.api.delete_feedback(id).await?;
    ctx.notifier.success("Feedback deleted successfully");

    Ok(())
}
