use anyhow::{bail, Result};
use clap::{Subcommand, ValueEnum};
use colored::Colorize;
use dialoguer::{Confirm, Input};

use super::{report_form_errors, spinner, Context};
use crate::forms::ContactForm;
use crate::models::ContactStatus;
use crate::routes::Route;

#[derive(Clone, Copy, ValueEnum)]
pub enum StatusFilter {
    Pending,
    Resolved,
}

#[derive(Subcommand)]
pub enum ContactSubcommands {
    /// Send a query to the gym
    Submit {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        city: Option<String>,

        /// 10-digit mobile number
        #[arg(long)]
        phone: Option<String>,

        #[arg(short, long)]
        message: Option<String>,
    },

    /// List contact queries (admin)
    List {
        /// Only show queries with this status
        #[arg(short, long, value_enum)]
        status: Option<StatusFilter>,
    },

    /// Mark a query as resolved (admin)
    Resolve {
        /// Query ID
        id: String,

        /// Set the query back to pending instead
        #[arg(long)]
        reopen: bool,
    },

    /// Delete a query (admin)
    Delete {
        /// Query ID
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

fn prompt(value: Option<String>, label: &str) -> Result<String> {
    match value {
        Some(value) => Ok(value),
        None => Ok(Input::new().with_prompt(label).interact_text()?),
    }
}

impl ContactSubcommands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            ContactSubcommands::Submit {
                name,
                email,
                city,
                phone,
                message,
            } => {
                ctx.enter(&Route::Contact).await?;

                let form = ContactForm {
                    name: prompt(name, "Name")?,
                    email: prompt(email, "Email")?,
                    city: prompt(city, "City")?,
                    phone: prompt(phone, "Phone")?,
                    message: prompt(message, "Message")?,
                };
                let query = match form.validate() {
                    Ok(query) => query,
                    Err(e) => {
                        report_form_errors(&e);
                        bail!("Contact form has {} invalid field(s)", e.fields.len());
                    }
                };

                let response = ctx.api.create_contact(&query).await?;
                ctx.notifier.success(&response);
                Ok(())
            }
            ContactSubcommands::List { status } => {
                ctx.enter(&Route::ContactQueries).await?;

                let pb = spinner("Loading queries...");
                let queries = ctx.api.list_contacts().await;
                pb.finish_and_clear();

                let wanted = status.map(|s| match s {
                    StatusFilter::Pending => ContactStatus::Pending,
                    StatusFilter::Resolved => ContactStatus::Resolved,
                });
                let queries: Vec<_> = queries?
                    .into_iter()
                    .filter(|q| wanted.map_or(true, |s| q.status == s))
                    .collect();

                if queries.is_empty() {
                    println!("No contact queries.");
                    return Ok(());
                }

                for query in &queries {
                    let status = match query.status {
                        ContactStatus::Pending => "pending".yellow(),
                        ContactStatus::Resolved => "resolved".green(),
                        ContactStatus::Unknown => "unknown".dimmed(),
                    };
                    println!(
                        "{} [{}] {} <{}> {} {}",
                        query.id.dimmed(),
                        status,
                        query.name,
                        query.email,
                        query.city,
                        query.phone
                    );
                    println!("    {}", query.message);
                }
                println!();
                println!("{} quer(ies)", queries.len());
                Ok(())
            }
            ContactSubcommands::Resolve { id, reopen } => {
                ctx.enter(&Route::ContactQueries).await?;

                let status = if reopen {
                    ContactStatus::Pending
                } else {
                    ContactStatus::Resolved
                };
                ctx.api.set_contact_status(&id, status).await?;
                ctx.notifier.success(&format!("Query marked as {status}"));
                Ok(())
            }
            ContactSubcommands::Delete { id, force } => {
                ctx.enter(&Route::ContactQueries).await?;

                if !force
                    && !Confirm::new()
                        .with_prompt(format!("Delete query {id}?"))
                        .default(false)
                        .interact()?
                {
                    println!("Cancelled.");
                    return Ok(());
                }

                ctx.api.delete_contact(&id).await?;
                ctx.notifier.success("Query deleted successfully");
                Ok(())
            }
        }
    }
}
