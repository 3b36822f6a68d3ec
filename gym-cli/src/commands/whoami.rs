use anyhow::Result;
use clap::Args;

use super::{command_for, Context};
use crate::routes::Route;

#[derive(Args)]
pub struct WhoamiCommand {}

impl WhoamiCommand {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        if !ctx.session.current().is_authenticated() {
            println!("You are not logged in.");
            println!();
            println!("Use 'gym login' to authenticate.");
            return Ok(());
        }

        let session = ctx.enter(&Route::UserDashboard).await?;
        let Some(user) = session.user.as_ref() else {
            println!("Authenticated, but the user record is unavailable.");
            return Ok(());
        };

        println!("✓ Authenticated as:");
        println!();
        println!("  Name:    {}", user.name);
        println!("  Email:   {}", user.email);
        println!("  City:    {}", if user.city.is_empty() { "N/A" } else { &user.city });
        println!("  Contact: {}", if user.contact.is_empty() { "N/A" } else { &user.contact });
        println!("  Role:    {}", if user.has_admin_role() { "admin" } else { "member" });
        println!("  User ID: {}", user.id);
        println!();
        println!("Dashboard: {}", command_for(&Route::dashboard_for(user)));

        Ok(())
    }
}
