use anyhow::Result;
use clap::Args;

use super::Context;

#[derive(Args)]
pub struct LogoutCommand {}

impl LogoutCommand {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        if !ctx.session.current().is_authenticated() {
            println!("You are not logged in.");
            return Ok(());
        }

        ctx.api.logout().await?;
        ctx.notifier.success("Logged out successfully");

        Ok(())
    }
}
