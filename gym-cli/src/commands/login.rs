use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use dialoguer::{Input, Password};

use super::{command_for, report_form_errors, Context};
use crate::forms::LoginForm;
use crate::routes::Route;

#[derive(Args)]
pub struct LoginCommand {
    /// Account email (prompted when omitted)
    #[arg(short, long)]
    email: Option<String>,

    /// Path to continue to after logging in, e.g. /dashboard/admin/plans
    #[arg(long)]
    return_to: Option<String>,
}

impl LoginCommand {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        ctx.guard.navigate(&Route::Login {
            return_to: self.return_to.clone(),
        });

        println!("Gym App - Login");
        println!();

        let email = match self.email {
            Some(email) => email,
            None => Input::new().with_prompt("Email").interact_text()?,
        };
        let password = Password::new().with_prompt("Password").interact()?;

        let form = LoginForm { email, password };
        let (email, password) = match form.validate() {
            Ok(credentials) => credentials,
            Err(e) => {
                report_form_errors(&e);
                bail!("Please fill in all fields");
            }
        };

        println!();
        println!("Logging in as {}...", email);

        let login = ctx.api.login(&email, &password).await?;
        ctx.notifier.success(&login.message);

        let Some(user) = login.session.user.as_ref() else {
            return Ok(());
        };

        println!();
        println!("Welcome, {}!", user.name.bold());
        println!("Email: {}", user.email);
        if user.has_admin_role() {
            println!("Role:  {}", "admin".cyan());
        }

        let next = Route::after_login(user, self.return_to.as_deref());
        println!();
        println!("Next: {}", command_for(&next));

        Ok(())
    }
}
