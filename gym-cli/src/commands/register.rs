use anyhow::{bail, Result};
use clap::Args;
use dialoguer::{Input, Password};

use super::{report_form_errors, Context};
use crate::forms::RegisterForm;
use crate::routes::Route;

#[derive(Args)]
pub struct RegisterCommand {
    /// Full name
    #[arg(long)]
    name: Option<String>,

    /// Email address
    #[arg(long)]
    email: Option<String>,

    /// City
    #[arg(long)]
    city: Option<String>,

    /// 10-digit mobile number
    #[arg(long)]
    contact: Option<String>,
}

fn prompt(value: Option<String>, label: &str) -> Result<String> {
    match value {
        Some(value) => Ok(value),
        None => Ok(Input::new().with_prompt(label).interact_text()?),
    }
}

impl RegisterCommand {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        ctx.guard.navigate(&Route::Register);

        println!("Gym App - Create Account");
        println!();

        let form = RegisterForm {
            name: prompt(self.name, "Name")?,
            email: prompt(self.email, "Email")?,
            password: Password::new()
                .with_prompt("Password")
                .with_confirmation("Confirm password", "Passwords do not match")
                .interact()?,
            city: prompt(self.city, "City")?,
            contact: prompt(self.contact, "Contact number")?,
        };

        let request = match form.validate() {
            Ok(request) => request,
            Err(e) => {
                report_form_errors(&e);
                bail!("Registration form has {} invalid field(s)", e.fields.len());
            }
        };

        let message = ctx.api.register(&request).await?;
        ctx.notifier.success(&message);

        println!();
        println!("Next: gym login --email {}", request.email);

        Ok(())
    }
}
