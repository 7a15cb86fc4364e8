use clap::Subcommand;
use serde_json::json;
use std::sync::Arc;

use crate::cli::utils::{output_error, output_success, prompt};
use crate::cli::{AppContext, OutputFormat};
use crate::error::AuthError;
use crate::login::{LoginFlow, LoginStep, SystemClock};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login with an emailed one-time code")]
    Login {
        #[arg(long, help = "Email address (prompted if not provided)")]
        email: Option<String>,
        #[arg(long, help = "Role identifier, e.g. procurement (prompted if not provided)")]
        role: Option<String>,
    },

    #[command(about = "Logout and clear the local session")]
    Logout,

    #[command(about = "Show the current user from the backend")]
    Whoami,

    #[command(about = "Show local session status")]
    Status,
}

pub async fn handle(
    cmd: AuthCommands,
    ctx: &AppContext,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, role } => login(ctx, email, role, &output_format).await,
        AuthCommands::Logout => {
            ctx.auth.logout().await;
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Whoami => match ctx.auth.current_user().await {
            Ok(user) => output_success(
                &output_format,
                &format!("{} <{}>", user.full_name, user.email),
                Some(json!({ "user": user })),
            ),
            Err(e) => {
                output_error(&output_format, &e.to_string(), None)?;
                std::process::exit(1);
            }
        },
        AuthCommands::Status => {
            match ctx.store.read() {
                Some(session) => output_success(
                    &output_format,
                    &format!(
                        "Authenticated as {} ({})",
                        session.user.email, session.user.role
                    ),
                    Some(json!({
                        "role": session.user.role,
                        "permissions": session.user.permissions,
                    })),
                )?,
                None => output_success(&output_format, "Not authenticated", None)?,
            }
            Ok(())
        }
    }
}

/// Drive the two-step login state machine interactively.
async fn login(
    ctx: &AppContext,
    email_arg: Option<String>,
    role_arg: Option<String>,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    let mut flow = LoginFlow::new(
        Arc::clone(&ctx.auth),
        Arc::clone(&ctx.navigator),
        Arc::new(SystemClock),
        ctx.config.login.resend_cooldown_secs,
    );

    // Step one: collect email and role until the backend accepts them.
    // Values passed as flags get one attempt; prompted values can be retried.
    let prompted = email_arg.is_none() && role_arg.is_none();
    while flow.step() == LoginStep::Email {
        let email = match &email_arg {
            Some(e) => e.clone(),
            None => prompt("Email")?,
        };
        let role = match &role_arg {
            Some(r) => r.clone(),
            None => prompt("Role")?,
        };

        match flow.submit_email(&email, &role).await {
            Ok(issued) => {
                println!("Verification code sent to {}", issued.email);
                if let Some(otp) = issued.otp {
                    // Development-only echo from the backend.
                    println!("(dev) code: {}", otp);
                }
            }
            Err(e) => {
                report(output_format, &e)?;
                if !prompted {
                    std::process::exit(1);
                }
            }
        }
    }

    // Step two: collect the code; "resend" and "back" stay in the flow.
    loop {
        match flow.step() {
            LoginStep::Email => {
                // back() was taken; start over from the email step.
                let email = prompt("Email")?;
                let role = prompt("Role")?;
                match flow.submit_email(&email, &role).await {
                    Ok(issued) => println!("Verification code sent to {}", issued.email),
                    Err(e) => report(output_format, &e)?,
                }
            }
            LoginStep::AwaitingCode => {
                let entry = prompt("Code (or 'resend' / 'back')")?;
                match entry.as_str() {
                    "back" => flow.back(),
                    "resend" => match flow.resend().await {
                        Ok(issued) => println!("Verification code re-sent to {}", issued.email),
                        Err(e) => report(output_format, &e)?,
                    },
                    code => match flow.submit_code(code).await {
                        Ok(route) => {
                            return output_success(
                                output_format,
                                &format!("Logged in, landing at {}", route),
                                Some(json!({ "route": route })),
                            );
                        }
                        Err(e) => report(output_format, &e)?,
                    },
                }
            }
        }
    }
}

fn report(output_format: &OutputFormat, err: &AuthError) -> anyhow::Result<()> {
    match err {
        AuthError::InvalidInput { field, message } => {
            output_error(output_format, message, Some(field))
        }
        other => output_error(output_format, &other.to_string(), None),
    }
}
