//! Session commands - login, logout, status, refresh.

use anyhow::{Result, bail};
use chrono::Utc;
use clap::Args;
use serde_json::json;
use smarthire_store::SettingsStore;
use std::sync::Arc;
use tracing::{info, warn};

use super::{open_client, open_client_with};
use crate::navigator::CliNavigator;
use crate::output::{JsonFormatter, StatusOutput, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the login command.
#[derive(Args)]
pub struct LoginArgs {
    /// Account name.
    #[arg(long, short)]
    pub username: String,

    /// Password.
    #[arg(long, short, env = "SMARTHIRE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Runs the login command.
pub async fn login(args: &LoginArgs, cli: &Cli, store: &SettingsStore) -> Result<()> {
    let Some(password) = args.password.as_deref().filter(|p| !p.is_empty()) else {
        bail!("Password required: pass --password or set SMARTHIRE_PASSWORD");
    };

    let client = open_client(cli, store).await?;
    let tokens = client.login(&args.username, password).await?;
    info!(username = %args.username, "Login succeeded");

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!(
                "{}",
                formatter.format_success(&format!(
                    "Logged in as {} (token valid for {}s)",
                    args.username, tokens.expires_in
                ))
            );
        }
        OutputFormat::Json => {
            let output = json!({"username": args.username, "expiresIn": tokens.expires_in});
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }
    Ok(())
}

/// Runs the logout command. The local session is cleared even when the
/// server call fails.
pub async fn logout(cli: &Cli, store: &SettingsStore) -> Result<()> {
    let client = open_client_with(store, Arc::new(CliNavigator::for_logout())).await?;

    let server_ok = match client.logout().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Server logout failed");
            false
        }
    };

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_success("Logged out"));
        }
        OutputFormat::Json => {
            let output = json!({"loggedOut": true, "serverAcknowledged": server_ok});
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }
    Ok(())
}

/// Runs the status command.
pub async fn status(cli: &Cli, store: &SettingsStore) -> Result<()> {
    let settings = store.get().await;
    let session = settings.token_store().session().await;
    let output = StatusOutput::new(&session, &settings, Utc::now());

    match cli.format {
        OutputFormat::Text => println!("{}", TextFormatter::new(!cli.no_color).format_status(&output)),
        OutputFormat::Json => println!("{}", JsonFormatter::new(cli.pretty).format(&output)?),
    }
    Ok(())
}

/// Runs the refresh command.
pub async fn refresh(cli: &Cli, store: &SettingsStore) -> Result<()> {
    let client = open_client(cli, store).await?;
    let tokens = client.refresh_session().await?;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!(
                "{}",
                formatter.format_success(&format!(
                    "Token refreshed (valid for {}s)",
                    tokens.expires_in
                ))
            );
        }
        OutputFormat::Json => {
            let output = json!({"refreshed": true, "expiresIn": tokens.expires_in});
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }
    Ok(())
}
