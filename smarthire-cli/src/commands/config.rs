//! Config command - manage configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use smarthire_core::AppFlavor;
use smarthire_store::{BASE_URL_ENV, SettingsStore, default_config_dir, default_session_path};
use tracing::info;

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Set the backend base URL.
    SetBaseUrl {
        /// Base URL, e.g. https://api.example.com/smarthire/api.
        url: String,
    },

    /// Set which app this client acts as (seeker, hr, admin).
    SetApp {
        /// App flavor.
        app: AppFlavor,
    },

    /// Reset to defaults.
    Reset,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli, store: &SettingsStore) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli, store).await,
        ConfigAction::Path => show_paths(cli, store),
        ConfigAction::SetBaseUrl { url } => set_base_url(url, store).await,
        ConfigAction::SetApp { app } => set_app(*app, store).await,
        ConfigAction::Reset => reset_config(store).await,
    }
}

async fn show_config(cli: &Cli, store: &SettingsStore) -> Result<()> {
    let settings = store.get().await;

    match cli.format {
        OutputFormat::Text => {
            println!("SmartHire Configuration");
            println!("{}", "─".repeat(40));
            println!();
            match store.base_url_override() {
                Some(_) => println!(
                    "Base URL:      {} (from {BASE_URL_ENV})",
                    settings.api_base_url
                ),
                None => println!("Base URL:      {}", settings.api_base_url),
            }
            println!("App:           {}", settings.app);
            println!("Login route:   {}", settings.login_route());
            println!("Timeout:       {}ms", settings.timeout_ms);
            println!("Token storage: {}", settings.token_storage);
            if settings.allowed_domains.is_empty() {
                println!("Domains:       (any)");
            } else {
                println!("Domains:       {}", settings.allowed_domains.join(", "));
            }
            println!("Log level:     {}", settings.log_level);
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&settings)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli, store: &SettingsStore) -> Result<()> {
    let config_dir = default_config_dir();
    let session_path = default_session_path();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:    {}", config_dir.display());
            println!("Settings file: {}", store.path().display());
            println!("Session file:  {}", session_path.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "settings_file": store.path().display().to_string(),
                "session_file": session_path.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn set_base_url(url: &str, store: &SettingsStore) -> Result<()> {
    store.set_base_url(url).await?;
    store.save().await?;

    let url = store.stored().await.api_base_url;
    info!(url = %url, "Base URL updated");
    println!("Base URL set to: {url}");
    if let Some(active) = store.base_url_override() {
        println!("Note: {BASE_URL_ENV} is set and still wins for this shell ({active})");
    }

    Ok(())
}

async fn set_app(app: AppFlavor, store: &SettingsStore) -> Result<()> {
    store.update(|s| s.app = app).await;
    store.save().await?;

    info!(app = %app, "App updated");
    println!("App set to: {app} (login route {})", app.login_route());

    Ok(())
}

async fn reset_config(store: &SettingsStore) -> Result<()> {
    let path = store.path();

    if path.exists() {
        tokio::fs::remove_file(path).await?;
        store.reset().await;
        info!(path = %path.display(), "Settings reset");
        println!("Configuration reset to defaults");
    } else {
        println!("No configuration file to reset");
    }

    Ok(())
}
