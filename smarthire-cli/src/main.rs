// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! SmartHire CLI - talk to the SmartHire backend from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Log in (password from the environment)
//! SMARTHIRE_PASSWORD=secret smarthire login -u alice
//!
//! # Who am I, and when does the token expire?
//! smarthire status
//!
//! # Call any endpoint; 401s are refreshed transparently
//! smarthire call GET /api/seeker/info
//! smarthire call POST /hr/jobs --data '{"title":"Rust Engineer"}'
//!
//! # Upload a resume
//! smarthire upload /seeker/resume/upload --file cv.pdf --field resumeFile
//!
//! # JSON output
//! smarthire --format json --pretty status
//! ```

mod commands;
mod navigator;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use smarthire_fetch::ApiError;
use smarthire_store::{LogLevel, SettingsStore};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{call, config, session, upload};

// ============================================================================
// CLI Definition
// ============================================================================

/// SmartHire CLI - authenticated access to the SmartHire API.
#[derive(Parser)]
#[command(name = "smarthire")]
#[command(about = "SmartHire API client")]
#[command(long_about = r#"
SmartHire API client with automatic token refresh.

Sessions are stored between runs. Expired access tokens are refreshed on
the first 401; if the refresh token is also expired you will be asked to
log in again.

Examples:
  smarthire login -u alice -p secret  # Log in
  smarthire status                    # Show the current session
  smarthire call GET /api/seeker/info # Call an endpoint
  smarthire config show               # Show configuration
"#)]
#[command(version)]
#[command(author = "SmartHire Team")]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the session.
    Login(session::LoginArgs),

    /// Log out and clear the stored session.
    Logout,

    /// Show the stored session.
    #[command(visible_alias = "s")]
    Status,

    /// Exchange the refresh token for a new access token.
    Refresh,

    /// Call an API endpoint.
    #[command(visible_alias = "c")]
    Call(call::CallArgs),

    /// Upload a file as multipart form data.
    Upload(upload::UploadArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// General error.
    Error = 1,
    /// Session ended; log in again.
    AuthRequired = 2,
    /// Backend unreachable.
    Network = 3,
}

impl ExitCode {
    fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<ApiError>() {
            Some(ApiError::Unauthorized { .. }) => ExitCode::AuthRequired,
            Some(ApiError::Network(_)) => ExitCode::Network,
            _ => ExitCode::Error,
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, level: LogLevel) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("smarthire=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.filter_directive()))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let store = SettingsStore::load_default().await?;
    setup_logging(cli.verbose, cli.quiet, store.get().await.log_level);

    let result = match &cli.command {
        Commands::Login(args) => session::login(args, &cli, &store).await,
        Commands::Logout => session::logout(&cli, &store).await,
        Commands::Status => session::status(&cli, &store).await,
        Commands::Refresh => session::refresh(&cli, &store).await,
        Commands::Call(args) => call::run(args, &cli, &store).await,
        Commands::Upload(args) => upload::run(args, &cli, &store).await,
        Commands::Config(args) => config::run(args, &cli, &store).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(ExitCode::for_error(&e) as i32);
    }

    Ok(())
}
