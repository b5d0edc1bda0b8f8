//! Call command - send an arbitrary API request.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;
use smarthire_core::{ApiRequest, HttpMethod};
use smarthire_store::SettingsStore;
use std::time::Duration;
use tracing::debug;

use super::{open_client, print_value};
use crate::Cli;

/// Arguments for the call command.
#[derive(Args)]
pub struct CallArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE).
    pub method: HttpMethod,

    /// Path relative to the base URL, e.g. /api/seeker/info.
    pub path: String,

    /// JSON payload. Sent as query parameters for GET and DELETE.
    #[arg(long, short)]
    pub data: Option<String>,

    /// Extra header as "Name: value". Repeatable.
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Send without the bearer token.
    #[arg(long)]
    pub skip_auth: bool,

    /// Request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Runs the call command.
pub async fn run(args: &CallArgs, cli: &Cli, store: &SettingsStore) -> Result<()> {
    let request = build_request(args)?;
    debug!(method = %request.method, path = %request.url, "Calling endpoint");

    let client = open_client(cli, store).await?;
    let data = client.execute(&request).await?;
    print_value(cli, &data)
}

fn build_request(args: &CallArgs) -> Result<ApiRequest> {
    let mut request = ApiRequest::new(args.method, &args.path);

    if let Some(raw) = &args.data {
        let payload: Value = serde_json::from_str(raw).context("--data is not valid JSON")?;
        request = request.with_json(payload);
    }
    for (name, value) in &args.headers {
        request = request.header(name, value);
    }
    if let Some(secs) = args.timeout {
        request = request.timeout(Duration::from_secs(secs));
    }
    if args.skip_auth {
        request = request.skip_auth();
    }
    Ok(request)
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected \"Name: value\", got {raw:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("header name is empty in {raw:?}"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
