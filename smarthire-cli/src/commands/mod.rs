//! CLI command implementations.

pub mod call;
pub mod config;
pub mod session;
pub mod upload;

use anyhow::Result;
use serde_json::Value;
use smarthire_fetch::{ApiClient, Navigator};
use smarthire_store::SettingsStore;
use std::sync::Arc;

use crate::navigator::CliNavigator;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Builds an API client from the loaded settings.
pub async fn open_client(cli: &Cli, store: &SettingsStore) -> Result<ApiClient> {
    open_client_with(store, Arc::new(CliNavigator::new(cli.quiet))).await
}

/// Builds an API client that reports login redirects to `navigator`.
pub async fn open_client_with(
    store: &SettingsStore,
    navigator: Arc<dyn Navigator>,
) -> Result<ApiClient> {
    let settings = store.get().await;
    let client = ApiClient::builder()
        .settings(&settings)
        .navigator(navigator)
        .build()?;
    Ok(client)
}

/// Prints an API payload in the selected format.
pub fn print_value(cli: &Cli, value: &Value) -> Result<()> {
    match cli.format {
        OutputFormat::Text => println!("{}", TextFormatter::new(!cli.no_color).format_value(value)),
        OutputFormat::Json => println!("{}", JsonFormatter::new(cli.pretty).format(value)?),
    }
    Ok(())
}
