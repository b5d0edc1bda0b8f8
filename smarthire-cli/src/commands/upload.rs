//! Upload command - send a file as multipart form data.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;
use smarthire_core::MultipartForm;
use smarthire_store::SettingsStore;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{open_client, print_value};
use crate::Cli;

/// Arguments for the upload command.
#[derive(Args)]
pub struct UploadArgs {
    /// Upload endpoint, e.g. /seeker/resume/upload.
    pub path: String,

    /// File to upload.
    #[arg(long)]
    pub file: PathBuf,

    /// Form field name for the file.
    #[arg(long, default_value = "file")]
    pub field: String,

    /// Extra text field as "key=value". Repeatable.
    #[arg(long = "form", value_parser = parse_form_field)]
    pub fields: Vec<(String, String)>,
}

/// Runs the upload command.
pub async fn run(args: &UploadArgs, cli: &Cli, store: &SettingsStore) -> Result<()> {
    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let file_name = args
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    info!(file = %file_name, bytes = bytes.len(), path = %args.path, "Uploading");

    let mut form = MultipartForm::new();
    for (key, value) in &args.fields {
        form = form.text(key, value);
    }
    let content_type = content_type_for(&args.file).map(str::to_string);
    form = form.file(&args.field, file_name, content_type, bytes);

    let client = open_client(cli, store).await?;
    let data: Value = client.upload(&args.path, form).await?;
    print_value(cli, &data)
}

/// MIME type for the document and image formats the backend accepts.
fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "txt" => "text/plain",
        _ => return None,
    };
    Some(mime)
}

fn parse_form_field(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))?;
    if key.is_empty() {
        return Err(format!("field name is empty in {raw:?}"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for(Path::new("cv.PDF")), Some("application/pdf"));
        assert_eq!(content_type_for(Path::new("avatar.jpeg")), Some("image/jpeg"));
        assert_eq!(content_type_for(Path::new("archive.zip")), None);
        assert_eq!(content_type_for(Path::new("README")), None);
    }

    #[test]
    fn test_parse_form_field() {
        assert_eq!(
            parse_form_field("resumeName=My CV").unwrap(),
            ("resumeName".to_string(), "My CV".to_string())
        );
        assert_eq!(
            parse_form_field("note=a=b").unwrap(),
            ("note".to_string(), "a=b".to_string())
        );
        assert!(parse_form_field("missing").is_err());
        assert!(parse_form_field("=x").is_err());
    }
}
