// src/config.rs
use crate::error::AppError;
use crate::resolver;
use crate::types::{DocumentRef, ExportFormat};
use clap::Parser;
use std::path::PathBuf;

/// Parsed and validated command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    /// Document URL (Google Sheets, Feishu docx/sheet, or DingTalk)
    pub url: String,

    /// Target export format (xlsx or csv)
    #[arg(short, long, default_value = "xlsx")]
    pub format: String,

    /// Directory the exported file is saved into (defaults to the current directory)
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// Application credentials for the Feishu open API, issued per tenant.
#[derive(Debug, Clone)]
pub struct FeishuCredentials {
    pub app_id: String,
    pub app_secret: String,
}

impl FeishuCredentials {
    /// Reads `FEISHU_APP_ID` / `FEISHU_APP_SECRET` from the environment.
    pub fn from_env() -> Result<Self, AppError> {
        let app_id = require_env("FEISHU_APP_ID")?;
        let app_secret = require_env("FEISHU_APP_SECRET")?;
        Ok(Self { app_id, app_secret })
    }
}

fn require_env(name: &str) -> Result<String, AppError> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            AppError::MissingConfiguration(format!("{} environment variable not set", name))
        })
}

/// Resolved export configuration — validated and ready to drive the workflow.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub doc: DocumentRef,
    pub format: ExportFormat,
    pub output_dir: PathBuf,
    /// Present only when the resolved provider needs the token workflow.
    pub credentials: Option<FeishuCredentials>,
    pub verbose: bool,
}

impl ExportConfig {
    /// Resolves a complete export configuration from CLI input and environment.
    ///
    /// Credentials are only required when the URL resolves to a provider
    /// that uses the authenticated export-task workflow; a Google export
    /// runs without any.
    pub fn resolve(cli: CommandLineInput) -> Result<Self, AppError> {
        let doc = resolver::resolve(&cli.url).ok_or_else(|| {
            AppError::Validation(format!(
                "URL matches no supported document provider: {}",
                cli.url
            ))
        })?;

        let format: ExportFormat = cli
            .format
            .parse()
            .map_err(|e| AppError::Validation(format!("{}", e)))?;

        let credentials = if doc.provider.uses_export_tasks() {
            Some(FeishuCredentials::from_env()?)
        } else {
            None
        };

        let output_dir = cli
            .output_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            doc,
            format,
            output_dir,
            credentials,
            verbose: cli.verbose,
        })
    }
}

/// Resolved relay server configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub port: u16,
    pub credentials: FeishuCredentials,
}

impl RelayConfig {
    /// Resolves the relay configuration from the environment. The relay
    /// only serves the authenticated workflow, so credentials are always
    /// required; `PORT` falls back to the default.
    pub fn from_env() -> Result<Self, AppError> {
        let credentials = FeishuCredentials::from_env()?;
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|_| {
                AppError::Validation(format!("PORT is not a valid port number: {}", raw))
            })?,
            Err(_) => crate::constants::RELAY_DEFAULT_PORT,
        };
        Ok(Self { port, credentials })
    }
}
