// src/main.rs

use clap::Parser;
use doc2sheet::{CommandLineInput, DocumentExporter, ExportConfig, FeishuClient};
use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use std::fs;

/// Sets up logging configuration.
fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_file_path = std::env::temp_dir().join("doc2sheet.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    let stdout_appender = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stdout")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Runs the resolved export end to end and reports the saved file.
async fn execute_export(config: &ExportConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Google exports never touch the authenticated client, so missing
    // credentials only matter for the export-task providers — config
    // resolution has already enforced that.
    let (app_id, app_secret) = match &config.credentials {
        Some(creds) => (creds.app_id.clone(), creds.app_secret.clone()),
        None => (String::new(), String::new()),
    };
    let client = FeishuClient::new(app_id, app_secret)?;
    let exporter = DocumentExporter::new(client, &config.output_dir)?;

    println!(
        "📄 Exporting {} as {}...",
        config.doc,
        config.format.extension()
    );

    let result = exporter.export_document(&config.doc, config.format).await?;

    println!("✓ Saved {}", result.saved_path.display());
    log::info!("Download source: {}", result.source_download_url);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose)?;

    let config = ExportConfig::resolve(cli)?;

    execute_export(&config).await?;

    Ok(())
}
