// src/bin/relay.rs
//! Standalone HTTP relay binary.
//!
//! Reads `FEISHU_APP_ID`, `FEISHU_APP_SECRET` and optionally `PORT` from
//! the environment and serves the export relay until killed.

use doc2sheet::{relay, DocumentExporter, FeishuClient, RelayConfig};
use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    Config,
};
use std::sync::Arc;

fn setup_logging() -> Result<(), Box<dyn std::error::Error>> {
    let stdout_appender = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout_appender)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info))?;

    log4rs::init_config(config)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_logging()?;

    let config = RelayConfig::from_env()?;
    let client = FeishuClient::new(config.credentials.app_id, config.credentials.app_secret)?;

    // The relay never persists payloads itself; the output directory is
    // only there to satisfy the exporter's construction.
    let exporter = Arc::new(DocumentExporter::new(client, std::env::temp_dir())?);

    relay::serve(exporter, config.port).await?;

    Ok(())
}
