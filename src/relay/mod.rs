// src/relay/mod.rs
//! HTTP relay for the export workflow.
//!
//! Browser-side callers that cannot talk to the provider API directly
//! post a document URL here; the relay runs the export-task workflow and
//! hands back the file token of the finished export. The payload download
//! stays on the caller's side — it needs the bearer header, which the
//! relay exposes via the reported download URL shape.
//!
//! Routes:
//! - `POST /api/export {url, format?}` → `{success, fileToken}`
//! - `GET  /api/health` → `{success, message, timestamp}`

use crate::api::FeishuClient;
use crate::error::AppError;
use crate::exporter::DocumentExporter;
use crate::resolver;
use crate::types::ExportFormat;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};

type SharedExporter = Arc<DocumentExporter<FeishuClient>>;

#[derive(Debug, Deserialize)]
struct ExportRequest {
    url: String,
    /// Target format; defaults to xlsx like the original extension flow.
    #[serde(default)]
    format: Option<ExportFormat>,
}

#[derive(Debug, Serialize)]
struct ExportResponse {
    success: bool,
    #[serde(rename = "fileToken", skip_serializing_if = "Option::is_none")]
    file_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ExportResponse {
    fn ok(file_token: String) -> Self {
        Self {
            success: true,
            file_token: Some(file_token),
            message: Some("Export successful".to_string()),
            error: None,
        }
    }

    fn err(message: String) -> Self {
        Self {
            success: false,
            file_token: None,
            message: None,
            error: Some(message),
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    success: bool,
    message: &'static str,
    timestamp: String,
}

/// Builds the relay router with CORS open to any origin, matching the
/// original relay's deployment next to a browser extension.
pub fn router(exporter: SharedExporter) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/export", post(handle_export))
        .route("/api/health", get(handle_health))
        .with_state(exporter)
        .layer(cors)
}

/// Binds and serves the relay until the process exits.
pub async fn serve(exporter: SharedExporter, port: u16) -> Result<(), AppError> {
    let app = router(exporter);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Relay listening on {}", addr);
    log::info!("Health check: http://localhost:{}/api/health", port);
    log::info!("Export endpoint: http://localhost:{}/api/export", port);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn handle_export(
    State(exporter): State<SharedExporter>,
    Json(request): Json<ExportRequest>,
) -> (StatusCode, Json<ExportResponse>) {
    log::info!("Received export request for URL: {}", request.url);

    let Some(doc) = resolver::resolve(&request.url) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ExportResponse::err(
                "Invalid or unsupported document URL".to_string(),
            )),
        );
    };
    if !doc.provider.uses_export_tasks() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ExportResponse::err(format!(
                "Only Feishu documents can be exported through the relay (got {})",
                doc.provider
            ))),
        );
    }

    let format = request.format.unwrap_or(ExportFormat::Xlsx);
    let (_keep_alive, cancel) = watch::channel(false);

    match exporter.export_file_token(&doc, format, cancel).await {
        Ok(file_token) => (StatusCode::OK, Json(ExportResponse::ok(file_token))),
        Err(error) => {
            log::error!("Export request failed: {}", error);
            (status_for(&error), Json(ExportResponse::err(error.to_string())))
        }
    }
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "Relay server is running",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Maps workflow errors onto HTTP statuses: caller-fixable problems are
/// 400, provider-side and local failures are 500.
fn status_for(error: &AppError) -> StatusCode {
    match error {
        AppError::Validation(_)
        | AppError::UnsupportedProvider(_)
        | AppError::ProviderApi { .. }
        | AppError::Auth { .. }
        | AppError::NotFound(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
