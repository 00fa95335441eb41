//! HTTP handlers.

use crate::core::classifier::QUALITY_TABLE;
use crate::models::webhook::WebhookPayload;
use crate::server::pipeline::process_download;
use crate::server::AppState;
use crate::utils::fs::VIDEO_EXTENSIONS;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::Instrument;
use uuid::Uuid;

/// Number of trailing log lines returned by `/logs`.
const LOG_TAIL_LINES: usize = 100;

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn internal_error() -> Response {
    reply(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "Internal server error" }),
    )
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub async fn webhook(State(state): State<AppState>, body: Bytes) -> Response {
    let value = match serde_json::from_slice::<Value>(&body) {
        Ok(value) if !value.is_null() => value,
        _ => {
            tracing::error!("No JSON payload received");
            return reply(StatusCode::BAD_REQUEST, json!({ "error": "No JSON payload" }));
        }
    };

    // Non-download events only need their type; keep it even if the rest is malformed.
    let (payload, malformed) = match WebhookPayload::deserialize(&value) {
        Ok(payload) => (payload, None),
        Err(e) => (
            WebhookPayload {
                event_type: value
                    .get("eventType")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                ..Default::default()
            },
            Some(e),
        ),
    };
    tracing::info!("Received webhook: {}", payload.event_type());

    if !payload.is_download() {
        tracing::info!("Ignoring event type: {}", payload.event_type());
        return reply(StatusCode::OK, json!({ "message": "Event ignored" }));
    }

    if let Some(e) = malformed {
        tracing::error!("Malformed download payload: {}", e);
        return invalid_payload();
    }

    let (Some(movie), Some(file)) = (payload.movie, payload.movie_file) else {
        tracing::error!("Missing movie or movieFile data in payload");
        return invalid_payload();
    };
    let Some(source_path) = file.resolve_path(&movie) else {
        tracing::error!("Payload has no usable file path");
        return invalid_payload();
    };

    let span = tracing::info_span!(
        "event",
        id = %Uuid::new_v4(),
        movie = %movie.title(),
        year = ?movie.year,
    );
    let result = process_download(&state, &movie, &file, source_path)
        .instrument(span)
        .await;

    if result.success {
        reply(
            StatusCode::OK,
            json!({ "message": "Successfully processed 4K movie", "details": result }),
        )
    } else {
        reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": "Failed to process movie", "details": result }),
        )
    }
}

fn invalid_payload() -> Response {
    reply(
        StatusCode::BAD_REQUEST,
        json!({ "error": "Invalid payload structure" }),
    )
}

/// Effective configuration. API keys are never included.
pub async fn config(State(state): State<AppState>) -> Json<Value> {
    let config = &state.config;
    Json(json!({
        "plex_naming_enabled": config.naming.enabled,
        "quality_suffix_enabled": config.naming.add_quality_suffix,
        "append_to_original_name": config.naming.append_to_original_name,
        "radarr_main_url": config.catalog.main.url,
        "radarr_4k_url": config.catalog.uhd.url,
        "config_directory": config.config_dir.display().to_string(),
        "log_file": state.log_file.display().to_string(),
    }))
}

pub async fn quality_mappings(State(state): State<AppState>) -> Json<Value> {
    let mappings: BTreeMap<&str, &str> = QUALITY_TABLE
        .iter()
        .map(|(name, tier)| (*name, tier.label()))
        .collect();

    Json(json!({
        "mappings": mappings,
        "total_mappings": mappings.len(),
        "plex_naming_enabled": state.config.naming.enabled,
        "quality_suffix_enabled": state.config.naming.add_quality_suffix,
        "supported_video_extensions": VIDEO_EXTENSIONS
            .iter()
            .map(|ext| format!(".{}", ext))
            .collect::<Vec<_>>(),
        "uhd_folder_markers": state.relocator.classifier().uhd_folder_markers(),
    }))
}

/// Tail of the log file.
pub async fn logs(State(state): State<AppState>) -> Response {
    let content = match tokio::fs::read_to_string(&state.log_file).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return reply(
                StatusCode::OK,
                json!({ "logs": [], "message": "No log file found" }),
            );
        }
        Err(e) => {
            tracing::error!("Error reading log file {}: {}", state.log_file.display(), e);
            return internal_error();
        }
    };

    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(LOG_TAIL_LINES);
    let recent: Vec<&str> = lines[start..].iter().map(|l| l.trim()).collect();

    reply(
        StatusCode::OK,
        json!({
            "logs": recent,
            "total_lines": lines.len(),
            "showing_lines": recent.len(),
        }),
    )
}
