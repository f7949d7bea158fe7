//! Intake service: turns a captured magnet into a media folder, a queue line
//! and a running aria2c process.

pub mod queue;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use axum::{
    Json, Router,
    extract::{self, rejection::JsonRejection},
    http::{
        HeaderValue, StatusCode,
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
    },
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use domain::{FolderNameError, IntakeRequest, IntakeResponse, MediaKind, QueueRecord};
use log::{error, info, warn};
use serde_json::json;
use torrent::DownloadAgentError;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::IntakeConfig;

pub type State = extract::State<Arc<IntakeConfig>>;

/// Every response carries wide open CORS headers. This is meant for a LAN
/// and a browser extension, not for the internet.
pub fn router(config: Arc<IntakeConfig>) -> Router {
    Router::new()
        .route("/intake", post(intake).options(intake_preflight))
        .route("/health", get(health))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS, GET"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type, Authorization, X-Auth-Token"),
        ))
        .with_state(config)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

async fn intake_preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn intake(
    extract::State(config): State,
    payload: Result<Json<IntakeRequest>, JsonRejection>,
) -> Result<Json<IntakeResponse>, IntakeError> {
    // A body we can't read is handled like an empty one
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Unreadable intake body. Reason: {}", rejection.body_text());
            IntakeRequest::default()
        }
    };

    let title = request.title.trim();
    if title.is_empty() {
        return Err(IntakeError::MissingTitle);
    }
    let magnet = request.magnet.trim();
    if magnet.is_empty() {
        return Err(IntakeError::MissingMagnet);
    }

    // 1. Create the destination folder
    let folder = ensure_folder(&config, title, &request.year, &request.media_type).await?;

    // 2. Log the request
    let record = QueueRecord::new(Utc::now(), &request, folder.to_string_lossy());
    queue::append(&config.queue_file, &record).await?;

    // 3. Hand the magnet to aria2c
    config.download_agent.start(magnet, &folder)?;

    info!("Queued {title} into {}", folder.display());

    Ok(Json(IntakeResponse {
        ok: true,
        created_folder: folder.to_string_lossy().into_owned(),
        message: "Download started".to_string(),
    }))
}

pub fn target_base_dir<'a>(config: &'a IntakeConfig, media_type: &str) -> &'a Path {
    match MediaKind::from_type_field(media_type) {
        MediaKind::Series => config.series_dir.as_path(),
        MediaKind::Movie => config.movies_dir.as_path(),
    }
}

/// Creates `<root>/<title> (<year>)` if needed and returns it.
pub async fn ensure_folder(
    config: &IntakeConfig,
    title: &str,
    year: &str,
    media_type: &str,
) -> Result<PathBuf, IntakeError> {
    let folder_name = domain::folder_name(title, year)?;
    let folder = target_base_dir(config, media_type).join(folder_name);

    tokio::fs::create_dir_all(&folder).await.map_err(|err| {
        IntakeError::CantCreateFolder(
            format!(
                "Couldn't create media dir at {}. Reason: {err}",
                folder.display()
            )
            .into(),
        )
    })?;

    Ok(folder)
}

#[derive(Debug)]
pub enum IntakeError {
    MissingTitle,
    MissingMagnet,
    InvalidFolderName(FolderNameError),
    CantCreateFolder(Box<str>),
    CantWriteQueue(Box<str>),
    CantStartDownload(DownloadAgentError),
}

impl IntakeError {
    fn status(&self) -> StatusCode {
        match self {
            IntakeError::MissingTitle
            | IntakeError::MissingMagnet
            | IntakeError::InvalidFolderName(_) => StatusCode::BAD_REQUEST,
            IntakeError::CantCreateFolder(_)
            | IntakeError::CantWriteQueue(_)
            | IntakeError::CantStartDownload(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<FolderNameError> for IntakeError {
    fn from(value: FolderNameError) -> Self {
        IntakeError::InvalidFolderName(value)
    }
}

impl From<DownloadAgentError> for IntakeError {
    fn from(value: DownloadAgentError) -> Self {
        IntakeError::CantStartDownload(value)
    }
}

impl std::fmt::Display for IntakeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntakeError::MissingTitle => f.write_str("Missing title"),
            IntakeError::MissingMagnet => f.write_str("Missing magnet link"),
            IntakeError::InvalidFolderName(err) => f.write_fmt(format_args!("{err}")),
            IntakeError::CantCreateFolder(reason) | IntakeError::CantWriteQueue(reason) => {
                f.write_str(reason)
            }
            IntakeError::CantStartDownload(err) => f.write_fmt(format_args!("{err}")),
        }
    }
}

impl std::error::Error for IntakeError {}

impl IntoResponse for IntakeError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_client_error() {
            warn!("Rejected intake request. Reason: {self}");
        } else {
            error!("Intake request failed. Reason: {self}");
        }

        (
            status,
            Json(json!({ "ok": false, "error": self.to_string() })),
        )
            .into_response()
    }
}
