//! Magnet gateway: authenticated front door for qBittorrent.
//!
//! Each request runs auth, validation, save path resolution, login and
//! submission in that order, with a fresh qBittorrent session that is dropped
//! when the handler returns.

pub mod auth;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{self, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use domain::{MagnetRequest, MagnetRequestError, MagnetResponse, SavePathError, SavePathResolver};
use log::{debug, error, info, warn};
use serde_json::json;
use torrent::{AddTorrentForm, ContentLayout, QBittorrentSession, QBittorrentWebApiError};

use crate::config::GatewayConfig;

pub type State = extract::State<Arc<GatewayConfig>>;

pub fn router(config: Arc<GatewayConfig>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/magnet", post(add_magnet))
        .with_state(config)
}

async fn health(extract::State(config): State) -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "qb_url": config.qb_url_display() }))
}

async fn add_magnet(
    extract::State(config): State,
    headers: HeaderMap,
    payload: Result<Json<MagnetRequest>, JsonRejection>,
) -> Result<Json<MagnetResponse>, GatewayError> {
    auth::require_token(&config.api_token, &headers)?;

    let Json(request) =
        payload.map_err(|rejection| GatewayError::InvalidBody(rejection.body_text().into()))?;
    request.validate()?;

    let save_path = SavePathResolver {
        downloads_root: &config.downloads_root,
        category_roots: &config.category_roots,
    }
    .resolve(&request)?;

    debug!(
        "Resolved save path {} for category {:?}, folder {:?}",
        save_path.path, request.category, request.folder
    );

    let credentials = config
        .credentials
        .as_ref()
        .ok_or(GatewayError::MissingCredentials)?;

    let session =
        QBittorrentSession::try_new(&config.qb_url).map_err(GatewayError::LoginFailed)?;
    session
        .login(credentials)
        .await
        .map_err(GatewayError::LoginFailed)?;

    let form = {
        let form = AddTorrentForm::new(&request.magnet, &save_path.path);
        if save_path.flatten_layout {
            form.with_content_layout(ContentLayout::NoSubfolder)
        } else {
            form
        }
    };
    session
        .add_torrent(&form)
        .await
        .map_err(GatewayError::AddFailed)?;

    info!(
        "Queued {} in qBittorrent at {}",
        request.title.as_deref().unwrap_or("untitled magnet"),
        save_path.path
    );

    Ok(Json(MagnetResponse {
        received: true,
        queued_in_qbittorrent: true,
        title: request.title,
        year: request.year,
        save_path: save_path.path,
    }))
}

#[derive(Debug)]
pub enum GatewayError {
    MissingBearerToken,
    InvalidToken,
    InvalidBody(Box<str>),
    InvalidRequest(MagnetRequestError),
    InvalidSavePath(SavePathError),
    MissingCredentials,
    LoginFailed(QBittorrentWebApiError),
    AddFailed(QBittorrentWebApiError),
}

impl GatewayError {
    fn status(&self) -> StatusCode {
        match self {
            GatewayError::MissingBearerToken => StatusCode::UNAUTHORIZED,
            GatewayError::InvalidToken => StatusCode::FORBIDDEN,
            GatewayError::InvalidBody(_)
            | GatewayError::InvalidRequest(_)
            | GatewayError::InvalidSavePath(_) => StatusCode::BAD_REQUEST,
            GatewayError::MissingCredentials => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::LoginFailed(_) | GatewayError::AddFailed(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// What the caller sees. Upstream details only go to the log.
    fn detail(&self) -> String {
        match self {
            GatewayError::MissingBearerToken => "Missing bearer token".to_string(),
            GatewayError::InvalidToken => "Invalid token".to_string(),
            GatewayError::InvalidBody(reason) => reason.to_string(),
            GatewayError::InvalidRequest(err) => err.to_string(),
            GatewayError::InvalidSavePath(err) => err.to_string(),
            GatewayError::MissingCredentials => {
                "qBittorrent credentials not configured".to_string()
            }
            GatewayError::LoginFailed(_) => "qBittorrent login failed".to_string(),
            GatewayError::AddFailed(QBittorrentWebApiError::CantAddTorrent { status }) => {
                format!("qBittorrent add failed (HTTP {})", status.as_u16())
            }
            GatewayError::AddFailed(_) => "qBittorrent add failed".to_string(),
        }
    }
}

impl From<MagnetRequestError> for GatewayError {
    fn from(value: MagnetRequestError) -> Self {
        GatewayError::InvalidRequest(value)
    }
}

impl From<SavePathError> for GatewayError {
    fn from(value: SavePathError) -> Self {
        GatewayError::InvalidSavePath(value)
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::LoginFailed(err) | GatewayError::AddFailed(err) => {
                f.write_fmt(format_args!("{}. Reason: {err}", self.detail()))
            }
            _ => f.write_str(&self.detail()),
        }
    }
}

impl std::error::Error for GatewayError {}

impl IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Magnet request failed. {self}");
        } else {
            warn!("Rejected magnet request. {self}");
        }

        (status, Json(json!({ "detail": self.detail() }))).into_response()
    }
}
