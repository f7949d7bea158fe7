mod api_types;
pub mod download_agent;
mod qbittorrent_web_api;

pub use reqwest::Url;

pub use api_types::{AddTorrentForm, ContentLayout};
pub use download_agent::{DownloadAgent, DownloadAgentError};
pub use qbittorrent_web_api::{
    Credentials, QBittorrentSession, QBittorrentWebApiError, QBittorrentWebApiResult,
};
