use std::time::Duration;

use log::{debug, warn};
use reqwest::{Client, StatusCode, Url};

use crate::api_types::{AddTorrentForm, LoginForm};

const LOGIN_TIMEOUT: Duration = Duration::from_secs(10);
const ADD_TORRENT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: Box<str>,
    pub password: Box<str>,
}

/// One login and whatever calls follow it. The cookie jar lives and dies with
/// the session, nothing is shared between sessions.
#[derive(Debug)]
pub struct QBittorrentSession {
    client: Client,
    base_url: Url,
}

impl QBittorrentSession {
    pub fn try_new(base_url: &Url) -> QBittorrentWebApiResult<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|err| QBittorrentWebApiError::CantBuildClient(err.to_string().into()))?;

        Ok(Self {
            client,
            base_url: base_url.clone(),
        })
    }

    pub async fn login(&self, credentials: &Credentials) -> QBittorrentWebApiResult<()> {
        let url = self.endpoint("api/v2/auth/login")?;

        let response = self
            .client
            .post(url)
            .timeout(LOGIN_TIMEOUT)
            .form(&LoginForm {
                username: &credentials.username,
                password: &credentials.password,
            })
            .send()
            .await
            .map_err(|err| QBittorrentWebApiError::CouldntCallApi(err.to_string().into()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| QBittorrentWebApiError::CantGetTextContent(err.to_string().into()))?;

        if status != StatusCode::OK || body.trim() != "Ok." {
            warn!("qBittorrent refused the login. Status: {status}, body: {body}");
            return Err(QBittorrentWebApiError::LoginRejected(
                format!("Api returned {status} with body {body}").into(),
            ));
        }

        debug!("Logged in to qBittorrent at {}", self.base_url);

        Ok(())
    }

    pub async fn add_torrent(&self, form: &AddTorrentForm<'_>) -> QBittorrentWebApiResult<()> {
        let url = self.endpoint("api/v2/torrents/add")?;

        let response = self
            .client
            .post(url)
            .timeout(ADD_TORRENT_TIMEOUT)
            .form(form)
            .send()
            .await
            .map_err(|err| QBittorrentWebApiError::CouldntCallApi(err.to_string().into()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(QBittorrentWebApiError::CantAddTorrent { status });
        }

        debug!("qBittorrent accepted a torrent into {}", form.save_path);

        Ok(())
    }

    /// Keeps any path prefix of the base url, e.g. `http://nas/qbittorrent/`.
    fn endpoint(&self, path: &str) -> QBittorrentWebApiResult<Url> {
        let base = format!("{}/", self.base_url.as_str().trim_end_matches('/'));

        Url::parse(&base)
            .and_then(|base| base.join(path))
            .map_err(|err| QBittorrentWebApiError::InvalidUrl(err.to_string().into()))
    }
}

pub type QBittorrentWebApiResult<T> = Result<T, QBittorrentWebApiError>;

#[derive(Debug)]
pub enum QBittorrentWebApiError {
    CantBuildClient(Box<str>),
    InvalidUrl(Box<str>),
    CouldntCallApi(Box<str>),
    CantGetTextContent(Box<str>),
    LoginRejected(Box<str>),
    CantAddTorrent { status: StatusCode },
}

impl std::fmt::Display for QBittorrentWebApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{self:#?}"))
    }
}

impl std::error::Error for QBittorrentWebApiError {}
