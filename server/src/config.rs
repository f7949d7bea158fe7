use std::{net::SocketAddr, path::PathBuf};

use domain::{Category, CategoryRoots};
use torrent::{Credentials, DownloadAgent, Url};

#[derive(clap::Args, Clone, Debug)]
pub struct IntakeArgs {
    /// Address the intake service listens on
    #[arg(long, env = "INTAKE_BIND", default_value = "0.0.0.0:8787")]
    pub bind: SocketAddr,

    /// Root directory for movies
    #[arg(long, env = "MOVIES_DIR", default_value = "/EmblyFiles/Movies")]
    pub movies_dir: PathBuf,

    /// Root directory for series
    #[arg(long, env = "SERIES_DIR", default_value = "/EmblyFiles/Series")]
    pub series_dir: PathBuf,

    /// Newline delimited JSON log of every accepted magnet
    #[arg(long, env = "QUEUE_FILE", default_value = "/data/queue.jsonl")]
    pub queue_file: PathBuf,

    /// aria2c executable name or path
    #[arg(long, env = "ARIA2C_BIN", default_value = "aria2c")]
    pub aria2c_bin: PathBuf,
}

#[derive(Debug, Clone)]
pub struct IntakeConfig {
    pub movies_dir: PathBuf,
    pub series_dir: PathBuf,
    pub queue_file: PathBuf,
    pub download_agent: DownloadAgent,
}

impl From<IntakeArgs> for IntakeConfig {
    fn from(args: IntakeArgs) -> Self {
        Self {
            movies_dir: args.movies_dir,
            series_dir: args.series_dir,
            queue_file: args.queue_file,
            download_agent: DownloadAgent::new(args.aria2c_bin),
        }
    }
}

#[derive(clap::Args, Clone, Debug)]
pub struct GatewayArgs {
    /// Address the gateway listens on
    #[arg(long, env = "GATEWAY_BIND", default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,

    /// Shared secret callers send as `Authorization: Bearer <token>`
    #[arg(long, env = "API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Fallback root for anything without a configured category root
    #[arg(long, env = "DOWNLOADS_ROOT", default_value = "/downloads")]
    pub downloads_root: String,

    #[arg(long, env = "MOVIES_ROOT")]
    pub movies_root: Option<String>,

    #[arg(long, env = "ANIME_MOVIES_ROOT")]
    pub anime_movies_root: Option<String>,

    #[arg(long, env = "SERIES_ROOT")]
    pub series_root: Option<String>,

    #[arg(long, env = "ANIME_SERIES_ROOT")]
    pub anime_series_root: Option<String>,

    /// Base url of the qBittorrent Web UI
    #[arg(long, env = "QB_URL", default_value = "http://qbittorrent:8080")]
    pub qb_url: Url,

    #[arg(long, env = "QB_USER")]
    pub qb_user: Option<String>,

    #[arg(long, env = "QB_PASS", hide_env_values = true)]
    pub qb_pass: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub api_token: Box<str>,
    pub downloads_root: String,
    pub category_roots: CategoryRoots,
    pub qb_url: Url,
    /// `None` is reported per request, the gateway still starts.
    pub credentials: Option<Credentials>,
}

impl GatewayConfig {
    /// The url as configured, without the trailing slash `Url` adds.
    pub fn qb_url_display(&self) -> &str {
        self.qb_url.as_str().trim_end_matches('/')
    }
}

impl TryFrom<GatewayArgs> for GatewayConfig {
    type Error = ConfigError;

    fn try_from(args: GatewayArgs) -> Result<Self, Self::Error> {
        let api_token = non_empty(args.api_token).ok_or(ConfigError::MissingApiToken)?;

        let category_roots = CategoryRoots::new()
            .with_root(Category::Movies, non_empty(args.movies_root))
            .with_root(Category::AnimeMovies, non_empty(args.anime_movies_root))
            .with_root(Category::Series, non_empty(args.series_root))
            .with_root(Category::AnimeSeries, non_empty(args.anime_series_root));

        let credentials = match (non_empty(args.qb_user), non_empty(args.qb_pass)) {
            (Some(username), Some(password)) => Some(Credentials {
                username: username.into(),
                password: password.into(),
            }),
            _ => None,
        };

        Ok(Self {
            api_token: api_token.into(),
            downloads_root: args.downloads_root,
            category_roots,
            qb_url: args.qb_url,
            credentials,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingApiToken,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingApiToken => {
                f.write_str("API_TOKEN is not set. Refusing to run insecurely.")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use domain::Category;
    use torrent::Url;

    use crate::config::{ConfigError, GatewayArgs, GatewayConfig};

    fn args() -> GatewayArgs {
        GatewayArgs {
            bind: "127.0.0.1:0".parse().unwrap(),
            api_token: Some("secret".to_string()),
            downloads_root: "/downloads".to_string(),
            movies_root: Some("/media/Movies".to_string()),
            anime_movies_root: Some(String::new()),
            series_root: None,
            anime_series_root: Some("/media/AnimeSeries/".to_string()),
            qb_url: Url::parse("http://qbittorrent:8080").unwrap(),
            qb_user: Some("admin".to_string()),
            qb_pass: Some("adminadmin".to_string()),
        }
    }

    #[test]
    fn test_gateway_config() {
        let config = GatewayConfig::try_from(args()).unwrap();

        assert_eq!(&*config.api_token, "secret");
        assert_eq!(config.category_roots.get(Category::Movies), Some("/media/Movies"));
        assert_eq!(config.category_roots.get(Category::AnimeMovies), None);
        assert_eq!(config.category_roots.get(Category::Series), None);
        assert_eq!(
            config.category_roots.get(Category::AnimeSeries),
            Some("/media/AnimeSeries")
        );
        assert_eq!(config.qb_url_display(), "http://qbittorrent:8080");
        assert!(config.credentials.is_some());
    }

    #[test]
    fn test_refuses_to_start_without_token() {
        let mut missing = args();
        missing.api_token = None;
        assert_eq!(
            GatewayConfig::try_from(missing).unwrap_err(),
            ConfigError::MissingApiToken
        );

        let mut blank = args();
        blank.api_token = Some("   ".to_string());
        assert_eq!(
            GatewayConfig::try_from(blank).unwrap_err(),
            ConfigError::MissingApiToken
        );
    }

    #[test]
    fn test_partial_credentials_count_as_missing() {
        let mut no_password = args();
        no_password.qb_pass = Some(String::new());

        assert!(
            GatewayConfig::try_from(no_password)
                .unwrap()
                .credentials
                .is_none()
        );
    }
}
