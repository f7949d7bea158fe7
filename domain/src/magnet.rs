use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, de};

static MAGNET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^magnet:\?xt=urn:btih:[a-zA-Z0-9]+").expect("Hardcoded magnet pattern to be valid")
});

/// Prefix check only, trailing `&dn=...&tr=...` parameters are not inspected.
pub fn is_valid_magnet(magnet: &str) -> bool {
    MAGNET_PATTERN.is_match(magnet)
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    Movies,
    AnimeMovies,
    Series,
    AnimeSeries,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Movies,
        Category::AnimeMovies,
        Category::Series,
        Category::AnimeSeries,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Movies => "Movies",
            Category::AnimeMovies => "AnimeMovies",
            Category::Series => "Series",
            Category::AnimeSeries => "AnimeSeries",
        }
    }

    /// Categories stored as `<show>/SeasonNN`.
    pub fn is_series(self) -> bool {
        matches!(self, Category::Series | Category::AnimeSeries)
    }

    pub fn from_name(name: &str) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|category| category.name() == name)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Body of `POST /api/magnet`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MagnetRequest {
    pub magnet: String,
    #[serde(default)]
    pub title: Option<String>,
    /// `2020` or `"2020"`, an empty string counts as missing.
    #[serde(default, deserialize_with = "lenient_year")]
    pub year: Option<i32>,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub season: Option<u32>,
    /// Validated but not used for foldering yet.
    #[serde(default)]
    pub episode: Option<u32>,
}

impl MagnetRequest {
    /// Checks everything that doesn't depend on configuration.
    pub fn validate(&self) -> Result<(), MagnetRequestError> {
        if !is_valid_magnet(&self.magnet) {
            return Err(MagnetRequestError::InvalidMagnet);
        }
        if self.season == Some(0) {
            return Err(MagnetRequestError::InvalidSeason);
        }
        if self.episode == Some(0) {
            return Err(MagnetRequestError::InvalidEpisode);
        }

        Ok(())
    }
}

fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Integer(i32),
        Text(String),
    }

    match Option::<Lenient>::deserialize(deserializer)? {
        Some(Lenient::Integer(year)) => Ok(Some(year)),
        Some(Lenient::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse()
                .map(Some)
                .map_err(|_| de::Error::custom(format!("invalid year: {text:?}")))
        }
        None => Ok(None),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MagnetRequestError {
    InvalidMagnet,
    InvalidSeason,
    InvalidEpisode,
}

impl std::fmt::Display for MagnetRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MagnetRequestError::InvalidMagnet => f.write_str("Invalid magnet link format"),
            MagnetRequestError::InvalidSeason => f.write_str("Season must be 1 or greater"),
            MagnetRequestError::InvalidEpisode => f.write_str("Episode must be 1 or greater"),
        }
    }
}

impl std::error::Error for MagnetRequestError {}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MagnetResponse {
    pub received: bool,
    pub queued_in_qbittorrent: bool,
    pub title: Option<String>,
    pub year: Option<i32>,
    pub save_path: String,
}

#[cfg(test)]
mod tests {
    use crate::magnet::{Category, MagnetRequest, MagnetRequestError, is_valid_magnet};

    const MAGNET: &str = "magnet:?xt=urn:btih:0123456789abcdef0123456789ABCDEF01234567&dn=Show";

    fn request(magnet: &str) -> MagnetRequest {
        MagnetRequest {
            magnet: magnet.to_string(),
            title: None,
            year: None,
            folder: None,
            category: None,
            season: None,
            episode: None,
        }
    }

    #[test]
    fn test_magnet_shape() {
        assert!(is_valid_magnet(MAGNET));
        assert!(is_valid_magnet("magnet:?xt=urn:btih:A"));
        assert!(!is_valid_magnet("MAGNET:?xt=urn:btih:abc"));
        assert!(!is_valid_magnet("magnet:?xt=urn:btih:"));
        assert!(!is_valid_magnet("magnet:?xt=urn:sha1:abc"));
        assert!(!is_valid_magnet(" magnet:?xt=urn:btih:abc"));
        assert!(!is_valid_magnet("https://example.org/file.torrent"));
    }

    #[test]
    fn test_category_names() {
        for category in Category::ALL {
            assert_eq!(Category::from_name(category.name()), Some(category));
        }
        assert_eq!(Category::from_name("series"), None);
        assert!(Category::Series.is_series());
        assert!(Category::AnimeSeries.is_series());
        assert!(!Category::AnimeMovies.is_series());
    }

    #[test]
    fn test_deserialize_magnet_request() {
        let parsed: MagnetRequest = serde_json::from_str(&format!(
            r#"{{"magnet":"{MAGNET}","category":"AnimeSeries","season":2,"episode":5,"year":2020}}"#
        ))
        .unwrap();

        assert_eq!(parsed.category, Some(Category::AnimeSeries));
        assert_eq!(parsed.season, Some(2));
        assert_eq!(parsed.year, Some(2020));

        assert!(serde_json::from_str::<MagnetRequest>(r#"{"title":"No magnet"}"#).is_err());
        assert!(
            serde_json::from_str::<MagnetRequest>(&format!(
                r#"{{"magnet":"{MAGNET}","category":"Documentaries"}}"#
            ))
            .is_err()
        );
    }

    #[test]
    fn test_deserialize_year() {
        let year = |value: &str| {
            serde_json::from_str::<MagnetRequest>(&format!(
                r#"{{"magnet":"{MAGNET}","year":{value}}}"#
            ))
            .map(|request| request.year)
        };

        assert_eq!(year("2020").unwrap(), Some(2020));
        assert_eq!(year(r#""2020""#).unwrap(), Some(2020));
        assert_eq!(year(r#"" 1999 ""#).unwrap(), Some(1999));
        assert_eq!(year(r#""""#).unwrap(), None);
        assert_eq!(year("null").unwrap(), None);
        assert!(year(r#""twenty""#).is_err());
        assert!(year("20.5").is_err());

        let missing: MagnetRequest =
            serde_json::from_str(&format!(r#"{{"magnet":"{MAGNET}"}}"#)).unwrap();
        assert_eq!(missing.year, None);
    }

    #[test]
    fn test_validate() {
        assert_eq!(request(MAGNET).validate(), Ok(()));
        assert_eq!(
            request("not a magnet").validate(),
            Err(MagnetRequestError::InvalidMagnet)
        );

        let mut zero_season = request(MAGNET);
        zero_season.season = Some(0);
        assert_eq!(
            zero_season.validate(),
            Err(MagnetRequestError::InvalidSeason)
        );

        let mut zero_episode = request(MAGNET);
        zero_episode.episode = Some(0);
        assert_eq!(
            zero_episode.validate(),
            Err(MagnetRequestError::InvalidEpisode)
        );
    }
}
