use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /intake`. Every field is optional on the wire; emptiness is
/// checked by the handler after trimming.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct IntakeRequest {
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    /// Browsers send this either as `"1999"` or `1999`.
    #[serde(deserialize_with = "lenient_string")]
    pub year: String,
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub media_type: String,
    #[serde(deserialize_with = "lenient_string")]
    pub magnet: String,
    #[serde(rename = "pageUrl", deserialize_with = "lenient_string")]
    pub page_url: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Movie,
    Series,
}

impl MediaKind {
    /// Only `series` (any case) selects the series tree.
    pub fn from_type_field(media_type: &str) -> Self {
        if media_type.trim().eq_ignore_ascii_case("series") {
            MediaKind::Series
        } else {
            MediaKind::Movie
        }
    }
}

/// One line of the queue file.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueueRecord {
    #[serde(rename = "ts")]
    pub timestamp: String,
    pub title: String,
    pub year: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub folder: String,
    pub magnet: String,
    #[serde(rename = "pageUrl")]
    pub page_url: String,
}

impl QueueRecord {
    pub fn new(
        at: DateTime<Utc>,
        request: &IntakeRequest,
        folder: impl Into<String>,
    ) -> QueueRecord {
        QueueRecord {
            timestamp: at.to_rfc3339_opts(SecondsFormat::Micros, true),
            title: request.title.trim().to_string(),
            year: request.year.trim().to_string(),
            media_type: match request.media_type.trim() {
                "" => "movie".to_string(),
                media_type => media_type.to_lowercase(),
            },
            folder: folder.into(),
            magnet: request.magnet.trim().to_string(),
            page_url: request.page_url.trim().to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct IntakeResponse {
    pub ok: bool,
    #[serde(rename = "createdFolder")]
    pub created_folder: String,
    pub message: String,
}

/// Accepts strings, numbers and `null`.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(match Option::<Lenient>::deserialize(deserializer)? {
        Some(Lenient::Text(text)) => text,
        Some(Lenient::Integer(number)) => number.to_string(),
        Some(Lenient::Float(number)) => number.to_string(),
        None => String::new(),
    })
}
