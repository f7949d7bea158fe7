#[derive(serde::Serialize)]
pub(crate) struct LoginForm<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Form body of `api/v2/torrents/add`.
#[derive(serde::Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AddTorrentForm<'a> {
    /// Magnet links or torrent URLs, newline separated
    pub urls: &'a str,
    #[serde(rename = "savepath")]
    pub save_path: &'a str,
    /// Automatic torrent management would override `savepath`
    #[serde(rename = "autoTMM", serialize_with = "serialize_bool_as_str")]
    pub auto_tmm: bool,
    #[serde(rename = "contentLayout", skip_serializing_if = "Option::is_none")]
    pub content_layout: Option<ContentLayout>,
}

impl<'a> AddTorrentForm<'a> {
    pub fn new(urls: &'a str, save_path: &'a str) -> Self {
        Self {
            urls,
            save_path,
            auto_tmm: false,
            content_layout: None,
        }
    }

    pub fn with_content_layout(mut self, content_layout: ContentLayout) -> Self {
        self.content_layout = Some(content_layout);
        self
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentLayout {
    /// Keep whatever the torrent ships with
    Original,
    /// Always wrap files in a folder named after the torrent
    Subfolder,
    /// Put files directly into the save path
    NoSubfolder,
}

/// qBittorrent expects `"true"`/`"false"` in forms.
fn serialize_bool_as_str<S: serde::Serializer>(
    value: &bool,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "true" } else { "false" })
}
