//! Where qBittorrent should put a torrent.
//!
//! Every path leaving this module is rooted at either a configured category
//! root or the generic downloads root, and never contains a `..` segment.

use std::collections::HashMap;

use crate::magnet::{Category, MagnetRequest};
use crate::naming::{is_dots_only, sanitize_name};

/// Category name -> absolute base directory. Empty entries count as missing,
/// `/` is a valid root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryRoots(HashMap<Category, String>);

impl CategoryRoots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(mut self, category: Category, root: Option<impl Into<String>>) -> Self {
        if let Some(root) = root.map(Into::<String>::into) {
            let trimmed = root.trim_end_matches('/');
            if !trimmed.is_empty() {
                self.0.insert(category, trimmed.to_string());
            } else if !root.is_empty() {
                self.0.insert(category, "/".to_string());
            }
        }
        self
    }

    pub fn get(&self, category: Category) -> Option<&str> {
        self.0.get(&category).map(String::as_str)
    }

    pub fn configured(&self) -> impl Iterator<Item = (Category, &str)> {
        Category::ALL
            .into_iter()
            .filter_map(|category| Some((category, self.get(category)?)))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavePath {
    pub path: String,
    /// Ask the client not to wrap the torrent in its own top-level folder.
    pub flatten_layout: bool,
}

#[derive(Clone, Debug)]
pub struct SavePathResolver<'a> {
    pub downloads_root: &'a str,
    pub category_roots: &'a CategoryRoots,
}

impl SavePathResolver<'_> {
    pub fn resolve(&self, request: &MagnetRequest) -> Result<SavePath, SavePathError> {
        let folder = request.folder.as_deref().filter(|folder| !folder.is_empty());

        // 1. Category with a configured root
        if let Some(category) = request.category {
            if let Some(root) = self.category_roots.get(category) {
                if category.is_series() {
                    return series_save_path(root, request);
                }

                return Ok(SavePath {
                    path: safe_join(root, folder)?,
                    flatten_layout: false,
                });
            }

            // 2. Category without a root becomes a plain subfolder
            let subpath = match folder {
                Some(folder) => format!("{category}/{folder}"),
                None => category.to_string(),
            };

            return Ok(SavePath {
                path: safe_join(self.downloads_root, Some(&subpath))?,
                flatten_layout: false,
            });
        }

        // 3. Older clients put the category name into `folder`
        if let Some(root) = folder
            .and_then(Category::from_name)
            .and_then(|category| self.category_roots.get(category))
        {
            return Ok(SavePath {
                path: root.to_string(),
                flatten_layout: false,
            });
        }

        // 4. Plain subfolder of the downloads root
        Ok(SavePath {
            path: safe_join(self.downloads_root, folder)?,
            flatten_layout: false,
        })
    }
}

/// `<root>/<show>/SeasonNN`
fn series_save_path(root: &str, request: &MagnetRequest) -> Result<SavePath, SavePathError> {
    let season = request.season.ok_or(SavePathError::MissingSeason)?;
    if season == 0 {
        return Err(SavePathError::MissingSeason);
    }

    let show_folder = series_folder(request);
    let show_path = safe_join(root, Some(&show_folder))?;

    Ok(SavePath {
        path: format!("{show_path}/{}", season_folder(season)),
        flatten_layout: true,
    })
}

/// The explicit `folder`, otherwise `"{title} ({year})"` with `Untitled` as a
/// stand in for a missing title.
pub fn series_folder(request: &MagnetRequest) -> String {
    if let Some(folder) = request.folder.as_deref().filter(|folder| !folder.is_empty()) {
        return folder.to_string();
    }

    let title = request
        .title
        .as_deref()
        .map(sanitize_name)
        .filter(|title| !title.is_empty() && !is_dots_only(title))
        .unwrap_or_else(|| "Untitled".to_string());

    match request.year {
        Some(year) => format!("{title} ({year})"),
        None => title,
    }
}

pub fn season_folder(season: u32) -> String {
    format!("Season{season:02}")
}

/// Joins `subpath` under `root`, refusing anything that could climb out of it.
/// Without a subpath the root comes back untouched.
pub fn safe_join(root: &str, subpath: Option<&str>) -> Result<String, SavePathError> {
    let subpath = match subpath {
        Some(subpath) if !subpath.is_empty() => subpath,
        _ => return Ok(root.to_string()),
    };

    let normalized = subpath.replace('\\', "/");
    let normalized = normalized.trim_start_matches('/');

    if normalized.split('/').any(|segment| segment == "..") {
        return Err(SavePathError::Traversal);
    }

    if normalized.is_empty() {
        return Ok(root.to_string());
    }

    Ok(format!("{}/{normalized}", root.trim_end_matches('/')))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavePathError {
    Traversal,
    MissingSeason,
}

impl std::fmt::Display for SavePathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SavePathError::Traversal => f.write_str("Invalid folder path"),
            SavePathError::MissingSeason => {
                f.write_str("Season is required for series categories")
            }
        }
    }
}

impl std::error::Error for SavePathError {}
