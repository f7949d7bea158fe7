//! Folder names derived from user supplied titles.
//!
//! Names produced here are safe on Windows shares, SMB mounts and Synology
//! volumes: none of [`FORBIDDEN_CHARS`] survives and the length is bounded.

/// Characters rejected by common network filesystems.
pub const FORBIDDEN_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Upper bound for a sanitized name, in characters.
pub const MAX_NAME_LEN: usize = 120;

/// Replaces every run of forbidden characters with a single space, collapses
/// whitespace and caps the result at [`MAX_NAME_LEN`] characters.
pub fn sanitize_name(input: &str) -> String {
    let replaced: String = input
        .trim()
        .chars()
        .map(|char| {
            if FORBIDDEN_CHARS.contains(&char) {
                ' '
            } else {
                char
            }
        })
        .collect();

    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");

    collapsed
        .chars()
        .take(MAX_NAME_LEN)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Keeps the first four ASCII digits of `input`.
pub fn sanitize_year(input: &str) -> String {
    input
        .chars()
        .filter(|char| char.is_ascii_digit())
        .take(4)
        .collect()
}

/// `"{title} ({year})"`, or just the title when no year digits are left.
pub fn folder_name(title: &str, year: &str) -> Result<String, FolderNameError> {
    let safe_title = sanitize_name(title);
    if safe_title.is_empty() {
        return Err(FolderNameError::EmptyAfterSanitization);
    }
    // `.` and `..` would point at the root itself or its parent
    if is_dots_only(&safe_title) {
        return Err(FolderNameError::DotsOnly);
    }

    let safe_year = sanitize_year(year);
    if safe_year.is_empty() {
        return Ok(safe_title);
    }

    Ok(format!("{safe_title} ({safe_year})"))
}

pub fn is_dots_only(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|char| char == '.')
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderNameError {
    EmptyAfterSanitization,
    DotsOnly,
}

impl std::fmt::Display for FolderNameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FolderNameError::EmptyAfterSanitization => {
                f.write_str("Empty folder name after sanitization")
            }
            FolderNameError::DotsOnly => f.write_str("Folder name can't consist of dots only"),
        }
    }
}

impl std::error::Error for FolderNameError {}
