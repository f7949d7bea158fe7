pub mod intake;
pub mod magnet;
pub mod naming;
pub mod save_path;

pub use intake::{IntakeRequest, IntakeResponse, MediaKind, QueueRecord};
pub use magnet::{Category, MagnetRequest, MagnetRequestError, MagnetResponse, is_valid_magnet};
pub use naming::{FolderNameError, folder_name, sanitize_name};
pub use save_path::{CategoryRoots, SavePath, SavePathError, SavePathResolver};
