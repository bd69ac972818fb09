use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// `$HOME/.local/state/gallows`, or the platform data dir without `$HOME`
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".local").join("state").join("gallows"))
        } else {
            ProjectDirs::from("", "", "gallows").map(|pd| pd.data_local_dir().to_path_buf())
        }
    }

    pub fn profile_db_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("profile.db"))
    }

    pub fn log_dir() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("logs"))
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "gallows").map(|pd| pd.config_dir().join("config.json"))
    }
}
