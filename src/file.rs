//! Default on-disk locations for the settings store and the platform profile.
//!
//! Both live in the platform config directory (XDG on Linux, `~/Library/
//! Application Support` on macOS) under the app name:
//!
//! - `settings.toml`: the persisted key space ([`TomlFileStore`](crate::TomlFileStore))
//! - `platform.toml`: an optional [`PlatformProfile`](crate::PlatformProfile) layer

use std::path::PathBuf;

use crate::error::SettingsError;

pub const APP_NAME: &str = "wawona";
pub const STORE_FILE: &str = "settings.toml";
pub const PROFILE_FILE: &str = "platform.toml";

/// Platform config directory for `app_name`, if a home directory is known.
pub fn config_dir(app_name: &str) -> Option<PathBuf> {
    let proj = directories::ProjectDirs::from("", "", app_name)?;
    Some(proj.config_dir().to_path_buf())
}

pub fn default_store_path(app_name: &str) -> Result<PathBuf, SettingsError> {
    config_dir(app_name)
        .map(|dir| dir.join(STORE_FILE))
        .ok_or(SettingsError::NoConfigDir)
}

/// Profile files to layer, priority-ascending. Missing files are fine.
pub fn default_profile_paths(app_name: &str) -> Vec<PathBuf> {
    config_dir(app_name)
        .map(|dir| vec![dir.join(PROFILE_FILE)])
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_and_profile_share_a_directory() {
        // Environments without a home directory resolve nothing at all.
        let Ok(store) = default_store_path(APP_NAME) else {
            assert!(default_profile_paths(APP_NAME).is_empty());
            return;
        };
        let profiles = default_profile_paths(APP_NAME);
        assert_eq!(profiles.len(), 1);
        assert_eq!(store.parent(), profiles[0].parent());
        assert!(store.ends_with(STORE_FILE));
        assert!(profiles[0].ends_with(PROFILE_FILE));
    }

    #[test]
    fn config_dir_mentions_app_name() {
        if let Some(dir) = config_dir(APP_NAME) {
            assert!(dir.to_string_lossy().contains(APP_NAME));
        }
    }
}
