//! Platform profile: the data that differs between the platforms Wawona runs on.
//!
//! The profile is an ordinary layered config struct. Defaults describe Android;
//! other targets ship a profile file and/or set `WAWONA_*` environment
//! variables. Layers, highest priority first:
//!
//! 1. Environment variables (`WAWONA_PLATFORM`, `WAWONA_SOCKET_DIR`, ...)
//! 2. Profile files, last listed wins
//! 3. `#[config(default)]` values

use std::path::{Path, PathBuf};

use confique::Config;
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::validate;

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlatformProfile {
    /// Platform name, used in log output.
    #[config(default = "android", env = "WAWONA_PLATFORM")]
    pub name: String,

    /// Directory the platform creates the waypipe socket in.
    #[config(
        default = "/data/user/0/com.aspauldingcode.wawona/cache",
        env = "WAWONA_SOCKET_DIR"
    )]
    pub socket_dir: String,

    /// Whether xwayland-satellite can run on this platform.
    #[config(default = false, env = "WAWONA_XWAYLAND")]
    pub xwayland_available: bool,

    /// Native parameters with no user-facing option on this platform.
    #[config(nested)]
    pub constants: NativeConstants,
}

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NativeConstants {
    /// Server-side decorations are always forced.
    #[config(default = true)]
    pub server_side_decorations: bool,

    /// Host pointer overlay; meaningless without a host cursor.
    #[config(default = false)]
    pub render_pointer_overlay: bool,

    /// Swap the command and control modifiers.
    #[config(default = false)]
    pub modifier_swap: bool,

    /// Experimental composite path for nested compositors.
    #[config(default = false)]
    pub experimental_composite_mode: bool,

    /// The Rust waypipe transport is always built in.
    #[config(default = true)]
    pub transport_rs_support: bool,

    /// The TCP listener was removed; the port is still sent.
    #[config(default = false)]
    pub tcp_listener_enabled: bool,
}

impl PlatformProfile {
    /// Path of the waypipe socket inside the platform socket directory.
    pub fn socket_path(&self) -> String {
        format!("{}/waypipe", self.socket_dir.trim_end_matches('/'))
    }

    /// Load the profile from environment, `files` (priority-ascending) and
    /// defaults. Missing files are skipped. With `strict`, unknown keys in a
    /// file are an error.
    pub fn load(files: &[PathBuf], strict: bool) -> Result<Self, SettingsError> {
        let mut layers = Vec::new();
        for path in files {
            if let Some(layer) = read_layer(path, strict)? {
                layers.push(layer);
            }
        }

        let mut builder = Self::builder().env();
        // confique gives the first source the highest priority.
        for layer in layers.into_iter().rev() {
            builder = builder.preloaded(layer);
        }
        let profile = builder.load()?;
        tracing::debug!(
            platform = %profile.name,
            socket_dir = %profile.socket_dir,
            "loaded platform profile"
        );
        Ok(profile)
    }

    /// Parse a single profile document on top of the defaults. No environment.
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, SettingsError> {
        validate::validate_profile_keys(content, path)?;
        let layer = parse_layer(content, path)?;
        Ok(Self::builder().preloaded(layer).load()?)
    }
}

type ProfileLayer = <PlatformProfile as Config>::Layer;

fn read_layer(path: &Path, strict: bool) -> Result<Option<ProfileLayer>, SettingsError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(SettingsError::IoError {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    if strict {
        validate::validate_profile_keys(&content, path)?;
    }
    parse_layer(&content, path).map(Some)
}

fn parse_layer(content: &str, path: &Path) -> Result<ProfileLayer, SettingsError> {
    toml::from_str(content).map_err(|e| SettingsError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_describe_android() {
        let profile = PlatformProfile::builder().load().unwrap();
        assert_eq!(profile.name, "android");
        assert!(!profile.xwayland_available);
        assert!(profile.constants.server_side_decorations);
        assert!(profile.constants.transport_rs_support);
        assert!(!profile.constants.tcp_listener_enabled);
        assert!(!profile.constants.render_pointer_overlay);
    }

    #[test]
    fn socket_path_joins_dir() {
        let mut profile = PlatformProfile::builder().load().unwrap();
        profile.socket_dir = "/tmp/wawona/".into();
        assert_eq!(profile.socket_path(), "/tmp/wawona/waypipe");
    }

    #[test]
    fn from_toml_overrides_defaults() {
        let content = r#"
name = "ios"
socket_dir = "/var/mobile/tmp"

[constants]
modifier_swap = true
"#;
        let profile = PlatformProfile::from_toml(content, Path::new("ios.toml")).unwrap();
        assert_eq!(profile.name, "ios");
        assert_eq!(profile.socket_path(), "/var/mobile/tmp/waypipe");
        assert!(profile.constants.modifier_swap);
        assert!(profile.constants.server_side_decorations);
    }

    #[test]
    fn from_toml_rejects_unknown_keys() {
        let result = PlatformProfile::from_toml("socket_dri = \"/x\"\n", Path::new("p.toml"));
        assert!(matches!(result, Err(SettingsError::UnknownKeys(_))));
    }

    #[test]
    fn later_file_wins() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("base.toml");
        let local = dir.path().join("local.toml");
        fs::write(&base, "name = \"base\"\nxwayland_available = true\n").unwrap();
        fs::write(&local, "name = \"local\"\n").unwrap();

        let profile = PlatformProfile::load(&[base, local], true).unwrap();
        assert_eq!(profile.name, "local");
        assert!(profile.xwayland_available);
    }

    #[test]
    fn missing_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        let profile = PlatformProfile::load(&[dir.path().join("absent.toml")], true).unwrap();
        assert_eq!(profile.constants, PlatformProfile::builder().load().unwrap().constants);
    }

    #[test]
    fn lenient_load_ignores_unknown_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profile.toml");
        fs::write(&path, "future_key = 1\nname = \"desktop\"\n").unwrap();

        assert!(PlatformProfile::load(std::slice::from_ref(&path), true).is_err());
        let profile = PlatformProfile::load(&[path], false).unwrap();
        assert_eq!(profile.name, "desktop");
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "name = \n").unwrap();
        let result = PlatformProfile::load(&[path], false);
        assert!(matches!(result, Err(SettingsError::ParseError { .. })));
    }
}
