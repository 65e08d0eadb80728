//! Strict profile validation: reject profile files carrying keys the
//! [`PlatformProfile`] does not know.
//!
//! The store file is deliberately not validated this way: it legitimately
//! holds legacy keys that no longer have an option of their own.

use std::path::Path;

use confique::Config;

use crate::error::SettingsError;
use crate::platform::PlatformProfile;

/// Deserialize `content` into the profile layer, collecting every key the
/// layer ignores. Each one is reported with its file path and line number.
pub fn validate_profile_keys(content: &str, path: &Path) -> Result<(), SettingsError> {
    let mut unknown: Vec<String> = Vec::new();

    let deserializer = toml::Deserializer::new(content);
    let _layer: <PlatformProfile as Config>::Layer =
        serde_ignored::deserialize(deserializer, |ignored| unknown.push(ignored.to_string()))
            .map_err(|e| SettingsError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;

    if unknown.is_empty() {
        return Ok(());
    }

    let errors = unknown
        .into_iter()
        .map(|key| SettingsError::UnknownKey {
            line: key_line(content, &key),
            key,
            path: path.to_path_buf(),
        })
        .collect();
    Err(SettingsError::UnknownKeys(errors))
}

/// 1-indexed line of a dotted key, tracking `[section]` headers. 0 when the
/// key cannot be located (quoted keys, inline tables).
fn key_line(content: &str, dotted_key: &str) -> usize {
    let (section, leaf) = match dotted_key.rsplit_once('.') {
        Some((s, l)) => (s, l),
        None => ("", dotted_key),
    };

    let mut current = String::new();
    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if let Some(header) = trimmed.strip_prefix('[')
            && !header.starts_with('[')
        {
            current = header
                .trim_end_matches(']')
                .split('.')
                .map(str::trim)
                .collect::<Vec<_>>()
                .join(".");
            continue;
        }
        if current == section
            && let Some(rest) = trimmed.strip_prefix(leaf)
            && rest.trim_start().starts_with('=')
        {
            return i + 1;
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn path() -> PathBuf {
        PathBuf::from("/etc/wawona/platform.toml")
    }

    fn single_unknown(content: &str) -> (String, usize) {
        match validate_profile_keys(content, &path()).unwrap_err() {
            SettingsError::UnknownKeys(errors) => match errors.into_iter().next() {
                Some(SettingsError::UnknownKey { key, line, .. }) => (key, line),
                other => panic!("Expected UnknownKey, got: {other:?}"),
            },
            other => panic!("Expected UnknownKeys, got: {other:?}"),
        }
    }

    #[test]
    fn valid_profile_passes() {
        let content = r#"
name = "ios"
socket_dir = "/tmp"
xwayland_available = false

[constants]
modifier_swap = true
"#;
        assert!(validate_profile_keys(content, &path()).is_ok());
    }

    #[test]
    fn empty_profile_passes() {
        assert!(validate_profile_keys("", &path()).is_ok());
    }

    #[test]
    fn unknown_top_level_key_has_line() {
        let (key, line) = single_unknown("name = \"x\"\n\nsocket = \"/tmp\"\n");
        assert_eq!(key, "socket");
        assert_eq!(line, 3);
    }

    #[test]
    fn unknown_constant_is_dotted() {
        let (key, line) = single_unknown("name = \"x\"\n[constants]\nuse_metal4 = true\n");
        assert_eq!(key, "constants.use_metal4");
        assert_eq!(line, 3);
    }

    #[test]
    fn same_leaf_in_other_section_is_not_matched() {
        let (key, line) =
            single_unknown("[constants]\nmodifier_swap = true\n\n[extra]\nmodifier_swap = 1\n");
        assert_eq!(key, "extra");
        assert_eq!(line, 0);
    }

    #[test]
    fn every_unknown_key_is_reported() {
        match validate_profile_keys("a = 1\nb = 2\n", &path()).unwrap_err() {
            SettingsError::UnknownKeys(errors) => assert_eq!(errors.len(), 2),
            other => panic!("Expected UnknownKeys, got: {other:?}"),
        }
    }
}
