//! The persisted key/value store the settings live in.
//!
//! [`Store`] is the contract the rest of the crate relies on: typed reads with
//! default-on-miss, and writes that are visible to the very next read. A key
//! holding a value of a different type reads as missing.
//!
//! Two implementations ship with the crate: [`MemoryStore`] for tests and
//! embedding, and [`TomlFileStore`], which keeps one flat TOML document on
//! disk and rewrites it on every write using `toml_edit` so that comments and
//! formatting survive.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::SettingsError;
use crate::types::{OptionType, Value};

pub trait Store {
    fn contains(&self, key: &str) -> bool;
    fn get_bool(&self, key: &str, default: bool) -> bool;
    fn get_string(&self, key: &str, default: &str) -> String;
    fn get_int(&self, key: &str, default: i64) -> i64;

    fn set_bool(&mut self, key: &str, value: bool) -> Result<(), SettingsError>;
    fn set_string(&mut self, key: &str, value: &str) -> Result<(), SettingsError>;
    fn set_int(&mut self, key: &str, value: i64) -> Result<(), SettingsError>;
    fn remove(&mut self, key: &str) -> Result<(), SettingsError>;

    /// Read `key` under `ty`, or `None` if it is absent.
    fn get_typed(&self, key: &str, ty: OptionType) -> Option<Value> {
        if !self.contains(key) {
            return None;
        }
        // A present key of the wrong type reads back as the default under both
        // probes; comparing two different defaults tells the cases apart.
        match ty {
            OptionType::Bool => {
                let a = self.get_bool(key, false);
                (a == self.get_bool(key, true)).then_some(Value::Bool(a))
            }
            OptionType::Int => {
                let a = self.get_int(key, 0);
                (a == self.get_int(key, 1)).then_some(Value::Int(a))
            }
            OptionType::String | OptionType::IntString | OptionType::Enum(_) => {
                let a = self.get_string(key, "");
                (a == self.get_string(key, "\0")).then_some(Value::Str(a))
            }
        }
    }

    /// Write a typed value under `key`.
    fn set_value(&mut self, key: &str, value: &Value) -> Result<(), SettingsError> {
        match value {
            Value::Bool(b) => self.set_bool(key, *b),
            Value::Int(i) => self.set_int(key, *i),
            Value::Str(s) => self.set_string(key, s),
        }
    }
}

/// In-memory store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    entries: BTreeMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.entries.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Store for MemoryStore {
    fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.entries
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(default)
    }

    fn get_string(&self, key: &str, default: &str) -> String {
        self.entries
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    }

    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.entries
            .get(key)
            .and_then(Value::as_int)
            .unwrap_or(default)
    }

    fn set_bool(&mut self, key: &str, value: bool) -> Result<(), SettingsError> {
        self.entries.insert(key.to_string(), Value::Bool(value));
        Ok(())
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.entries.insert(key.to_string(), Value::from(value));
        Ok(())
    }

    fn set_int(&mut self, key: &str, value: i64) -> Result<(), SettingsError> {
        self.entries.insert(key.to_string(), Value::Int(value));
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SettingsError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// A flat TOML file. Reads come from the in-memory document; every write is
/// flushed to disk before returning.
#[derive(Debug)]
pub struct TomlFileStore {
    path: PathBuf,
    doc: toml_edit::DocumentMut,
}

impl TomlFileStore {
    /// Open `path`, starting from an empty document if it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(SettingsError::IoError { path, source: e }),
        };
        let doc = content
            .parse()
            .map_err(|e: toml_edit::TomlError| SettingsError::InvalidValue {
                key: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { path, doc })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn item(&self, key: &str) -> Option<&toml_edit::Value> {
        self.doc.get(key).and_then(toml_edit::Item::as_value)
    }

    fn write(&mut self, key: &str, value: toml_edit::Value) -> Result<(), SettingsError> {
        self.doc[key] = toml_edit::Item::Value(value);
        self.flush()
    }

    fn flush(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SettingsError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(&self.path, self.doc.to_string()).map_err(|e| SettingsError::IoError {
            path: self.path.clone(),
            source: e,
        })
    }
}

impl Store for TomlFileStore {
    fn contains(&self, key: &str) -> bool {
        self.item(key).is_some()
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.item(key)
            .and_then(toml_edit::Value::as_bool)
            .unwrap_or(default)
    }

    fn get_string(&self, key: &str, default: &str) -> String {
        self.item(key)
            .and_then(toml_edit::Value::as_str)
            .unwrap_or(default)
            .to_string()
    }

    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.item(key)
            .and_then(toml_edit::Value::as_integer)
            .unwrap_or(default)
    }

    fn set_bool(&mut self, key: &str, value: bool) -> Result<(), SettingsError> {
        self.write(key, value.into())
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.write(key, value.into())
    }

    fn set_int(&mut self, key: &str, value: i64) -> Result<(), SettingsError> {
        self.write(key, value.into())
    }

    fn remove(&mut self, key: &str) -> Result<(), SettingsError> {
        if self.doc.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}
