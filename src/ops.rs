//! Settings operations and their displayable results.
//!
//! Provides the logic behind `settings list`, `settings get` and
//! `settings active`, and the `SettingsResult` enum callers use to show
//! results.

use std::fmt;

use crate::apply::ApplyRecord;
use crate::error::SettingsError;
use crate::resolve::ResolvedConfig;
use crate::schema::Schema;
use crate::visibility::ActiveSet;

/// One row of a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: String,
    pub value: String,
    pub active: bool,
}

/// Result of a settings operation. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsResult {
    /// A key's effective value and its description.
    KeyValue {
        key: String,
        value: String,
        doc: String,
        active: bool,
    },
    /// Every option's effective value, in declaration order.
    Listing { entries: Vec<Entry> },
    /// Keys of the currently active options.
    ActiveKeys(Vec<String>),
    ValueSet { key: String, value: String },
    /// A write that was refused and left the store untouched.
    Rejected { key: String, reason: String },
    ValueUnset { key: String },
    Reset,
    Applied(ApplyRecord),
    /// The record that would be applied, as JSON.
    DryRun(String),
}

impl fmt::Display for SettingsResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsResult::KeyValue {
                key,
                value,
                doc,
                active,
            } => {
                if !doc.is_empty() {
                    writeln!(f, "# {doc}")?;
                }
                write!(f, "{key} = {value}")?;
                if !active {
                    write!(f, " (inactive)")?;
                }
                Ok(())
            }
            SettingsResult::Listing { entries } => {
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{} = {}", entry.key, entry.value)?;
                    if !entry.active {
                        write!(f, " (inactive)")?;
                    }
                }
                Ok(())
            }
            SettingsResult::ActiveKeys(keys) => write!(f, "{}", keys.join("\n")),
            SettingsResult::ValueSet { key, value } => write!(f, "Set {key} = {value}"),
            SettingsResult::Rejected { key, reason } => write!(f, "Not set {key}: {reason}"),
            SettingsResult::ValueUnset { key } => write!(f, "Unset {key}"),
            SettingsResult::Reset => write!(f, "All settings reset to defaults"),
            SettingsResult::Applied(record) => {
                write!(f, "Applied settings (record v{})", ApplyRecord::VERSION)?;
                for (param, value) in record.fields() {
                    write!(f, "\n  {}: {value}", param.name())?;
                }
                Ok(())
            }
            SettingsResult::DryRun(json) => write!(f, "{json}"),
        }
    }
}

/// Look up one option's effective value.
pub fn get_value(
    schema: &Schema,
    resolved: &ResolvedConfig,
    active: &ActiveSet,
    key: &str,
) -> Result<SettingsResult, SettingsError> {
    let opt = schema
        .lookup(key)
        .ok_or_else(|| SettingsError::KeyNotFound(key.into()))?;
    let value = resolved
        .get(key)
        .ok_or_else(|| SettingsError::KeyNotFound(key.into()))?;
    Ok(SettingsResult::KeyValue {
        key: key.into(),
        value: value.to_string(),
        doc: opt.doc.into(),
        active: active.contains(key),
    })
}

pub fn list_values(resolved: &ResolvedConfig, active: &ActiveSet) -> SettingsResult {
    let entries = resolved
        .iter()
        .map(|(key, value)| Entry {
            key: key.into(),
            value: value.to_string(),
            active: active.contains(key),
        })
        .collect();
    SettingsResult::Listing { entries }
}

pub fn list_active(schema: &Schema, active: &ActiveSet) -> SettingsResult {
    // Declaration order, not the set's sorted order.
    let keys = schema
        .iter()
        .filter(|opt| active.contains(opt.key))
        .map(|opt| opt.key.to_string())
        .collect();
    SettingsResult::ActiveKeys(keys)
}

pub fn dry_run(record: &ApplyRecord) -> Result<SettingsResult, SettingsError> {
    serde_json::to_string_pretty(record)
        .map(SettingsResult::DryRun)
        .map_err(|e| SettingsError::InvalidValue {
            key: "<record>".into(),
            reason: e.to_string(),
        })
}
