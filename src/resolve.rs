//! Resolution: compute every option's effective value from the store.
//!
//! Operates on a read-only store and the schema, so the same inputs always
//! give the same [`ResolvedConfig`]. Per option:
//!
//! 1. A forced (platform) value wins; the store is not consulted
//! 2. Read the primary key, falling back to the declared default
//! 3. Apply legacy aliases in declared order
//! 4. Check the value fits its type (native int range, enum choices),
//!    falling back to the default
//!
//! Keeping the store consistent with forced values is a separate, explicit
//! step: [`sync_forced`].

use serde::Serialize;
use serde::ser::SerializeMap;

use crate::error::SettingsError;
use crate::schema::{Combinator, OptionDef, Schema};
use crate::store::Store;
use crate::types::{OptionType, Value};

/// Effective value of every schema option, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    entries: Vec<(&'static str, Value)>,
}

impl ResolvedConfig {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ResolvedConfig {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Resolve every option in `schema` against `store`.
pub fn resolve<S: Store + ?Sized>(schema: &Schema, store: &S) -> ResolvedConfig {
    let entries = schema
        .iter()
        .map(|opt| (opt.key, resolve_option(opt, store)))
        .collect();
    ResolvedConfig { entries }
}

/// Effective value of a single option.
pub fn resolve_option<S: Store + ?Sized>(opt: &OptionDef, store: &S) -> Value {
    if let Some(forced) = &opt.forced {
        return forced.clone();
    }

    let primary = store.get_typed(opt.key, opt.ty);
    let present = primary.is_some();
    let mut value = primary.unwrap_or_else(|| opt.default.clone());

    for alias in &opt.aliases {
        let Some(legacy) = store
            .get_typed(alias.key, alias.ty)
            .and_then(|v| v.coerce(opt.ty))
        else {
            continue;
        };
        match alias.combine {
            Combinator::Fallback => {
                if !present {
                    tracing::debug!(key = opt.key, alias = alias.key, "using legacy key");
                    value = legacy;
                    break;
                }
            }
            Combinator::Or => {
                if legacy.as_bool() == Some(true) && value.as_bool() != Some(true) {
                    tracing::debug!(key = opt.key, alias = alias.key, "enabled by legacy key");
                    value = Value::Bool(true);
                }
            }
        }
    }

    if acceptable(opt, &value) {
        value
    } else {
        tracing::warn!(
            key = opt.key,
            value = %value,
            default = %opt.default,
            "unusable stored value, using default"
        );
        opt.default.clone()
    }
}

// Numbers must fit the native i32. Enum values may carry a `choice=param`
// suffix written by other tools.
fn acceptable(opt: &OptionDef, value: &Value) -> bool {
    match (opt.ty, value) {
        (OptionType::Int, Value::Int(i)) => i32::try_from(*i).is_ok(),
        (OptionType::IntString, Value::Str(text)) if text.trim().is_empty() => {
            opt.default.as_str().is_some_and(str::is_empty)
        }
        (OptionType::IntString, Value::Str(text)) => text.trim().parse::<i32>().is_ok(),
        (OptionType::Enum(choices), Value::Str(s)) => choices.iter().any(|c| {
            s.strip_prefix(c)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('='))
        }),
        (OptionType::Int | OptionType::IntString | OptionType::Enum(_), _) => false,
        _ => true,
    }
}

/// Write forced values back into the store wherever the persisted value
/// differs, so anything inspecting the store sees the platform truth.
///
/// Returns the keys that were rewritten.
pub fn sync_forced<S: Store + ?Sized>(
    schema: &Schema,
    store: &mut S,
) -> Result<Vec<&'static str>, SettingsError> {
    let mut written = Vec::new();
    for opt in schema.iter() {
        let Some(forced) = &opt.forced else {
            continue;
        };
        if store.get_typed(opt.key, opt.ty).as_ref() != Some(forced) {
            tracing::debug!(key = opt.key, value = %forced, "writing back platform value");
            store.set_value(opt.key, forced)?;
            written.push(opt.key);
        }
    }
    Ok(written)
}
