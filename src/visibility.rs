//! Which options are currently active.
//!
//! A single generic pass over the schema evaluates each option's predicate
//! against a resolved config. Inactive options keep whatever is stored; they
//! just drop out of the UI and out of the native record's conditional slots.

use std::collections::BTreeSet;

use crate::resolve::ResolvedConfig;
use crate::schema::{Predicate, Schema};
use crate::types::Value;

/// Keys of the options whose predicate currently holds.
pub type ActiveSet = BTreeSet<&'static str>;

impl Predicate {
    pub fn eval(&self, resolved: &ResolvedConfig) -> bool {
        let current = resolved.get(self.key());
        match self {
            Predicate::Equals { value, .. } => current.and_then(Value::as_str) == Some(*value),
            Predicate::Selects { value, .. } => current
                .and_then(Value::as_str)
                .is_some_and(|s| selects(s, value)),
            Predicate::NotEquals { value, .. } => current.and_then(Value::as_str) != Some(*value),
            Predicate::Enabled { .. } => current.and_then(Value::as_bool) == Some(true),
        }
    }
}

// "zstd" and "zstd=10" both select zstd.
fn selects(current: &str, value: &str) -> bool {
    current
        .strip_prefix(value)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('='))
}

pub fn active_keys(schema: &Schema, resolved: &ResolvedConfig) -> ActiveSet {
    schema
        .iter()
        .filter(|opt| opt.depends_on.as_ref().is_none_or(|p| p.eval(resolved)))
        .map(|opt| opt.key)
        .collect()
}
