//! Write-side rules: what a raw UI value turns into before it is stored.
//!
//! Validation failures never propagate as errors. A rejected write leaves the
//! store untouched and is reported as [`WriteOutcome::Rejected`] so callers can
//! tell a no-op from a real write.

use std::fmt;

use crate::schema::OptionDef;
use crate::types::{OptionType, Value, parse_bool};

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// The value to persist.
    Stored(Value),
    Rejected(Rejection),
}

impl WriteOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, WriteOutcome::Stored(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// Only the platform writes this option.
    ReadOnly,
    /// The platform pins this option to a fixed value.
    Disabled,
    NotAChoice {
        value: String,
        choices: &'static [&'static str],
    },
    NotParsable {
        value: String,
        expected: &'static str,
    },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::ReadOnly => write!(f, "read-only, set by the platform"),
            Rejection::Disabled => write!(f, "unavailable on this platform"),
            Rejection::NotAChoice { value, choices } => {
                write!(f, "'{value}' is not one of {}", choices.join(", "))
            }
            Rejection::NotParsable { value, expected } => {
                write!(f, "'{value}' is not a valid {expected}")
            }
        }
    }
}

/// Normalize a raw text value for `opt`.
pub fn normalize_write(opt: &OptionDef, raw: &str) -> WriteOutcome {
    if opt.read_only {
        return WriteOutcome::Rejected(Rejection::ReadOnly);
    }
    if opt.forced.is_some() {
        return WriteOutcome::Rejected(Rejection::Disabled);
    }

    match opt.ty {
        OptionType::Enum(choices) => {
            if choices.iter().any(|c| *c == raw) {
                WriteOutcome::Stored(Value::from(raw))
            } else {
                WriteOutcome::Rejected(Rejection::NotAChoice {
                    value: raw.to_string(),
                    choices,
                })
            }
        }
        OptionType::String | OptionType::IntString => {
            if raw.is_empty() && opt.revert_on_empty {
                WriteOutcome::Stored(opt.default.clone())
            } else {
                WriteOutcome::Stored(Value::from(raw))
            }
        }
        OptionType::Bool => match parse_bool(raw) {
            Some(b) => WriteOutcome::Stored(Value::Bool(b)),
            None => not_parsable(opt, raw),
        },
        // The native layer takes i32.
        OptionType::Int => match raw.trim().parse::<i32>() {
            Ok(i) => WriteOutcome::Stored(Value::Int(i64::from(i))),
            Err(_) => not_parsable(opt, raw),
        },
    }
}

fn not_parsable(opt: &OptionDef, raw: &str) -> WriteOutcome {
    WriteOutcome::Rejected(Rejection::NotParsable {
        value: raw.to_string(),
        expected: opt.ty.name(),
    })
}
