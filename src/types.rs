use std::fmt;

use serde::Serialize;

/// The storage type of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    Bool,
    Int,
    String,
    /// Integer kept as text; parsed at read time only.
    IntString,
    /// A closed set of allowed strings.
    Enum(&'static [&'static str]),
}

impl OptionType {
    pub fn name(&self) -> &'static str {
        match self {
            OptionType::Bool => "bool",
            OptionType::Int => "int",
            OptionType::String => "string",
            OptionType::IntString => "int-string",
            OptionType::Enum(_) => "enum",
        }
    }

    /// Whether `value` has the right shape for this type. Enum membership is
    /// not checked here.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (OptionType::Bool, Value::Bool(_))
                | (OptionType::Int, Value::Int(_))
                | (
                    OptionType::String | OptionType::IntString | OptionType::Enum(_),
                    Value::Str(_)
                )
        )
    }

    pub fn choices(&self) -> Option<&'static [&'static str]> {
        match self {
            OptionType::Enum(choices) => Some(*choices),
            _ => None,
        }
    }
}

/// A typed option value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Reinterpret this value under another option type.
    ///
    /// Used when a legacy key was stored under a different type than the option
    /// that replaced it. Returns `None` when the value has no sensible reading.
    pub fn coerce(&self, to: OptionType) -> Option<Value> {
        match (to, self) {
            (OptionType::Bool, Value::Bool(b)) => Some(Value::Bool(*b)),
            (OptionType::Bool, Value::Int(i)) => Some(Value::Bool(*i != 0)),
            (OptionType::Bool, Value::Str(s)) => parse_bool(s).map(Value::Bool),
            (OptionType::Int, Value::Int(i)) => Some(Value::Int(*i)),
            (OptionType::Int, Value::Bool(b)) => Some(Value::Int(i64::from(*b))),
            (OptionType::Int, Value::Str(s)) => s.trim().parse().ok().map(Value::Int),
            (_, Value::Str(s)) => Some(Value::Str(s.clone())),
            (_, other) => Some(Value::Str(other.to_string())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

/// Lenient boolean parsing for text input.
pub(crate) fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}

/// A settings operation, independent of any CLI framework.
/// The CLI layer converts parsed clap args into this.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsAction {
    List,
    Get { key: String },
    Set { key: String, value: String },
    Unset { key: String },
    Reset,
    Active,
    Apply { dry_run: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_alias_reads_as_bool() {
        let v = Value::from("TRUE");
        assert_eq!(v.coerce(OptionType::Bool), Some(Value::Bool(true)));
        assert_eq!(Value::from("maybe").coerce(OptionType::Bool), None);
    }

    #[test]
    fn int_alias_reads_as_bool() {
        assert_eq!(Value::Int(0).coerce(OptionType::Bool), Some(Value::Bool(false)));
        assert_eq!(Value::Int(3).coerce(OptionType::Bool), Some(Value::Bool(true)));
    }

    #[test]
    fn bool_alias_reads_as_text() {
        assert_eq!(
            Value::Bool(true).coerce(OptionType::IntString),
            Some(Value::from("true"))
        );
    }

    #[test]
    fn accepts_checks_shape_only() {
        const CHOICES: &[&str] = &["a", "b"];
        assert!(OptionType::Enum(CHOICES).accepts(&Value::from("zzz")));
        assert!(!OptionType::Bool.accepts(&Value::Int(1)));
        assert!(OptionType::IntString.accepts(&Value::from("7")));
    }

    #[test]
    fn display_is_plain() {
        assert_eq!(Value::from("wayland-0").to_string(), "wayland-0");
        assert_eq!(Value::Int(-2).to_string(), "-2");
        assert_eq!(Value::Bool(false).to_string(), "false");
    }
}
