//! Typed interpretation of raw parameter values.
//!
//! The store holds strings; callers pick the interpretation at read time.
//! The cast set is closed on purpose: the historical `code` cast (arbitrary
//! expression evaluation) is not carried here. Callers needing anything
//! beyond this table supply their own converter through
//! [`Resolver::get_with`](crate::core::resolver::Resolver::get_with).

use crate::error::Result;

/// String literals that parse as `false`; everything else is `true`.
const FALSY: &[&str] = &["", "no", "No", "NO", "0", "false", "False", "FALSE"];

/// Conversion applied to a raw string value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Cast {
    /// Identity: the raw string unchanged.
    #[default]
    #[value(alias = "string", alias = "str")]
    Raw,
    #[value(alias = "boolean")]
    Bool,
    #[value(alias = "integer", alias = "long")]
    Int,
    Float,
    #[value(alias = "dict")]
    Json,
    #[value(alias = "csv")]
    List,
}

/// A converted parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    Json(serde_json::Value),
    List(Vec<String>),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Json(j) => write!(f, "{}", j),
            Value::List(items) => write!(f, "{}", items.join(",")),
        }
    }
}

impl Cast {
    /// Convert a raw string value.
    ///
    /// Parse failures propagate unmodified; they indicate a genuine
    /// data/schema mismatch the caller must handle.
    pub fn apply(self, raw: &str) -> Result<Value> {
        match self {
            Cast::Raw => Ok(Value::Str(raw.to_string())),
            Cast::Bool => Ok(Value::Bool(parse_bool(raw))),
            Cast::Int => Ok(Value::Int(raw.parse::<i64>()?)),
            Cast::Float => Ok(Value::Float(raw.parse::<f64>()?)),
            Cast::Json => Ok(Value::Json(serde_json::from_str(raw)?)),
            Cast::List => Ok(Value::List(parse_list(raw))),
        }
    }
}

/// Falsy-literal boolean: false only for a fixed set of strings.
pub fn parse_bool(raw: &str) -> bool {
    !FALSY.contains(&raw)
}

/// Comma-separated list: split, trim, drop empty segments.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}
