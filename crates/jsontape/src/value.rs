//! Materialized JSON values.
//!
//! This module defines the [`Value`] enum produced when a tape element is
//! materialized, and provides helper functions for escaping JSON strings.

use alloc::{collections::BTreeMap, string::String, vec::Vec};

pub type Map = BTreeMap<String, Value>;

/// A JSON value materialized from a tape.
///
/// Unlike text parsers that read every number as a float, the tape keeps
/// float, signed, and unsigned numbers distinct, and `Value` preserves that
/// distinction:
///
/// - Null
/// - Boolean
/// - Float / signed integer / unsigned integer
/// - String
/// - Array
/// - Object
///
/// # Examples
///
/// ```
/// use jsontape::{Map, Value};
///
/// let mut map = Map::new();
/// map.insert("key".to_string(), Value::String("value".into()));
/// let v = Value::Object(map);
/// assert_eq!(v.to_string(), r#"{"key":"value"}"#);
/// ```
// Enable serde support for tests and when the optional `serde` feature is
// activated by downstream crates.  The `cfg_attr` conditional keeps the core
// crate free of a serde dependency in normal builds.
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Float(f64),
    Int(i64),
    Uint(u64),
    String(String),
    Array(Vec<Value>),
    Object(Map),
}

impl Default for Value {
    fn default() -> Self {
        Self::Null
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::Uint(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::Array(v)
    }
}

impl From<Map> for Value {
    fn from(v: Map) -> Self {
        Self::Object(v)
    }
}

impl Value {
    /// Returns `true` if the value is [`Null`].
    ///
    /// [`Null`]: Value::Null
    ///
    /// # Examples
    ///
    /// ```
    /// use jsontape::Value;
    ///
    /// assert!(Value::Null.is_null());
    /// assert!(!Value::Bool(false).is_null());
    /// ```
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` if the value is [`Bool`].
    ///
    /// [`Bool`]: Value::Bool
    #[must_use]
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(..))
    }

    /// Returns `true` if the value is numeric, whichever of the three number
    /// representations it carries.
    ///
    /// # Examples
    ///
    /// ```
    /// use jsontape::Value;
    ///
    /// assert!(Value::Float(42.0).is_number());
    /// assert!(Value::Int(-1).is_number());
    /// assert!(Value::Uint(7).is_number());
    /// assert!(!Value::Null.is_number());
    /// ```
    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Float(..) | Self::Int(..) | Self::Uint(..))
    }

    /// Returns `true` if the value is [`String`].
    ///
    /// [`String`]: Value::String
    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(..))
    }

    /// Returns `true` if the value is [`Array`].
    ///
    /// [`Array`]: Value::Array
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(..))
    }

    /// Returns `true` if the value is [`Object`].
    ///
    /// [`Object`]: Value::Object
    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(..))
    }
}

/// Escapes control characters in a string for inclusion in a JSON string literal.
///
/// This function writes to the provided formatter, replacing characters such as
/// quotes, backslashes, control characters (<= U+001F), and Unicode line separators
/// with their JSON escape sequences.
pub(crate) fn write_escaped_string<W: core::fmt::Write>(src: &str, f: &mut W) -> core::fmt::Result {
    for c in src.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            // Escape Unicode line separators which pre-2019 JSON parsers may not handle correctly
            '\u{2028}' | '\u{2029}' => {
                write!(f, "\\u{:04X}", c as u32)?;
            }
            // Escape control characters for maximum compatibility and readability, but only
            // up to the basic multilingual plane (BMP). JSON requires exactly 4 hex digits for
            // escapes, so we leave the encoding of characters outside the BMP to any
            // downstream processing. (e.g.: encoding as UTF-16 surrogates).
            c if c.is_ascii_control() || c.is_control() && c as u32 <= 0xFFFF => {
                write!(f, "\\u{:04X}", c as u32)?;
            }
            _ => f.write_char(c)?,
        }
    }
    Ok(())
}

/// Escapes control characters in a string for inclusion in a JSON string literal and returns the result.
///
/// This function is a convenience wrapper around [`write_escaped_string`] that returns a `String`.
pub(crate) fn escape_string(src: &str) -> String {
    let mut result = String::with_capacity(src.len() + 2); // +2 for surrounding quotes
    write_escaped_string(src, &mut result).expect("Failed to escape string");
    result
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => f.write_str(if *b { "true" } else { "false" }),
            Value::Float(n) => {
                // Non-finite floats have no JSON form; render them the way
                // serde_json does. The fallible tape serializers reject them
                // instead.
                if n.is_finite() {
                    f.write_str(&alloc::string::ToString::to_string(&n))
                } else {
                    f.write_str("null")
                }
            }
            Value::Int(n) => write!(f, "{n}"),
            Value::Uint(n) => write!(f, "{n}"),
            Value::String(s) => {
                write!(f, "\"{}\"", escape_string(s))
            }
            Value::Array(arr) => {
                f.write_str("[")?;
                let mut first = true;
                for v in arr {
                    if !first {
                        f.write_str(",")?;
                    }
                    first = false;
                    write!(f, "{v}")?;
                }
                f.write_str("]")
            }
            Value::Object(map) => {
                f.write_str("{")?;
                let mut first = true;
                for (k, v) in map {
                    if !first {
                        f.write_str(",")?;
                    }
                    first = false;
                    write!(f, "\"{}\":{}", escape_string(k), v)?;
                }
                f.write_str("}")
            }
        }
    }
}
