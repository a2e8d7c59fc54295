//! Typed values extracted from dynamic route segments

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A converted route value
///
/// Produced by a [`Converter`](crate::Converter) from a raw path token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteValue {
    Bool(bool),
    Number(f64),
    Str(String),
}

impl RouteValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RouteValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RouteValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RouteValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for RouteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteValue::Bool(b) => write!(f, "{}", b),
            RouteValue::Number(n) => write!(f, "{}", n),
            RouteValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for RouteValue {
    fn from(value: &str) -> Self {
        RouteValue::Str(value.to_string())
    }
}

impl From<String> for RouteValue {
    fn from(value: String) -> Self {
        RouteValue::Str(value)
    }
}

impl From<f64> for RouteValue {
    fn from(value: f64) -> Self {
        RouteValue::Number(value)
    }
}

impl From<i64> for RouteValue {
    fn from(value: i64) -> Self {
        RouteValue::Number(value as f64)
    }
}

impl From<bool> for RouteValue {
    fn from(value: bool) -> Self {
        RouteValue::Bool(value)
    }
}

/// Values keyed by segment name
pub type RouteValues = HashMap<String, RouteValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_integral_number() {
        assert_eq!(RouteValue::Number(42.0).to_string(), "42");
        assert_eq!(RouteValue::Number(-1.5).to_string(), "-1.5");
    }

    #[test]
    fn test_display_large_integral_number() {
        assert_eq!(RouteValue::Number(1e20).to_string(), "100000000000000000000");
        assert_eq!(RouteValue::Number(-1e20).to_string(), "-100000000000000000000");
    }

    #[test]
    fn test_accessors() {
        assert_eq!(RouteValue::from("a").as_str(), Some("a"));
        assert_eq!(RouteValue::from(true).as_bool(), Some(true));
        assert_eq!(RouteValue::from(3_i64).as_f64(), Some(3.0));
        assert_eq!(RouteValue::from(3_i64).as_str(), None);
    }
}
