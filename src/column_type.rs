//! Semantic type tags carried by schema descriptors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a column or column set.
///
/// Two descriptors agree on type only when their tags are equal; `Any` is a
/// tag of its own and does not unify with the concrete tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    #[default]
    Any,
    Int,
    Float,
    Str,
    Bool,
    Date,
    Datetime,
    /// Any other type, identified by name (e.g. `"Decimal"`).
    Custom(String),
}

impl ColumnType {
    pub fn custom(name: impl Into<String>) -> Self {
        ColumnType::Custom(name.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            ColumnType::Any => "Any",
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::Str => "str",
            ColumnType::Bool => "bool",
            ColumnType::Date => "date",
            ColumnType::Datetime => "datetime",
            ColumnType::Custom(name) => name,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ColumnType {
    fn from(name: &str) -> Self {
        match name {
            "Any" | "any" => ColumnType::Any,
            "int" => ColumnType::Int,
            "float" => ColumnType::Float,
            "str" => ColumnType::Str,
            "bool" => ColumnType::Bool,
            "date" => ColumnType::Date,
            "datetime" => ColumnType::Datetime,
            other => ColumnType::Custom(other.to_string()),
        }
    }
}

impl From<String> for ColumnType {
    fn from(name: String) -> Self {
        ColumnType::from(name.as_str())
    }
}

impl From<ColumnType> for String {
    fn from(ty: ColumnType) -> Self {
        ty.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_parse() {
        for ty in [
            ColumnType::Any,
            ColumnType::Int,
            ColumnType::Float,
            ColumnType::Str,
            ColumnType::Datetime,
            ColumnType::custom("Decimal"),
        ] {
            assert_eq!(ColumnType::from(ty.to_string()), ty);
        }
    }

    #[test]
    fn test_serde_uses_type_names() {
        let json = serde_json::to_string(&vec![ColumnType::Int, ColumnType::custom("Money")]).unwrap();
        assert_eq!(json, r#"["int","Money"]"#);

        let parsed: Vec<ColumnType> = serde_json::from_str(r#"["float","Any"]"#).unwrap();
        assert_eq!(parsed, vec![ColumnType::Float, ColumnType::Any]);
    }
}
