//! Result cell values
//!
//! Backends return scalars, but semi-structured columns (VARIANT, ARRAY,
//! OBJECT, JSON) carry nested values. Cells keep that structure; collapsing
//! them into display strings is left to whoever renders the table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single value in a result row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<Cell>),
    Map(BTreeMap<String, Cell>),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Returns the string payload of a text cell
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_compound(&self) -> bool {
        matches!(self, Cell::List(_) | Cell::Map(_))
    }
}

impl From<serde_json::Value> for Cell {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Cell::Null,
            serde_json::Value::Bool(b) => Cell::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Integer(i),
                None => n
                    .as_f64()
                    .map(Cell::Float)
                    .unwrap_or_else(|| Cell::Text(n.to_string())),
            },
            serde_json::Value::String(s) => Cell::Text(s),
            serde_json::Value::Array(items) => {
                Cell::List(items.into_iter().map(Cell::from).collect())
            }
            serde_json::Value::Object(fields) => Cell::Map(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, Cell::from(value)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_keeps_structure() {
        let cell = Cell::from(json!({"limit": 250000, "tags": ["auto", "home"], "active": true}));

        let Cell::Map(fields) = cell else {
            panic!("expected a map cell");
        };
        assert_eq!(fields.get("limit"), Some(&Cell::Integer(250000)));
        assert_eq!(
            fields.get("tags"),
            Some(&Cell::List(vec![Cell::text("auto"), Cell::text("home")]))
        );
        assert_eq!(fields.get("active"), Some(&Cell::Bool(true)));
    }

    #[test]
    fn test_untagged_serialization() {
        let row = vec![
            Cell::Null,
            Cell::Integer(3),
            Cell::Float(1.5),
            Cell::text("open"),
            Cell::List(vec![Cell::Integer(1)]),
        ];
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json, json!([null, 3, 1.5, "open", [1]]));

        let back: Vec<Cell> = serde_json::from_value(json).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn test_compound_detection() {
        assert!(Cell::List(vec![]).is_compound());
        assert!(Cell::Map(BTreeMap::new()).is_compound());
        assert!(!Cell::text("x").is_compound());
        assert_eq!(Cell::text("x").as_text(), Some("x"));
        assert_eq!(Cell::Integer(1).as_text(), None);
    }
}
