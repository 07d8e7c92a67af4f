use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::operator::FilterOp;

/// One filter clause as supplied by the client.
///
/// Fast (column-header) and direct (form-driven, persisted) filters share
/// this shape; the category is positional, not encoded in the descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDescriptor {
    pub property: String,
    #[serde(default = "default_op", alias = "op")]
    pub operator: FilterOp,
    #[serde(default)]
    pub value: Value,
    /// Raw where template for the `where` escape hatch. The compiler
    /// substitutes `?` with the value text; callers own its safety.
    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub raw_where: Option<String>,
}

fn default_op() -> FilterOp {
    FilterOp::Eq
}

impl FilterDescriptor {
    pub fn new(property: impl Into<String>, operator: FilterOp, value: Value) -> Self {
        Self {
            property: property.into(),
            operator,
            value,
            raw_where: None,
        }
    }

    /// Shorthand for the most common descriptor.
    pub fn eq(property: impl Into<String>, value: Value) -> Self {
        Self::new(property, FilterOp::Eq, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn operator_defaults_to_eq() {
        let f: FilterDescriptor =
            serde_json::from_value(json!({ "property": "status", "value": "active" })).unwrap();
        assert_eq!(f.operator, FilterOp::Eq);
        assert_eq!(f.value, json!("active"));
    }

    #[test]
    fn accepts_op_alias_key() {
        let f: FilterDescriptor =
            serde_json::from_value(json!({ "property": "age", "op": "gt", "value": 21 })).unwrap();
        assert_eq!(f.operator, FilterOp::Gt);
    }

    #[test]
    fn where_template_round_trips() {
        let f: FilterDescriptor = serde_json::from_value(json!({
            "property": "name",
            "operator": "where",
            "value": "smith",
            "where": "LOWER(name) = LOWER('?')"
        }))
        .unwrap();
        assert_eq!(f.raw_where.as_deref(), Some("LOWER(name) = LOWER('?')"));
        let back = serde_json::to_value(&f).unwrap();
        assert_eq!(back["where"], json!("LOWER(name) = LOWER('?')"));
    }

    #[test]
    fn missing_value_is_null() {
        let f: FilterDescriptor = serde_json::from_value(json!({ "property": "flag" })).unwrap();
        assert_eq!(f.value, Value::Null);
    }
}
