use serde_json::Value;

use crate::filter::FilterDescriptor;
use crate::sort::{Sort, SortDirection};

/// Parse error for sort parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SortParseError(pub String);

impl std::fmt::Display for SortParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sort parse error: {}", self.0)
    }
}

impl std::error::Error for SortParseError {}

/// Parse error for filter parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterParseError(pub String);

impl std::fmt::Display for FilterParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "filter parse error: {}", self.0)
    }
}

impl std::error::Error for FilterParseError {}

/// Parse a JSON-encoded sort parameter into a list of sort descriptors.
///
/// Three shapes are accepted uniformly:
/// - an array of `{property, direction}` objects
/// - a single `{property, direction}` object
/// - an object treated as an `alias -> direction` map
///
/// Aliases are left untouched here; mapping to backend fields is the
/// order compiler's job.
pub fn parse_sorts(input: &str) -> Result<Vec<Sort>, SortParseError> {
    let value: Value = serde_json::from_str(input)
        .map_err(|e| SortParseError(format!("malformed JSON: {e}")))?;
    sorts_from_value(&value)
}

/// Shape-dispatching half of [`parse_sorts`] for callers that already
/// hold a decoded value.
pub fn sorts_from_value(value: &Value) -> Result<Vec<Sort>, SortParseError> {
    match value {
        Value::Array(items) => items.iter().map(sort_descriptor).collect(),
        Value::Object(map) if map.contains_key("property") || map.contains_key("field") => {
            Ok(vec![sort_descriptor(value)?])
        }
        Value::Object(map) => {
            let mut sorts = Vec::with_capacity(map.len());
            for (alias, dir) in map {
                sorts.push(Sort {
                    field: alias.clone(),
                    direction: direction_value(dir)?,
                });
            }
            Ok(sorts)
        }
        other => Err(SortParseError(format!(
            "sort must be an object or array, got {other}"
        ))),
    }
}

fn sort_descriptor(value: &Value) -> Result<Sort, SortParseError> {
    let obj = value
        .as_object()
        .ok_or_else(|| SortParseError(format!("sort entry must be an object, got {value}")))?;
    let field = obj
        .get("property")
        .or_else(|| obj.get("field"))
        .and_then(Value::as_str)
        .ok_or_else(|| SortParseError("sort entry missing property".into()))?;
    let direction = match obj.get("direction") {
        Some(dir) => direction_value(dir)?,
        None => SortDirection::Asc,
    };
    Ok(Sort::new(field, direction))
}

fn direction_value(value: &Value) -> Result<SortDirection, SortParseError> {
    value
        .as_str()
        .and_then(SortDirection::parse)
        .ok_or_else(|| SortParseError(format!("unknown sort direction: {value}")))
}

/// Parse a JSON-encoded filter parameter into descriptors.
///
/// Accepts an array of descriptor objects (`operator` defaulting to `eq`)
/// or an object treated as `property -> value` equality shorthand.
pub fn parse_filters(input: &str) -> Result<Vec<FilterDescriptor>, FilterParseError> {
    let value: Value = serde_json::from_str(input)
        .map_err(|e| FilterParseError(format!("malformed JSON: {e}")))?;
    filters_from_value(value)
}

/// Shape-dispatching half of [`parse_filters`].
pub fn filters_from_value(value: Value) -> Result<Vec<FilterDescriptor>, FilterParseError> {
    match value {
        Value::Array(_) => serde_json::from_value(value)
            .map_err(|e| FilterParseError(format!("invalid filter entry: {e}"))),
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(property, value)| FilterDescriptor::eq(property, value))
            .collect()),
        other => Err(FilterParseError(format!(
            "filter must be an object or array, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::FilterOp;
    use serde_json::json;

    #[test]
    fn single_sort_object() {
        let sorts = parse_sorts(r#"{"property":"name","direction":"desc"}"#).unwrap();
        assert_eq!(sorts, vec![Sort::new("name", SortDirection::Desc)]);
    }

    #[test]
    fn sort_array() {
        let sorts = parse_sorts(
            r#"[{"property":"name","direction":"asc"},{"property":"age","direction":"DESC"}]"#,
        )
        .unwrap();
        assert_eq!(sorts.len(), 2);
        assert_eq!(sorts[1], Sort::new("age", SortDirection::Desc));
    }

    #[test]
    fn alias_direction_map() {
        let sorts = parse_sorts(r#"{"name":"desc"}"#).unwrap();
        assert_eq!(sorts, vec![Sort::new("name", SortDirection::Desc)]);
    }

    #[test]
    fn sort_direction_defaults_to_asc() {
        let sorts = parse_sorts(r#"[{"property":"name"}]"#).unwrap();
        assert_eq!(sorts[0].direction, SortDirection::Asc);
    }

    #[test]
    fn malformed_sort_json_errors() {
        let err = parse_sorts("{not json").unwrap_err();
        assert!(err.0.contains("malformed JSON"), "{}", err.0);
    }

    #[test]
    fn unknown_direction_errors() {
        let err = parse_sorts(r#"{"name":"sideways"}"#).unwrap_err();
        assert!(err.0.contains("unknown sort direction"), "{}", err.0);
    }

    #[test]
    fn scalar_sort_errors() {
        assert!(parse_sorts("42").is_err());
    }

    #[test]
    fn filter_array() {
        let filters = parse_filters(
            r#"[{"property":"status","value":"active"},{"property":"age","operator":"gt","value":21}]"#,
        )
        .unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0].operator, FilterOp::Eq);
        assert_eq!(filters[1].operator, FilterOp::Gt);
        assert_eq!(filters[1].value, json!(21));
    }

    #[test]
    fn filter_object_shorthand() {
        let filters = parse_filters(r#"{"status":"active","age":30}"#).unwrap();
        assert_eq!(filters.len(), 2);
        assert!(filters.iter().all(|f| f.operator == FilterOp::Eq));
    }

    #[test]
    fn filter_with_symbol_operator() {
        let filters = parse_filters(r#"[{"property":"flag","operator":"=","value":""}]"#).unwrap();
        assert_eq!(filters[0].operator, FilterOp::Eq);
    }

    #[test]
    fn malformed_filter_json_errors() {
        assert!(parse_filters("[{").is_err());
    }

    #[test]
    fn filter_scalar_errors() {
        assert!(parse_filters("\"status\"").is_err());
    }
}
