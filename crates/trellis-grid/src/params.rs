use std::collections::HashMap;

/// A request parameter value: scalar or repeated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Str(String),
    List(Vec<String>),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            ParamValue::List(_) => None,
        }
    }

    /// Flatten to a list: a scalar becomes a one-element list.
    pub fn into_list(self) -> Vec<String> {
        match self {
            ParamValue::Str(s) => vec![s],
            ParamValue::List(items) => items,
        }
    }
}

/// Generic key-value request channel.
///
/// Grid models read the body channel, tree-combo models the query-string
/// channel; both sides of that split are just implementations of this
/// trait, chosen by the caller.
pub trait ParamSource {
    fn get(&self, name: &str) -> Option<ParamValue>;
}

/// HashMap-backed parameter source for tests and direct callers.
#[derive(Debug, Clone, Default)]
pub struct MapParams {
    values: HashMap<String, ParamValue>,
}

impl MapParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values
            .insert(name.into(), ParamValue::Str(value.into()));
        self
    }

    pub fn set_list(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        self.values.insert(name.into(), ParamValue::List(values));
        self
    }
}

impl ParamSource for MapParams {
    fn get(&self, name: &str) -> Option<ParamValue> {
        self.values.get(name).cloned()
    }
}
