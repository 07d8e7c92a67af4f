use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use trellis_query::{OrderSpec, Sort, filters_from_value, sorts_from_value};

use crate::catalog::FieldCatalog;
use crate::compile::OrderCompiler;
use crate::error::GridError;
use crate::params::{ParamSource, ParamValue};
use crate::request::RequestParameters;
use crate::store::FilterStore;

/// How invalid client input is handled: `Lenient` (production) degrades
/// to defaults with a log line, `Strict` (development) raises descriptive
/// errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    Strict,
    #[default]
    Lenient,
}

impl Strictness {
    pub fn is_strict(self) -> bool {
        matches!(self, Self::Strict)
    }
}

/// How a request parameter is looked up: under a name, or disabled
/// outright (JSON `false`), in which case the configured default applies
/// unconditionally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamName {
    Name(String),
    Disabled(bool),
}

impl ParamName {
    pub fn off() -> Self {
        Self::Disabled(false)
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Disabled(_) => None,
        }
    }
}

impl From<&str> for ParamName {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// Per-grid configuration knobs for parameter resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Model name, the key for persisted direct-filter state.
    pub model_name: String,
    pub primary_key: String,
    #[serde(default = "default_limit")]
    pub default_limit: u64,
    /// Allow-list of page sizes; empty means "bounded by `max_limit`".
    #[serde(default)]
    pub limit_filter: Vec<u64>,
    /// Upper bound on the page size; 0 means unlimited.
    #[serde(default)]
    pub max_limit: u64,
    #[serde(default)]
    pub default_offset: u64,
    #[serde(default = "default_page")]
    pub default_page: u64,
    /// Fallback sort, given in backend field terms.
    #[serde(default)]
    pub default_order: Option<Sort>,
    /// Pre-set limit; wins over the request outright.
    #[serde(default)]
    pub fixed_limit: Option<u64>,
    /// Pre-set offset; wins over the request outright.
    #[serde(default)]
    pub fixed_offset: Option<u64>,
    #[serde(default = "pn_limit")]
    pub limit_param: ParamName,
    #[serde(default = "pn_page")]
    pub page_param: ParamName,
    #[serde(default = "pn_offset")]
    pub offset_param: ParamName,
    #[serde(default = "pn_sort")]
    pub sort_param: ParamName,
    #[serde(default = "pn_filter")]
    pub filter_param: ParamName,
    #[serde(default = "pn_selected")]
    pub selected_param: ParamName,
    #[serde(default)]
    pub strictness: Strictness,
}

fn default_limit() -> u64 {
    20
}

fn default_page() -> u64 {
    1
}

fn pn_limit() -> ParamName {
    "limit".into()
}

fn pn_page() -> ParamName {
    "page".into()
}

fn pn_offset() -> ParamName {
    "start".into()
}

fn pn_sort() -> ParamName {
    "sort".into()
}

fn pn_filter() -> ParamName {
    "filter".into()
}

fn pn_selected() -> ParamName {
    "selected".into()
}

impl GridConfig {
    pub fn new(model_name: impl Into<String>, primary_key: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            primary_key: primary_key.into(),
            default_limit: default_limit(),
            limit_filter: Vec::new(),
            max_limit: 0,
            default_offset: 0,
            default_page: default_page(),
            default_order: None,
            fixed_limit: None,
            fixed_offset: None,
            limit_param: pn_limit(),
            page_param: pn_page(),
            offset_param: pn_offset(),
            sort_param: pn_sort(),
            filter_param: pn_filter(),
            selected_param: pn_selected(),
            strictness: Strictness::default(),
        }
    }
}

/// Resolves raw request parameters into a validated, bounded
/// [`RequestParameters`] snapshot.
pub struct ParamResolver<'a> {
    config: &'a GridConfig,
    catalog: &'a dyn FieldCatalog,
}

impl<'a> ParamResolver<'a> {
    pub fn new(config: &'a GridConfig, catalog: &'a dyn FieldCatalog) -> Self {
        Self { config, catalog }
    }

    pub fn resolve(
        &self,
        params: &dyn ParamSource,
        store: &dyn FilterStore,
    ) -> Result<RequestParameters, GridError> {
        let limit = self.resolve_limit(params);
        let page = self.resolve_page(params);
        let offset = self.resolve_offset(params, page, limit);
        let order = self.resolve_order(params)?;
        let fast_filter = self.resolve_filters(params)?;
        let direct_filter = store.get(&self.config.model_name);
        let rows_selector = self.resolve_selection(params);

        debug!(
            model = %self.config.model_name,
            limit,
            offset,
            filters = fast_filter.len() + direct_filter.len(),
            "request parameters resolved"
        );

        Ok(RequestParameters {
            limit,
            page,
            offset,
            order,
            fast_filter,
            direct_filter,
            rows_selector,
        })
    }

    fn read(&self, params: &dyn ParamSource, name: &ParamName) -> Option<ParamValue> {
        params.get(name.as_name()?)
    }

    fn read_str(&self, params: &dyn ParamSource, name: &ParamName) -> Option<String> {
        self.read(params, name)
            .and_then(|v| v.as_str().map(str::to_string))
    }

    fn resolve_limit(&self, params: &dyn ParamSource) -> u64 {
        let candidate = match self.config.fixed_limit {
            Some(fixed) => Some(fixed),
            None => self
                .read_str(params, &self.config.limit_param)
                .and_then(|s| s.trim().parse::<u64>().ok()),
        };
        match candidate {
            Some(value) if self.limit_allowed(value) => value,
            Some(value) => {
                warn!(limit = value, "limit rejected, falling back to default");
                self.config.default_limit
            }
            None => self.config.default_limit,
        }
    }

    fn limit_allowed(&self, value: u64) -> bool {
        if value <= 1 {
            return false;
        }
        if !self.config.limit_filter.is_empty() {
            return self.config.limit_filter.contains(&value);
        }
        self.config.max_limit == 0 || value <= self.config.max_limit
    }

    fn resolve_page(&self, params: &dyn ParamSource) -> u64 {
        match self
            .read_str(params, &self.config.page_param)
            .and_then(|s| s.trim().parse::<i64>().ok())
        {
            Some(value) if value >= 0 => value as u64,
            Some(value) => {
                warn!(page = value, "negative page, falling back to default");
                self.config.default_page
            }
            None => self.config.default_page,
        }
    }

    fn resolve_offset(&self, params: &dyn ParamSource, page: u64, limit: u64) -> u64 {
        if let Some(fixed) = self.config.fixed_offset {
            return fixed;
        }
        match self.read_str(params, &self.config.offset_param) {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(value) if value >= 0 => value as u64,
                _ => {
                    warn!(offset = %raw, "invalid offset, falling back to default");
                    self.config.default_offset
                }
            },
            // No explicit offset: derive it from the page number.
            None => page.saturating_sub(1) * limit,
        }
    }

    fn resolve_order(&self, params: &dyn ParamSource) -> Result<OrderSpec, GridError> {
        let raw = match self.read_str(params, &self.config.sort_param) {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => return Ok(self.default_order()),
        };

        let decoded: Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) if self.config.strictness.is_strict() => {
                return Err(GridError::Parse(format!("malformed sort parameter: {e}")));
            }
            Err(e) => {
                warn!(error = %e, "malformed sort parameter, using default order");
                return Ok(self.default_order());
            }
        };
        let sorts = match sorts_from_value(&decoded) {
            Ok(sorts) => sorts,
            Err(e) if self.config.strictness.is_strict() => return Err(e.into()),
            Err(e) => {
                warn!(error = %e, "unusable sort parameter, using default order");
                return Ok(self.default_order());
            }
        };

        let compiler = OrderCompiler::new(self.catalog, self.config.strictness);
        let order = compiler.compile(&sorts)?;
        if order.is_empty() {
            return Ok(self.default_order());
        }
        Ok(order)
    }

    fn default_order(&self) -> OrderSpec {
        self.config.default_order.iter().cloned().collect()
    }

    fn resolve_filters(
        &self,
        params: &dyn ParamSource,
    ) -> Result<Vec<trellis_query::FilterDescriptor>, GridError> {
        let raw = match self.read_str(params, &self.config.filter_param) {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => return Ok(Vec::new()),
        };
        let decoded: Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) if self.config.strictness.is_strict() => {
                return Err(GridError::Parse(format!("malformed filter parameter: {e}")));
            }
            Err(e) => {
                warn!(error = %e, "malformed filter parameter, ignoring");
                return Ok(Vec::new());
            }
        };
        match filters_from_value(decoded) {
            Ok(filters) => Ok(filters),
            Err(e) if self.config.strictness.is_strict() => Err(e.into()),
            Err(e) => {
                warn!(error = %e, "unusable filter parameter, ignoring");
                Ok(Vec::new())
            }
        }
    }

    fn resolve_selection(&self, params: &dyn ParamSource) -> Vec<Value> {
        match self.read(params, &self.config.selected_param) {
            Some(ParamValue::List(items)) => items.into_iter().map(Value::String).collect(),
            Some(ParamValue::Str(s)) => {
                // A scalar may carry a JSON-encoded id array.
                match serde_json::from_str::<Value>(&s) {
                    Ok(Value::Array(items)) => items,
                    _ => vec![Value::String(s)],
                }
            }
            None => Vec::new(),
        }
    }
}
