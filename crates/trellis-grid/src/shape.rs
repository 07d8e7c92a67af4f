use std::collections::HashMap;

use chrono::{FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::{FieldCatalog, FieldOptions};
use crate::source::Row;

const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// One output column: alias, source field, optional render hook key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskEntry {
    pub alias: String,
    pub source: String,
    #[serde(default)]
    pub render: Option<String>,
}

impl MaskEntry {
    pub fn new(alias: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            source: source.into(),
            render: None,
        }
    }

    pub fn with_render(mut self, hook: impl Into<String>) -> Self {
        self.render = Some(hook.into());
        self
    }
}

pub type RenderFn = Box<dyn Fn(&Value, &Row, Option<&FieldOptions>) -> Option<Value>>;

/// Render hooks keyed by name, registered at configuration time.
///
/// Mask entries reference hooks by key; there is no name-based dispatch
/// at shape time beyond this table.
#[derive(Default)]
pub struct RenderRegistry {
    hooks: HashMap<String, RenderFn>,
}

impl RenderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, hook: F)
    where
        F: Fn(&Value, &Row, Option<&FieldOptions>) -> Option<Value> + 'static,
    {
        self.hooks.insert(name.into(), Box::new(hook));
    }

    fn get(&self, name: &str) -> Option<&RenderFn> {
        self.hooks.get(name)
    }
}

/// Audit-column display settings for an authorized viewer.
#[derive(Debug, Clone)]
pub struct AuditView {
    pub timezone: FixedOffset,
    /// Audit date columns to localize, by their name in the shaped row.
    pub columns: Vec<String>,
}

/// Applies the field mask to raw rows, producing the client-facing shape.
///
/// Mask entries are applied strictly left to right over a mutable row
/// buffer: a render hook's output is written back under the source field,
/// so later entries observe rendered values. This ordering is a contract,
/// not an accident.
pub struct RowShaper<'a> {
    mask: &'a [MaskEntry],
    renderers: &'a RenderRegistry,
    catalog: &'a dyn FieldCatalog,
    primary_key: &'a str,
    collect_ids: bool,
    collected: Vec<Value>,
    audit: Option<&'a AuditView>,
}

impl<'a> RowShaper<'a> {
    pub fn new(
        mask: &'a [MaskEntry],
        renderers: &'a RenderRegistry,
        catalog: &'a dyn FieldCatalog,
        primary_key: &'a str,
    ) -> Self {
        Self {
            mask,
            renderers,
            catalog,
            primary_key,
            collect_ids: false,
            collected: Vec::new(),
            audit: None,
        }
    }

    /// Record each row's primary-key value in fetch order. Duplicates are
    /// preserved.
    pub fn collect_ids(mut self, on: bool) -> Self {
        self.collect_ids = on;
        self
    }

    pub fn with_audit(mut self, view: &'a AuditView) -> Self {
        self.audit = Some(view);
        self
    }

    /// Shape one row. An empty mask passes the row through unchanged.
    pub fn shape(&mut self, row: &mut Row) -> Row {
        if self.collect_ids
            && let Some(id) = row.get(self.primary_key)
        {
            self.collected.push(id.clone());
        }

        let mut out = if self.mask.is_empty() {
            row.clone()
        } else {
            self.apply_mask(row)
        };
        self.localize_audit(&mut out);
        out
    }

    fn apply_mask(&self, row: &mut Row) -> Row {
        let mut out = Row::new();
        for entry in self.mask {
            let raw = row.get(&entry.source).cloned().unwrap_or(Value::Null);
            let value = match entry.render.as_deref().and_then(|n| self.renderers.get(n)) {
                Some(hook) => {
                    let options = self.catalog.field_options(&entry.alias);
                    match hook(&raw, row, options.as_ref()) {
                        Some(rendered) => {
                            // Later mask entries must observe the rendered
                            // value.
                            row.insert(entry.source.clone(), rendered.clone());
                            rendered
                        }
                        None => raw,
                    }
                }
                None => raw,
            };
            out.insert(entry.alias.clone(), value);
        }

        // The primary key travels even when the mask omits it.
        if !out.contains_key(self.primary_key)
            && let Some(id) = row.get(self.primary_key)
        {
            out.insert(self.primary_key.to_string(), id.clone());
        }
        out
    }

    fn localize_audit(&self, out: &mut Row) {
        let Some(view) = self.audit else {
            return;
        };
        for column in &view.columns {
            let stored = match out.get(column) {
                Some(Value::String(s)) => s.clone(),
                _ => continue,
            };
            let Ok(naive) = NaiveDateTime::parse_from_str(&stored, DATETIME_FMT) else {
                continue;
            };
            let utc = Utc.from_utc_datetime(&naive);
            let local = utc.with_timezone(&view.timezone);
            out.insert(format!("{column}_ts"), Value::from(utc.timestamp()));
            out.insert(
                column.clone(),
                Value::String(local.format(DATETIME_FMT).to_string()),
            );
        }
    }

    /// Primary-key values collected so far, in fetch order.
    pub fn collected_ids(&self) -> &[Value] {
        &self.collected
    }

    pub fn take_collected(&mut self) -> Vec<Value> {
        std::mem::take(&mut self.collected)
    }
}
