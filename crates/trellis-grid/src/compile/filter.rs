use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;
use trellis_query::{DateBucket, FilterDescriptor, FilterOp};

use crate::catalog::{FieldCatalog, FieldOptions, FieldType};
use crate::clock::Clock;
use crate::predicate::Predicate;

const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FMT: &str = "%Y-%m-%d";

/// Column names used by the audit composites (`lu`, `ld`) and by the row
/// shaper's timezone conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditColumns {
    pub created_by: String,
    pub updated_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Default for AuditColumns {
    fn default() -> Self {
        Self {
            created_by: "created_by".into(),
            updated_by: "updated_by".into(),
            created_at: "created_at".into(),
            updated_at: "updated_at".into(),
        }
    }
}

/// Compiles filter descriptors into backend predicates.
///
/// Descriptors whose property has no field metadata are skipped silently;
/// clients routinely hold filter state for columns that no longer exist,
/// and a read must degrade rather than fail.
pub struct FilterCompiler<'a> {
    catalog: &'a dyn FieldCatalog,
    clock: &'a dyn Clock,
    timezone: FixedOffset,
    audit: AuditColumns,
}

impl<'a> FilterCompiler<'a> {
    pub fn new(catalog: &'a dyn FieldCatalog, clock: &'a dyn Clock, timezone: FixedOffset) -> Self {
        Self {
            catalog,
            clock,
            timezone,
            audit: AuditColumns::default(),
        }
    }

    pub fn with_audit_columns(mut self, audit: AuditColumns) -> Self {
        self.audit = audit;
        self
    }

    pub fn compile(&self, filters: &[FilterDescriptor]) -> Vec<Predicate> {
        let mut predicates = Vec::with_capacity(filters.len());
        for descriptor in filters {
            let Some(options) = self.catalog.field_options(&descriptor.property) else {
                debug!(property = %descriptor.property, "unknown filter property skipped");
                continue;
            };
            if let Some(predicate) = self.compile_one(descriptor, &options) {
                predicates.push(predicate);
            }
        }
        predicates
    }

    fn compile_one(
        &self,
        descriptor: &FilterDescriptor,
        options: &FieldOptions,
    ) -> Option<Predicate> {
        let field = options.target().to_string();
        let value = &descriptor.value;
        match descriptor.operator {
            FilterOp::Eq => Some(self.compile_eq(field, value, options)),
            FilterOp::Like => match value_text(value) {
                Some(text) => Some(Predicate::Like(field, format!("{text}%"))),
                None => {
                    debug!(property = %descriptor.property, "like filter without text value skipped");
                    None
                }
            },
            FilterOp::In => match value {
                Value::Array(items) => Some(Predicate::In(field, items.clone())),
                _ => {
                    debug!(property = %descriptor.property, "in filter without array value skipped");
                    None
                }
            },
            FilterOp::Lt => Some(Predicate::Lt(field, self.comparable(value))),
            FilterOp::Gt => Some(Predicate::Gt(field, self.comparable(value))),
            FilterOp::DateRange => {
                let (from, to) = self.bucket_bounds(value)?;
                Some(Predicate::Between(field, from, to))
            }
            FilterOp::AuditUser => Some(Predicate::Or(vec![
                Predicate::Eq(self.audit.updated_by.clone(), value.clone()),
                Predicate::Eq(self.audit.created_by.clone(), value.clone()),
            ])),
            FilterOp::AuditDate => {
                let (from, to) = self.bucket_bounds(value)?;
                Some(Predicate::Or(vec![
                    Predicate::Between(self.audit.created_at.clone(), from.clone(), to.clone()),
                    Predicate::Between(self.audit.updated_at.clone(), from, to),
                ]))
            }
            FilterOp::Where => match &descriptor.raw_where {
                Some(template) => {
                    let text = value_text(value).unwrap_or_default();
                    Some(Predicate::Raw(template.replace('?', &text)))
                }
                None => {
                    debug!(property = %descriptor.property, "where filter without template skipped");
                    None
                }
            },
        }
    }

    /// Equality with the grid's normalization rules: booleans (and their
    /// string forms) become 1/0, an empty value is coerced to `"0"`, and a
    /// bare date expands per the field's declared type.
    fn compile_eq(&self, field: String, value: &Value, options: &FieldOptions) -> Predicate {
        match value {
            Value::Bool(b) => Predicate::Eq(field, json!(i64::from(*b))),
            Value::Null => Predicate::Eq(field, json!("0")),
            Value::String(s) => match s.as_str() {
                "true" => Predicate::Eq(field, json!(1)),
                "false" => Predicate::Eq(field, json!(0)),
                "" => Predicate::Eq(field, json!("0")),
                s if s.parse::<f64>().is_ok() => Predicate::Eq(field, json!(s)),
                s => match NaiveDate::parse_from_str(s, DATE_FMT) {
                    Ok(date) if options.filter_type == Some(FieldType::DateTime) => {
                        let (from, to) = self.day_bounds(date);
                        Predicate::Between(field, from, to)
                    }
                    _ => Predicate::Eq(field, json!(s)),
                },
            },
            other => Predicate::Eq(field, other.clone()),
        }
    }

    /// Comparison bound for `lt`/`gt`: numbers pass through, non-numeric
    /// text is parsed as a `%Y-%m-%d` date in the configured timezone.
    fn comparable(&self, value: &Value) -> Value {
        let Value::String(s) = value else {
            return value.clone();
        };
        if s.parse::<f64>().is_ok() {
            return value.clone();
        }
        match NaiveDate::parse_from_str(s, DATE_FMT) {
            Ok(date) => self.to_store(date.and_time(NaiveTime::MIN)),
            Err(_) => value.clone(),
        }
    }

    fn bucket_bounds(&self, value: &Value) -> Option<(Value, Value)> {
        let bucket = match value.as_str().and_then(DateBucket::parse) {
            Some(bucket) => bucket,
            None => {
                debug!(?value, "unknown date bucket skipped");
                return None;
            }
        };
        let today = self
            .clock
            .now_utc()
            .with_timezone(&self.timezone)
            .date_naive();
        let (from, to) = bucket.window(today);
        Some((self.to_store(from), self.to_store(to)))
    }

    fn day_bounds(&self, date: NaiveDate) -> (Value, Value) {
        let from = date.and_time(NaiveTime::MIN);
        // 23:59:59 always exists for a valid date
        let to = date.and_hms_opt(23, 59, 59).unwrap();
        (self.to_store(from), self.to_store(to))
    }

    /// Render a local datetime as UTC storage time.
    fn to_store(&self, local: NaiveDateTime) -> Value {
        match self.timezone.from_local_datetime(&local).single() {
            Some(dt) => Value::String(dt.with_timezone(&Utc).format(DATETIME_FMT).to_string()),
            // Unreachable for fixed offsets; keep the local text as-is.
            None => Value::String(local.format(DATETIME_FMT).to_string()),
        }
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        _ => None,
    }
}
