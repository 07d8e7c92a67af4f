use serde_json::{Map, Value};

use crate::error::GridError;
use crate::predicate::QueryPlan;

/// One result row: backend field name to value.
pub type Row = Map<String, Value>;

pub type RowIter<'a> = Box<dyn Iterator<Item = Result<Row, GridError>> + 'a>;

/// Result of a select: streamed rows plus the found-rows total.
///
/// `total` counts all rows matching the plan's predicates, ignoring the
/// limit/offset range, so the client can page.
pub struct Selected<'a> {
    pub rows: RowIter<'a>,
    pub total: u64,
}

/// External row provider (SQL command, in-memory set, ...).
///
/// The source applies the plan's predicates, order and range itself.
/// SQL-backed sources push `limit`/`offset` into the query (dynamic
/// strategy); array-backed sources materialize, filter and slice
/// (static strategy). The grid model is identical over both.
pub trait SelectSource {
    fn select(&self, plan: &QueryPlan) -> Result<Selected<'_>, GridError>;
}
