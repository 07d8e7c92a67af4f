use serde_json::Value;
use trellis_query::OrderSpec;

/// Compiled filter clause, the vocabulary handed to row sources and
/// delete targets.
///
/// Values are carried as plain JSON scalars; date and datetime bounds are
/// rendered as `%Y-%m-%d` / `%Y-%m-%d %H:%M:%S` strings in UTC storage
/// time.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq(String, Value),
    NotEq(String, Value),
    /// SQL `LIKE` with `%`/`_` wildcards already embedded in the pattern.
    Like(String, String),
    In(String, Vec<Value>),
    Lt(String, Value),
    Gt(String, Value),
    /// Inclusive range.
    Between(String, Value, Value),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    /// Raw SQL fragment, the `where` escape hatch. Callers own its safety.
    Raw(String),
}

/// Bounded, validated plan for one fetch.
///
/// `predicates` are an implicit AND. `limit: None` means no cap and
/// `offset: None` no skip; the tree extension relies on both for child
/// queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPlan {
    pub predicates: Vec<Predicate>,
    pub order: OrderSpec,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}
