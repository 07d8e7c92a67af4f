use serde_json::Value;
use trellis_query::{FilterDescriptor, OrderSpec};

use crate::page::PageRange;

/// Immutable snapshot of resolved paging/sort/filter state for one
/// request. Built once by the resolver at the start of a read or delete
/// operation and discarded at its end.
#[derive(Debug, Clone)]
pub struct RequestParameters {
    pub(crate) limit: u64,
    pub(crate) page: u64,
    pub(crate) offset: u64,
    pub(crate) order: OrderSpec,
    pub(crate) fast_filter: Vec<FilterDescriptor>,
    pub(crate) direct_filter: Vec<FilterDescriptor>,
    pub(crate) rows_selector: Vec<Value>,
}

impl RequestParameters {
    /// Resolved page size; 0 means unbounded.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn order(&self) -> &OrderSpec {
        &self.order
    }

    /// Column-header filters, request-scoped.
    pub fn fast_filter(&self) -> &[FilterDescriptor] {
        &self.fast_filter
    }

    /// Form-driven filters read from the persistent store.
    pub fn direct_filter(&self) -> &[FilterDescriptor] {
        &self.direct_filter
    }

    /// Fast filters followed by direct filters.
    pub fn all_filters(&self) -> impl Iterator<Item = &FilterDescriptor> {
        self.fast_filter.iter().chain(self.direct_filter.iter())
    }

    /// Ids selected by the client, for delete-by-selection.
    pub fn rows_selector(&self) -> &[Value] {
        &self.rows_selector
    }

    /// Row range derived from offset and limit.
    pub fn page_range(&self) -> PageRange {
        PageRange::new(self.offset, self.limit)
    }
}
