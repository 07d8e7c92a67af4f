use trellis_query::SortDirection;

use crate::error::GridError;
use crate::eval::{row_matches, sort_cmp};
use crate::page::{PageRange, slice_page};
use crate::predicate::QueryPlan;
use crate::source::{Row, Selected, SelectSource};

/// Static-strategy row source over an in-memory set.
///
/// Serves data with no native server-side pagination (flat arrays,
/// directory listings): the full candidate set is filtered (and sorted if
/// requested) first, its size recorded as the total, then the page slice
/// is taken. Without a sort the set is walked once, cloning only rows
/// inside the range.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    rows: Vec<Row>,
}

impl MemorySource {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl SelectSource for MemorySource {
    fn select(&self, plan: &QueryPlan) -> Result<Selected<'_>, GridError> {
        let range = PageRange::new(plan.offset.unwrap_or(0), plan.limit.unwrap_or(0));
        let matched = self
            .rows
            .iter()
            .filter(|row| plan.predicates.iter().all(|p| row_matches(row, p)));

        let (total, page) = if plan.order.is_empty() {
            // No sort: single pass, count everything, keep the range.
            let mut total = 0u64;
            let mut page = Vec::new();
            for row in matched {
                if range.contains(total) {
                    page.push(row.clone());
                }
                total += 1;
            }
            (total, page)
        } else {
            let mut collected: Vec<Row> = matched.cloned().collect();
            sort_rows(&mut collected, plan);
            let total = collected.len() as u64;
            (total, slice_page(collected, &range))
        };

        Ok(Selected {
            rows: Box::new(page.into_iter().map(Ok)),
            total,
        })
    }
}

fn sort_rows(rows: &mut [Row], plan: &QueryPlan) {
    rows.sort_by(|a, b| {
        for sort in &plan.order {
            let ord = sort_cmp(a.get(&sort.field), b.get(&sort.field));
            let ord = match sort.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            if ord != std::cmp::Ordering::Equal {
                return ord;
            }
        }
        std::cmp::Ordering::Equal
    });
}
