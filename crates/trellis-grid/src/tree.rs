use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::GridError;
use crate::grid::{DataPage, GridModel};
use crate::params::ParamSource;
use crate::predicate::{Predicate, QueryPlan};
use crate::source::SelectSource;
use crate::store::FilterStore;

/// Sentinel node identifier marking a top-level fetch.
pub const ROOT_NODE: &str = "root";

/// Root/child state for one tree request, derived once from the node
/// parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNodeQuery {
    pub parent_id: Option<Value>,
    pub is_root: bool,
}

impl TreeNodeQuery {
    /// An absent node parameter counts as root, like the sentinel.
    pub fn from_param(node: Option<&str>) -> Self {
        match node {
            None | Some(ROOT_NODE) => Self {
                parent_id: None,
                is_root: true,
            },
            Some(id) => Self {
                parent_id: Some(Value::String(id.to_string())),
                is_root: false,
            },
        }
    }
}

/// Adjacency-list settings layered on top of a grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Self-referential foreign key column.
    pub parent_field: String,
    /// Column carrying the child count; absent means every node reports 0.
    #[serde(default)]
    pub count_field: Option<String>,
    /// Initial expanded state emitted on every node.
    #[serde(default)]
    pub expanded: bool,
    #[serde(default = "default_node_param")]
    pub node_param: String,
}

fn default_node_param() -> String {
    "node".into()
}

impl TreeConfig {
    pub fn new(parent_field: impl Into<String>) -> Self {
        Self {
            parent_field: parent_field.into(),
            count_field: None,
            expanded: false,
            node_param: default_node_param(),
        }
    }
}

/// Tree traversal extension over [`GridModel`].
///
/// Root requests run the normal grid pipeline. Child requests fetch
/// exhaustively: pagination is disabled and the fast filter suppressed,
/// with the parent-key predicate standing in. Direct filters and the
/// sharing predicate still apply.
pub struct TreeGridModel {
    grid: GridModel,
    tree: TreeConfig,
}

impl TreeGridModel {
    pub fn new(grid: GridModel, tree: TreeConfig) -> Self {
        Self { grid, tree }
    }

    pub fn grid(&self) -> &GridModel {
        &self.grid
    }

    /// Root/child state for the given parameter source.
    pub fn node_query(&self, params: &dyn ParamSource) -> TreeNodeQuery {
        let node = params
            .get(&self.tree.node_param)
            .and_then(|v| v.as_str().map(str::to_string));
        TreeNodeQuery::from_param(node.as_deref())
    }

    pub fn fetch(
        &mut self,
        params: &dyn ParamSource,
        store: &dyn FilterStore,
        source: &dyn SelectSource,
    ) -> Result<DataPage, GridError> {
        let query = self.node_query(params);
        let request = self.grid.resolve(params, store)?;

        let plan = if query.is_root {
            self.grid.plan(&request)
        } else {
            let mut predicates = self.grid.compile_filters(request.direct_filter());
            if let Some(sharing) = self.grid.sharing() {
                predicates.push(sharing.clone());
            }
            if let Some(parent) = &query.parent_id {
                predicates.push(Predicate::Eq(
                    self.tree.parent_field.clone(),
                    parent.clone(),
                ));
            }
            QueryPlan {
                predicates,
                order: request.order().clone(),
                limit: None,
                offset: None,
            }
        };

        let mut page = self.grid.fetch_with_plan(&plan, source)?;
        for row in &mut page.rows {
            let count = self
                .tree
                .count_field
                .as_ref()
                .and_then(|field| row.get(field))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            row.insert("leaf".into(), json!(count == 0));
            row.insert("expanded".into(), json!(self.tree.expanded));
        }
        Ok(page)
    }
}
