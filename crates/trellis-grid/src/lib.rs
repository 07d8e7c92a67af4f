mod catalog;
mod clock;
mod compile;
mod delete;
mod error;
mod eval;
mod grid;
mod locale;
mod memory;
mod page;
mod params;
mod predicate;
mod request;
mod resolver;
mod shape;
mod source;
mod store;
mod tree;


pub use catalog::{FieldCatalog, FieldOptions, FieldType, MapCatalog};
pub use clock::{Clock, FixedClock, SystemClock};
pub use compile::{AuditColumns, FilterCompiler, OrderCompiler};
pub use delete::{
    DeleteMode, DeleteOrchestrator, DeleteOutcome, DeleteRule, DeleteTarget, Dependency,
    OutcomeClass,
};
pub use error::GridError;
pub use eval::row_matches;
pub use grid::{DataPage, GridModel};
pub use locale::{KeyLocalizer, Localizer};
pub use memory::MemorySource;
pub use page::{PageRange, RangeIter, slice_page};
pub use params::{MapParams, ParamSource, ParamValue};
pub use predicate::{Predicate, QueryPlan};
pub use request::RequestParameters;
pub use resolver::{GridConfig, ParamName, ParamResolver, Strictness};
pub use shape::{AuditView, MaskEntry, RenderRegistry, RowShaper};
pub use source::{Row, RowIter, Selected, SelectSource};
pub use store::{FilterStore, MemoryFilterStore};
pub use tree::{ROOT_NODE, TreeConfig, TreeGridModel, TreeNodeQuery};
