mod filter;
mod order;

pub use filter::{AuditColumns, FilterCompiler};
pub use order::OrderCompiler;
