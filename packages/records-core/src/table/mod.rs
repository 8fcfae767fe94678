//! Insertion-ordered entity tables with a guid index.

mod query;
#[allow(clippy::module_inception)]
mod table;

pub use query::ListQuery;
pub use table::Table;
