pub mod dates;
pub mod error;
pub mod filter;
pub mod filter_order;
pub mod filter_where;
pub mod pagination;
pub mod types;

pub use dates::{parse_range_bound, RangeEdge};
pub use error::FilterError;
pub use filter::Filter;
pub use filter_where::FilterWhere;
pub use pagination::{PageInfo, Pagination};
pub use types::*;
