// handlers/warranties/mod.rs - Warranty record handlers
//
// Every route here sits behind the tenant middleware, which resolves `ref`
// to a pool and injects it as `TenantPool`.

use crate::error::ApiError;
use crate::filter::{parse_range_bound, RangeEdge};
use crate::middleware::QueryParams;
use crate::services::warranties::WarrantyFilter;

pub mod create; // POST /warranties
pub mod delete; // DELETE /warranties/:id
pub mod list;   // GET /warranties
pub mod show;   // GET /warranties/:id
pub mod update; // PATCH|PUT /warranties/:id

pub use create::warranty_create;
pub use delete::warranty_delete;
pub use list::warranty_list;
pub use show::warranty_show;
pub use update::warranty_update;

/// Listing predicates from the query string.
pub fn filter_from_query(query: &QueryParams) -> Result<WarrantyFilter, ApiError> {
    Ok(WarrantyFilter {
        customer_name: query.get_owned("customer_name"),
        customer_identification: query.get_owned("customer_identification"),
        seller_id: query.get_owned("seller_id"),
        status: query.get_owned("status"),
        is_active: query.bool("is_active")?,
        date_start: parse_range_bound("date_start", query.get("date_start"), RangeEdge::Start)?,
        date_end: parse_range_bound("date_end", query.get("date_end"), RangeEdge::End)?,
    })
}
