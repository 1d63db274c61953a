// handlers/warranties/list.rs - GET /warranties handler

use axum::extract::{Extension, State};

use super::filter_from_query;
use crate::app::AppState;
use crate::database::models::Warranty;
use crate::error::ApiError;
use crate::filter::{PageInfo, Pagination};
use crate::middleware::{Paginated, QueryParams, TenantPool};
use crate::services::WarrantyService;

/// Paginated warranty listing, most recently touched first.
///
/// Query: `page`, `limit`, `customer_name`, `customer_identification`,
/// `seller_id`, `status`, `is_active`, `date_start`, `date_end`, `ref`.
pub async fn warranty_list(
    State(state): State<AppState>,
    Extension(TenantPool(pool)): Extension<TenantPool>,
    query: QueryParams,
) -> Result<Paginated<Warranty>, ApiError> {
    let pagination = Pagination::from_query(query.get("page"), query.get("limit"), &state.config.filter)?;
    let filter = filter_from_query(&query)?;

    let (rows, total) = WarrantyService::new(pool).get_paginated(&filter, pagination).await?;
    Ok(Paginated::new(rows, PageInfo::new(pagination, total)))
}
