// handlers/followup_notes/stats.rs - GET /client-followup-notes/stats handler

use axum::extract::Extension;

use super::filter_from_query;
use crate::middleware::{ApiResponse, ApiResult, QueryParams, TenantPool};
use crate::services::note_stats::NoteStats;
use crate::services::NoteStatsService;

/// Daily (trailing 30 days) and monthly (current year) note counts. Accepts
/// the listing predicates; any date range is ignored.
pub async fn note_stats(
    Extension(TenantPool(pool)): Extension<TenantPool>,
    query: QueryParams,
) -> ApiResult<NoteStats> {
    let filter = filter_from_query(&query)?;
    let stats = NoteStatsService::new(pool).collect(&filter).await?;
    Ok(ApiResponse::success(stats))
}
