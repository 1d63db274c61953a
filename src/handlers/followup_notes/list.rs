// handlers/followup_notes/list.rs - GET /client-followup-notes handler

use axum::extract::{Extension, State};

use super::filter_from_query;
use crate::app::AppState;
use crate::database::models::ClientFollowupNote;
use crate::error::ApiError;
use crate::filter::{PageInfo, Pagination};
use crate::middleware::{Paginated, QueryParams, TenantPool};
use crate::services::FollowupNoteService;

pub async fn note_list(
    State(state): State<AppState>,
    Extension(TenantPool(pool)): Extension<TenantPool>,
    query: QueryParams,
) -> Result<Paginated<ClientFollowupNote>, ApiError> {
    let pagination = Pagination::from_query(query.get("page"), query.get("limit"), &state.config.filter)?;
    let filter = filter_from_query(&query)?;

    let (rows, total) = FollowupNoteService::new(pool).get_paginated(&filter, pagination).await?;
    Ok(Paginated::new(rows, PageInfo::new(pagination, total)))
}
