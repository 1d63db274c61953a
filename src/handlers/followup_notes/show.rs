// handlers/followup_notes/show.rs - GET /client-followup-notes/:id handler

use axum::extract::Extension;

use crate::database::models::ClientFollowupNote;
use crate::middleware::{parse_id, ApiPath, ApiResponse, ApiResult, TenantPool};
use crate::services::FollowupNoteService;

pub async fn note_show(
    Extension(TenantPool(pool)): Extension<TenantPool>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<ClientFollowupNote> {
    let id = parse_id(&id)?;
    let note = FollowupNoteService::new(pool).get_by_id(id).await?;
    Ok(ApiResponse::success(note))
}
