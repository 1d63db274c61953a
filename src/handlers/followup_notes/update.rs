// handlers/followup_notes/update.rs - PATCH|PUT /client-followup-notes/:id handler

use axum::extract::Extension;

use crate::database::models::ClientFollowupNote;
use crate::middleware::{parse_id, ApiJson, ApiPath, ApiResponse, ApiResult, TenantPool};
use crate::services::followup_notes::UpdateNote;
use crate::services::FollowupNoteService;

pub async fn note_update(
    Extension(TenantPool(pool)): Extension<TenantPool>,
    ApiPath(id): ApiPath<String>,
    ApiJson(input): ApiJson<UpdateNote>,
) -> ApiResult<ClientFollowupNote> {
    let id = parse_id(&id)?;
    input.validate()?;
    let note = FollowupNoteService::new(pool).update(id, input).await?;
    Ok(ApiResponse::success(note))
}
