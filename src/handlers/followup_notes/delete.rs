// handlers/followup_notes/delete.rs - DELETE /client-followup-notes/:id handler

use axum::extract::Extension;

use crate::database::models::ClientFollowupNote;
use crate::middleware::{parse_id, ApiPath, ApiResponse, ApiResult, OptionalJson, TenantPool};
use crate::services::followup_notes::NoteActor;
use crate::services::FollowupNoteService;

pub async fn note_delete(
    Extension(TenantPool(pool)): Extension<TenantPool>,
    ApiPath(id): ApiPath<String>,
    OptionalJson(actor): OptionalJson<NoteActor>,
) -> ApiResult<ClientFollowupNote> {
    let id = parse_id(&id)?;
    let note = FollowupNoteService::new(pool).deactivate(id, actor).await?;
    Ok(ApiResponse::success(note))
}
