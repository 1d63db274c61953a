// handlers/followup_notes/create.rs - POST /client-followup-notes handler

use axum::extract::Extension;

use crate::database::models::ClientFollowupNote;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, TenantPool};
use crate::services::followup_notes::CreateNote;
use crate::services::FollowupNoteService;

pub async fn note_create(
    Extension(TenantPool(pool)): Extension<TenantPool>,
    ApiJson(input): ApiJson<CreateNote>,
) -> ApiResult<ClientFollowupNote> {
    input.validate()?;
    let note = FollowupNoteService::new(pool).create(input).await?;
    Ok(ApiResponse::created(note))
}
