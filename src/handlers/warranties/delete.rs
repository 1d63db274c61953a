// handlers/warranties/delete.rs - DELETE /warranties/:id handler

use axum::extract::Extension;

use crate::database::models::Warranty;
use crate::middleware::{parse_id, ApiPath, ApiResponse, ApiResult, OptionalJson, TenantPool};
use crate::services::warranties::WarrantyActor;
use crate::services::WarrantyService;

/// Soft delete: flips `is_active` off and stamps the optional actor. The row
/// stays in place and repeating the call is harmless.
pub async fn warranty_delete(
    Extension(TenantPool(pool)): Extension<TenantPool>,
    ApiPath(id): ApiPath<String>,
    OptionalJson(actor): OptionalJson<WarrantyActor>,
) -> ApiResult<Warranty> {
    let id = parse_id(&id)?;
    let warranty = WarrantyService::new(pool).deactivate(id, actor).await?;
    Ok(ApiResponse::success(warranty))
}
