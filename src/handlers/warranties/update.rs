// handlers/warranties/update.rs - PATCH|PUT /warranties/:id handler

use axum::extract::Extension;

use crate::database::models::Warranty;
use crate::middleware::{parse_id, ApiJson, ApiPath, ApiResponse, ApiResult, TenantPool};
use crate::services::warranties::UpdateWarranty;
use crate::services::WarrantyService;

/// Partial update. Omitted fields keep their value; an explicit `null` clears
/// the nullable contact and relation columns.
pub async fn warranty_update(
    Extension(TenantPool(pool)): Extension<TenantPool>,
    ApiPath(id): ApiPath<String>,
    ApiJson(input): ApiJson<UpdateWarranty>,
) -> ApiResult<Warranty> {
    let id = parse_id(&id)?;
    input.validate()?;
    let warranty = WarrantyService::new(pool).update(id, input).await?;
    Ok(ApiResponse::success(warranty))
}
