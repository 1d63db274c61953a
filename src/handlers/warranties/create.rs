// handlers/warranties/create.rs - POST /warranties handler

use axum::extract::Extension;

use crate::database::models::Warranty;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, TenantPool};
use crate::services::warranties::CreateWarranty;
use crate::services::WarrantyService;

/// Validates the whole body before touching the database; answers 201 with
/// the stored row.
pub async fn warranty_create(
    Extension(TenantPool(pool)): Extension<TenantPool>,
    ApiJson(input): ApiJson<CreateWarranty>,
) -> ApiResult<Warranty> {
    input.validate()?;
    let warranty = WarrantyService::new(pool).create(input).await?;
    Ok(ApiResponse::created(warranty))
}
