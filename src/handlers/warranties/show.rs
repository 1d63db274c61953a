// handlers/warranties/show.rs - GET /warranties/:id handler

use axum::extract::Extension;

use crate::database::models::Warranty;
use crate::middleware::{parse_id, ApiPath, ApiResponse, ApiResult, TenantPool};
use crate::services::WarrantyService;

pub async fn warranty_show(
    Extension(TenantPool(pool)): Extension<TenantPool>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Warranty> {
    let id = parse_id(&id)?;
    let warranty = WarrantyService::new(pool).get_by_id(id).await?;
    Ok(ApiResponse::success(warranty))
}
