use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use sqlx::PgPool;

use super::extract::QueryParams;
use crate::app::AppState;
use crate::error::ApiError;

/// Database pool selected for this request, injected by middleware
#[derive(Clone)]
pub struct TenantPool(pub PgPool);

/// Resolve the `ref` query parameter to a pool before any record handler runs.
///
/// A ref in an environment without refs, or no ref and no default database,
/// both answer 404 so the record routes look absent.
pub async fn tenant_pool_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let query = QueryParams::parse(request.uri().query());
    let pool = state.databases.resolve(query.get("ref")).await?;

    tracing::debug!("Database pool resolved for ref {:?}", query.get("ref"));

    request.extensions_mut().insert(TenantPool(pool));
    Ok(next.run(request).await)
}
