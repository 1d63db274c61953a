pub mod extract;
pub mod response;
pub mod tenant;

pub use extract::{parse_id, ApiJson, ApiPath, OptionalJson, QueryParams};
pub use response::{success_with, ApiResponse, ApiResult, Paginated};
pub use tenant::{tenant_pool_middleware, TenantPool};
