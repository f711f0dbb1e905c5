pub mod operator;
pub mod response;
pub mod tenant;

pub use operator::{require_operator_middleware, OperatorGuard, OPERATOR_TOKEN_HEADER};
pub use response::{ApiResponse, ApiResult};
pub use tenant::{bind_tenant_middleware, BoundTenant, TenantBinder};
