pub mod context;
pub mod error;
pub mod id;
pub mod registry;
pub mod resolver;
pub mod router;

pub use context::{TenantContext, TenantGuard};
pub use error::TenantError;
pub use id::TenantId;
pub use registry::{TenantConnectionRegistry, WarmupReport};
pub use resolver::{ContextTenantResolver, CurrentTenantResolver};
pub use router::TenantRouter;
