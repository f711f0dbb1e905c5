pub mod error;
pub mod factory;
pub mod models;
pub mod store;
pub mod template;

pub use error::DatabaseError;
pub use factory::{ConnectionFactory, PgConnectionFactory};
pub use models::TenantConfig;
pub use store::{PgTenantConfigStore, TenantConfigStore};
pub use template::{is_valid_db_name, ConnectionTemplate};
