pub mod tenant;

pub use tenant::TenantConfig;
