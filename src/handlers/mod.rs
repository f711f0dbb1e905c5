// handlers/mod.rs - HTTP handlers
//
// Every route runs behind the tenant binder, so handlers read the tenant through
// the shared `TenantRouter` instead of parsing headers themselves.
//
// Route Prefixes:
//   /health            system database liveness
//   /api/tenant/*      operations on the tenant bound to the request
//   /api/root/tenant/* operator views over every tenant, addressed by name

pub mod health;
pub mod root;
pub mod tenant;

pub use health::health;
