// handlers/tenant/mod.rs - Handlers scoped to the tenant bound to the request

pub mod ping;   // GET /api/tenant/ping
pub mod whoami; // GET /api/tenant/whoami

pub use ping::tenant_ping;
pub use whoami::tenant_whoami;
