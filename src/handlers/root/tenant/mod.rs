// handlers/root/tenant/mod.rs - Tenant pool management handlers

pub mod evict;  // DELETE /api/root/tenant/:name/pool
pub mod health; // GET /api/root/tenant/:name/health
pub mod list;   // GET /api/root/tenant
pub mod warmup; // POST /api/root/tenant/warmup

pub use evict::tenant_evict;
pub use health::tenant_health;
pub use list::tenant_list;
pub use warmup::tenant_warmup;
