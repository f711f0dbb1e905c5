// handlers/root/mod.rs - Operator handlers spanning every tenant
//
// These address tenants by name in the path rather than through the request binding.

pub mod tenant;

pub use tenant::*;
