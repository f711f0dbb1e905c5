use super::context::TenantContext;
use super::error::TenantError;
use super::id::TenantId;
use crate::config::TenancyConfig;

/// Hook asked by the persistence layer which tenant the current unit of work targets
pub trait CurrentTenantResolver: Send + Sync {
    /// Always yields an identifier; unbound work maps to the default tenant
    fn resolve_current_tenant(&self) -> TenantId;

    /// Resolution that may refuse to fall back to the default tenant
    fn try_resolve_current_tenant(&self) -> Result<TenantId, TenantError> {
        Ok(self.resolve_current_tenant())
    }

    /// Sessions are tenant-agnostic; the connection behind them is picked per operation.
    fn validate_existing_sessions(&self) -> bool {
        true
    }
}

/// Resolver backed by [`TenantContext`]
#[derive(Debug, Clone)]
pub struct ContextTenantResolver {
    default_tenant: TenantId,
    require_binding: bool,
}

impl ContextTenantResolver {
    pub fn new(default_tenant: TenantId) -> Self {
        Self {
            default_tenant,
            require_binding: false,
        }
    }

    pub fn from_config(config: &TenancyConfig) -> Result<Self, TenantError> {
        Ok(Self::new(TenantId::new(config.default_tenant.clone())?).require_binding(config.require_binding))
    }

    /// When set, `try_resolve_current_tenant` only accepts an explicit, non-default binding
    pub fn require_binding(mut self, require: bool) -> Self {
        self.require_binding = require;
        self
    }

    pub fn default_tenant(&self) -> &TenantId {
        &self.default_tenant
    }

    /// The bound tenant, regardless of configuration. Fails with `Unbound` when nothing
    /// is bound and with `Reserved` when the binding names the default tenant.
    pub fn resolve_strict(&self) -> Result<TenantId, TenantError> {
        let tenant = TenantContext::current().ok_or(TenantError::Unbound)?;
        if tenant == self.default_tenant {
            return Err(TenantError::Reserved(tenant.to_string()));
        }
        Ok(tenant)
    }
}

impl CurrentTenantResolver for ContextTenantResolver {
    fn resolve_current_tenant(&self) -> TenantId {
        TenantContext::current().unwrap_or_else(|| self.default_tenant.clone())
    }

    fn try_resolve_current_tenant(&self) -> Result<TenantId, TenantError> {
        if self.require_binding {
            self.resolve_strict()
        } else {
            Ok(self.resolve_current_tenant())
        }
    }
}
