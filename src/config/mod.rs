use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub tenancy: TenancyConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Shared connection template. Its path segment is replaced by the tenant database name.
    pub url: Option<String>,
    /// Database holding the `tenants` table, also served for the default tenant.
    pub system_database: String,
    pub max_connections: u32,
    /// Pool acquire timeout in seconds
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenancyConfig {
    /// Identifier used when no tenant is bound to the current unit of work
    pub default_tenant: String,
    /// Request header carrying the tenant identifier
    pub tenant_header: String,
    /// Reject tenant-scoped requests that arrive without a tenant signal
    pub require_binding: bool,
    /// Build every tenant pool at startup instead of on first use
    pub eager_warmup: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    #[serde(skip_serializing, default)]
    pub jwt_secret: String,
    /// Shared secret for `/api/root/*`, sent as `x-operator-token`. Empty disables it.
    #[serde(skip_serializing, default)]
    pub operator_token: String,
    /// Let loopback peers reach `/api/root/*` without the operator token
    #[serde(default)]
    pub operator_localhost: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("SYSTEM_DB_NAME") {
            if !v.trim().is_empty() {
                self.database.system_database = v;
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Tenancy overrides
        if let Ok(v) = env::var("TENANT_DEFAULT") {
            if !v.trim().is_empty() {
                self.tenancy.default_tenant = v;
            }
        }
        if let Ok(v) = env::var("TENANT_HEADER") {
            if !v.trim().is_empty() {
                self.tenancy.tenant_header = v.trim().to_ascii_lowercase();
            }
        }
        if let Ok(v) = env::var("TENANT_REQUIRE_BINDING") {
            self.tenancy.require_binding = v.parse().unwrap_or(self.tenancy.require_binding);
        }
        if let Ok(v) = env::var("TENANT_EAGER_WARMUP") {
            self.tenancy.eager_warmup = v.parse().unwrap_or(self.tenancy.eager_warmup);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("OPERATOR_TOKEN") {
            self.security.operator_token = v;
        }
        if let Ok(v) = env::var("OPERATOR_ALLOW_LOCALHOST") {
            self.security.operator_localhost = v.parse().unwrap_or(self.security.operator_localhost);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                system_database: "catering_main".to_string(),
                max_connections: 5,
                connection_timeout: 30,
            },
            tenancy: TenancyConfig {
                default_tenant: "default".to_string(),
                tenant_header: "x-tenant-id".to_string(),
                require_binding: false,
                eager_warmup: false,
            },
            security: SecurityConfig {
                enable_cors: true,
                jwt_secret: String::new(),
                operator_token: String::new(),
                operator_localhost: true,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: None,
                system_database: "catering_main".to_string(),
                max_connections: 10,
                connection_timeout: 10,
            },
            tenancy: TenancyConfig {
                default_tenant: "default".to_string(),
                tenant_header: "x-tenant-id".to_string(),
                require_binding: false,
                eager_warmup: true,
            },
            security: SecurityConfig {
                enable_cors: true,
                jwt_secret: String::new(),
                operator_token: String::new(),
                operator_localhost: false,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: None,
                system_database: "catering_main".to_string(),
                max_connections: 20,
                connection_timeout: 5,
            },
            tenancy: TenancyConfig {
                default_tenant: "default".to_string(),
                tenant_header: "x-tenant-id".to_string(),
                require_binding: true,
                eager_warmup: true,
            },
            security: SecurityConfig {
                enable_cors: false,
                jwt_secret: String::new(),
                operator_token: String::new(),
                operator_localhost: false,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
