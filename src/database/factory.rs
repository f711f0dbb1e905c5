use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::info;

use super::error::DatabaseError;
use super::template::ConnectionTemplate;
use crate::config::DatabaseConfig;

/// Builds pooled connection sources from fully resolved connection strings.
///
/// `build(None)` builds the system (non-tenant) source from process defaults.
/// Failures are returned to the caller as-is; nothing is retried here.
#[async_trait]
pub trait ConnectionFactory: Send + Sync + 'static {
    type Source: Clone + Send + Sync + 'static;

    async fn build(&self, connection_string: Option<&str>) -> Result<Self::Source, DatabaseError>;

    /// Release a source that is being evicted or shut down
    async fn close(&self, _source: &Self::Source) {}
}

/// sqlx Postgres pool factory
#[derive(Debug, Clone)]
pub struct PgConnectionFactory {
    template: ConnectionTemplate,
    system_database: String,
    max_connections: u32,
    acquire_timeout: Duration,
}

impl PgConnectionFactory {
    pub fn new(template: ConnectionTemplate, system_database: impl Into<String>) -> Self {
        Self {
            template,
            system_database: system_database.into(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
        }
    }

    pub fn from_config(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
        let template = ConnectionTemplate::parse(url)?;

        Ok(Self::new(template, config.system_database.clone())
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout)))
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max.max(1);
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn template(&self) -> &ConnectionTemplate {
        &self.template
    }
}

#[async_trait]
impl ConnectionFactory for PgConnectionFactory {
    type Source = PgPool;

    async fn build(&self, connection_string: Option<&str>) -> Result<PgPool, DatabaseError> {
        let connection_string = match connection_string {
            Some(s) => s.to_string(),
            None => self.template.for_database(&self.system_database)?,
        };

        // Connect eagerly so an unreachable database fails here, not on first query
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .connect(&connection_string)
            .await
            .map_err(|source| DatabaseError::ConnectionBuild {
                target: redact(&connection_string),
                source,
            })?;

        info!("Created database pool for: {}", redact(&connection_string));
        Ok(pool)
    }

    async fn close(&self, source: &PgPool) {
        source.close().await;
    }
}

/// Strip the password from a connection string before it reaches logs or errors
fn redact(connection_string: &str) -> String {
    match url::Url::parse(connection_string) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("***"));
            }
            url.into()
        }
        Err(_) => "<unparseable connection string>".to_string(),
    }
}
