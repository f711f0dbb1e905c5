use thiserror::Error;

/// Errors from building connection strings and pools, and from system database queries
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Invalid database name: {0}")]
    InvalidDatabaseName(String),

    /// The pool could not be created: malformed target or unreachable server
    #[error("Failed to build connection pool for '{target}': {source}")]
    ConnectionBuild {
        target: String,
        #[source]
        source: sqlx::Error,
    },

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}
