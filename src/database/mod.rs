use serde::Deserialize;
use snafu::{Location, ResultExt, Snafu};
use surrealdb::engine::any::Any;
use surrealdb::opt::{auth, IntoQuery};
use surrealdb::Surreal;

/// Helper trait for executing arbitrary SurrealQL queries.
pub mod query;

/// Macros for defining table methods.
pub mod macros;

mod record;

pub use query::{Bindings, DatabaseQueryError};
pub use record::{Record, Table};
pub use surrealdb::sql::Thing;

pub type Result<T, E = DatabaseError> = std::result::Result<T, E>;

const SETUP: &str = include_str!("../../schema.surrealql");

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DatabaseError {
    #[snafu(display("cannot connect to the database `{url}` at {location}: {source}"))]
    Connection {
        url: String,
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("could not sign in to the database at {location}: {source}"))]
    Authenticate {
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("could not select namespace/database at {location}: {source}"))]
    Namespace {
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("could not apply the database schema at {location}: {source}"))]
    Schema {
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },
}

/// A cloneable handle over the backing store. Every engine operation borrows
/// one of these; connections are established once at startup (or per test).
#[derive(Debug, Clone)]
pub struct Database {
    inner: Surreal<Any>,
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let inner = surrealdb::engine::any::connect(config.url.as_str())
            .await
            .context(ConnectionSnafu {
                url: config.url.clone(),
            })?;

        if let Some(credentials) = &config.credentials {
            inner
                .signin(auth::Database {
                    namespace: &config.namespace,
                    database: &config.database,
                    username: &credentials.username,
                    password: &credentials.password,
                })
                .await
                .context(AuthenticateSnafu)?;
        }

        inner
            .use_ns(&config.namespace)
            .use_db(&config.database)
            .await
            .context(NamespaceSnafu)?;

        inner
            .query(SETUP)
            .await
            .context(SchemaSnafu)?
            .check()
            .context(SchemaSnafu)?;

        Ok(Self { inner })
    }

    /// Create a builder to execute arbitrary SurrealQL on the database.
    ///
    /// ```ignore
    /// let videos: Vec<VideoSummary> = db
    ///     .sql("SELECT id, name, category FROM videos WHERE category = $category")
    ///     .bind(("category", "podcast"))
    ///     .fetch()
    ///     .await?;
    /// ```
    pub fn sql(&self, query: impl IntoQuery) -> Bindings<'_> {
        Bindings::new(self.inner.query(query))
    }
}

impl std::ops::Deref for Database {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(rename = "surreal_url")]
    url: String,
    #[serde(rename = "surreal_ns", default = "default_namespace")]
    namespace: String,
    #[serde(rename = "surreal_db", default = "default_database")]
    database: String,
    #[serde(flatten)]
    credentials: Option<DatabaseCredentials>,
}

impl DatabaseConfig {
    /// An isolated in-memory store. Every [Database::connect] on this config
    /// opens a fresh datastore, which is what the tests lean on.
    pub fn memory() -> Self {
        Self {
            url: "mem://".to_string(),
            namespace: default_namespace(),
            database: default_database(),
            credentials: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
struct DatabaseCredentials {
    #[serde(rename = "surreal_user")]
    username: String,
    #[serde(rename = "surreal_pass")]
    password: String,
}

fn default_namespace() -> String {
    "tanuki".to_string()
}

fn default_database() -> String {
    "engine".to_string()
}
