use derive_new::new;
use serde::de::DeserializeOwned;
use snafu::{ResultExt, Snafu};
use surrealdb::opt::QueryResult;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DatabaseQueryError {
    #[snafu(display("failed to execute the query: {source}"))]
    QueryFailed { source: surrealdb::Error },

    #[snafu(display("failed to deserialize the database response: {source}"))]
    Deserialize { source: surrealdb::Error },

    #[snafu(display("expected a result but the response was empty"))]
    NoResults,
}

/// A query with bound parameters. Parameters are attached with [bind], which
/// takes any serializable value.
#[derive(Debug, new)]
pub struct Bindings<'a> {
    query: surrealdb::method::Query<'a, surrealdb::engine::any::Any>,
}

impl Bindings<'_> {
    pub fn bind(mut self, params: impl serde::Serialize) -> Self {
        let query = self.query;
        self.query = query.bind(params);
        self
    }

    /// Execute the query and return the raw [surrealdb::Response]. Statement
    /// errors (including cancelled transactions) surface here.
    pub async fn execute(self) -> Result<surrealdb::Response, DatabaseQueryError> {
        let response = self.query.await.context(QueryFailedSnafu)?;
        let response = response.check().context(QueryFailedSnafu)?;
        tracing::trace!(?response, "executed query");
        Ok(response)
    }

    /// Execute the query and deserialize the first statement's result.
    pub async fn fetch<T: DeserializeOwned>(self) -> Result<T, DatabaseQueryError>
    where
        usize: QueryResult<T>,
    {
        self.fetch_slot(0).await
    }

    /// Execute the query and deserialize the result of the statement at
    /// `index`. Statements inside `BEGIN`/`COMMIT` keep their own indexes.
    pub async fn fetch_slot<T: DeserializeOwned>(
        self,
        index: usize,
    ) -> Result<T, DatabaseQueryError>
    where
        usize: QueryResult<T>,
    {
        let mut response = self.execute().await?;
        response.take::<T>(index).context(DeserializeSnafu)
    }
}
