use snafu::Snafu;

use crate::database::DatabaseQueryError;

pub type Result<T, E = EngineError> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum EngineError {
    #[snafu(display("{entity} `{id}` was not found"))]
    NotFound { entity: &'static str, id: String },

    #[snafu(display("the storage backend failed: {source}"))]
    Storage { source: DatabaseQueryError },

    /// A guarded write lost against a concurrent writer. Internal: the retry
    /// wrapper either absorbs this or converts it to `ConflictRetryExhausted`.
    #[snafu(display("a concurrent writer updated the record first"))]
    Conflict,

    #[snafu(display("could not converge after {attempts} conflicting write attempts"))]
    ConflictRetryExhausted { attempts: usize },
}

impl EngineError {
    /// Whether retrying the operation can help. Covers our own revision-guard
    /// losses and the backing store reporting a retryable transaction.
    pub fn is_transient(&self) -> bool {
        match self {
            EngineError::Conflict => true,
            EngineError::Storage { source } => {
                source.to_string().contains("transaction can be retried")
            }
            _ => false,
        }
    }
}
