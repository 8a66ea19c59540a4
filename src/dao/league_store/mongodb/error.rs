use mongodb::error::{Error as MongoError, ErrorKind, WriteError, WriteFailure};
use thiserror::Error;
use uuid::Uuid;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

const DUPLICATE_KEY: i32 = 11000;

/// Whether a write was rejected by a unique index.
pub(super) fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(WriteError {
            code: DUPLICATE_KEY,
            ..
        }))
    )
}

#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("missing environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to {operation} in collection `{collection}`")]
    Query {
        collection: &'static str,
        operation: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("transaction step `{step}` failed while {operation}")]
    Transaction {
        operation: &'static str,
        step: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("document `{id}` in `{collection}` is malformed: {message}")]
    Decode {
        collection: &'static str,
        id: String,
        message: String,
    },
    #[error("stats row for player `{player_id}` vanished during game result commit")]
    StatsVanished { player_id: Uuid },
}

impl MongoDaoError {
    pub(super) fn query(
        collection: &'static str,
        operation: &'static str,
    ) -> impl FnOnce(MongoError) -> Self {
        move |source| MongoDaoError::Query {
            collection,
            operation,
            source,
        }
    }

    pub(super) fn transaction(
        operation: &'static str,
        step: &'static str,
    ) -> impl FnOnce(MongoError) -> Self {
        move |source| MongoDaoError::Transaction {
            operation,
            step,
            source,
        }
    }

    pub(super) fn decode(
        collection: &'static str,
        id: impl Into<String>,
        message: impl std::fmt::Display,
    ) -> Self {
        MongoDaoError::Decode {
            collection,
            id: id.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn write_error(code: i32) -> MongoError {
        let failure: WriteError =
            serde_json::from_value(json!({ "code": code, "errmsg": "write rejected" })).unwrap();
        MongoError::from(ErrorKind::Write(WriteFailure::WriteError(failure)))
    }

    #[test]
    fn unique_index_violation_is_a_duplicate_key() {
        assert!(is_duplicate_key(&write_error(11000)));
        assert!(!is_duplicate_key(&write_error(121)));
    }
}
