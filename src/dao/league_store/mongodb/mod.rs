mod config;
mod connection;
mod error;
mod models;
pub mod store;

pub use config::MongoConfig;
pub use error::MongoDaoError;
pub use store::MongoLeagueStore;

use crate::dao::storage::StorageError;

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        match err {
            MongoDaoError::Decode {
                collection,
                id,
                message,
            } => StorageError::corrupted(collection, format!("{id}: {message}")),
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
