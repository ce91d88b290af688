use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::dbs::{FileThreadStore, MemoryThreadStore};
use crate::error::{PersistError, Result};
use crate::store::ThreadStore;

/// Which backend holds the thread table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    #[default]
    File,
    #[serde(rename = "mongodb")]
    MongoDb,
}

pub struct StoreBuilder {
    backend: StoreBackend,
    path: Option<PathBuf>,
    mongodb_uri: Option<String>,
    database: Option<String>,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: None,
            mongodb_uri: None,
            database: None,
        }
    }

    pub fn backend(mut self, backend: StoreBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Directory for the file backend
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn mongodb_uri(mut self, uri: impl Into<String>) -> Self {
        self.mongodb_uri = Some(uri.into());
        self
    }

    pub fn database(mut self, db: impl Into<String>) -> Self {
        self.database = Some(db.into());
        self
    }

    pub async fn build(self) -> Result<Arc<dyn ThreadStore>> {
        match self.backend {
            StoreBackend::Memory => Ok(Arc::new(MemoryThreadStore::new())),
            StoreBackend::File => {
                let path = self
                    .path
                    .ok_or_else(|| PersistError::Internal("path is required for the file store".to_string()))?;
                Ok(Arc::new(FileThreadStore::open(path).await?))
            }
            StoreBackend::MongoDb => self.build_mongo().await,
        }
    }

    #[cfg(feature = "mongodb")]
    async fn build_mongo(self) -> Result<Arc<dyn ThreadStore>> {
        let uri = self
            .mongodb_uri
            .ok_or_else(|| PersistError::Internal("mongodb_uri is required".to_string()))?;
        let database = self
            .database
            .ok_or_else(|| PersistError::Internal("database is required".to_string()))?;
        let store = crate::dbs::MongoThreadStore::connect(&uri, &database).await?;
        Ok(Arc::new(store))
    }

    #[cfg(not(feature = "mongodb"))]
    async fn build_mongo(self) -> Result<Arc<dyn ThreadStore>> {
        Err(PersistError::Internal(
            "built without the `mongodb` feature".to_string(),
        ))
    }
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}
