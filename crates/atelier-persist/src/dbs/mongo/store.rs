use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, Client, Collection};

use super::models::MongoThread;
use crate::error::{PersistError, Result};
use crate::models::ChatThread;
use crate::store::ThreadStore;

pub struct MongoThreadStore {
    collection: Collection<MongoThread>,
}

impl MongoThreadStore {
    /// Connect to MongoDB and use the `threads` collection of `database`
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        Ok(Self::new(&client, database))
    }

    pub fn new(client: &Client, database: &str) -> Self {
        let collection = client.database(database).collection("threads");
        Self { collection }
    }
}

#[async_trait]
impl ThreadStore for MongoThreadStore {
    async fn add(&self, thread: ChatThread) -> Result<()> {
        let filter = doc! { "_id": thread.id.as_str() };
        if self.collection.find_one(filter).await?.is_some() {
            return Err(PersistError::AlreadyExists(thread.id));
        }
        self.collection.insert_one(MongoThread::from(thread)).await?;
        Ok(())
    }

    async fn get(&self, thread_id: &str) -> Result<Option<ChatThread>> {
        let filter = doc! { "_id": thread_id };
        Ok(self.collection.find_one(filter).await?.map(Into::into))
    }

    async fn put(&self, thread: ChatThread) -> Result<()> {
        let filter = doc! { "_id": thread.id.as_str() };
        self.collection
            .replace_one(filter, MongoThread::from(thread))
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn delete(&self, thread_id: &str) -> Result<()> {
        let filter = doc! { "_id": thread_id };
        self.collection.delete_one(filter).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ChatThread>> {
        let threads: Vec<MongoThread> = self
            .collection
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(threads.into_iter().map(Into::into).collect())
    }

    fn backend(&self) -> &'static str {
        "mongodb"
    }
}
