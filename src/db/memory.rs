//! In-process document store.
//!
//! Selected with `DATABASE_URL=memory://`. Data lives as long as the process.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::store::{DocumentStore, Filter, Record, StoreResult, ID_FIELD};

pub struct MemoryDocumentStore {
    name: String,
    collections: RwLock<BTreeMap<String, Vec<(String, Record)>>>,
}

impl MemoryDocumentStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collections: RwLock::new(BTreeMap::new()),
        }
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new("memory")
    }
}

fn matches(body: &Record, filter: &Filter) -> bool {
    filter
        .iter()
        .all(|(key, expected)| body.get(key) == Some(expected))
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn insert(&self, collection: &str, id: &str, body: Record) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push((id.to_string(), body));
        Ok(())
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: usize,
    ) -> StoreResult<Vec<Record>> {
        let collections = self.collections.read().await;
        let Some(records) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        Ok(records
            .iter()
            .filter(|(_, body)| matches(body, filter))
            .take(limit)
            .map(|(id, body)| {
                let mut record = body.clone();
                record.insert(ID_FIELD.to_string(), id.clone().into());
                record
            })
            .collect())
    }

    async fn collection_names(&self) -> StoreResult<Vec<String>> {
        let collections = self.collections.read().await;
        Ok(collections
            .iter()
            .filter(|(_, records)| !records.is_empty())
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
