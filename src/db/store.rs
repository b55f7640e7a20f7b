//! Storage backend abstraction.
//!
//! A store holds named collections of schema-less JSON records. Every record
//! handed back by [`DocumentStore::find`] carries its identifier under
//! [`ID_FIELD`]; bodies passed to [`DocumentStore::insert`] never do.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// Name of the identifier field injected into records read from a store.
pub const ID_FIELD: &str = "_id";

/// A stored record: a JSON object.
pub type Record = Map<String, Value>;

/// Equality filter over top-level record fields. Empty matches everything.
pub type Filter = Map<String, Value>;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database not available")]
    Unavailable,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("{kind} did not serialize to a JSON object")]
    NotAnObject { kind: &'static str },
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Name of the underlying database.
    fn name(&self) -> &str;

    /// Persist `body` under `id` in `collection`.
    async fn insert(&self, collection: &str, id: &str, body: Record) -> StoreResult<()>;

    /// Up to `limit` records of `collection` matching `filter`, in insertion order.
    async fn find(&self, collection: &str, filter: &Filter, limit: usize)
        -> StoreResult<Vec<Record>>;

    /// Names of all collections holding at least one record, sorted.
    async fn collection_names(&self) -> StoreResult<Vec<String>>;

    /// Cheapest possible round-trip to the backend.
    async fn ping(&self) -> StoreResult<()>;

    /// Release backend resources. Called once at shutdown.
    async fn close(&self) {}
}
