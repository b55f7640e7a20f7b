//! PostgreSQL document store.
//!
//! All collections share one JSONB table:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS documents (
//!     seq BIGSERIAL PRIMARY KEY,
//!     id TEXT UNIQUE NOT NULL,
//!     collection TEXT NOT NULL,
//!     body JSONB NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT now()
//! );
//! ```
//!
//! `seq` gives the storage-native insertion order used by listings.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use super::store::{DocumentStore, Filter, Record, StoreResult, ID_FIELD};
use super::DbConfig;

pub struct PgDocumentStore {
    pool: PgPool,
    database: String,
}

impl PgDocumentStore {
    /// Connect using `config` and make sure the documents table exists.
    pub async fn connect(config: &DbConfig, url: &str) -> StoreResult<Self> {
        let mut options = PgConnectOptions::from_str(url)?;
        if let Some(name) = &config.database_name {
            options = options.database(name);
        }

        tracing::debug!(
            "Database URL: {}",
            url.replace(
                |c: char| !c.is_ascii_alphanumeric()
                    && c != ':'
                    && c != '/'
                    && c != '@'
                    && c != '.',
                "*"
            )
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(1800))
            .test_before_acquire(true)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: PgPool) -> StoreResult<Self> {
        let database: String = sqlx::query_scalar("SELECT current_database()")
            .fetch_one(&pool)
            .await?;

        let store = Self { pool, database };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> StoreResult<()> {
        tracing::info!("Ensuring documents table exists...");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                seq BIGSERIAL PRIMARY KEY,
                id TEXT UNIQUE NOT NULL,
                collection TEXT NOT NULL,
                body JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_documents_collection_seq ON documents(collection, seq)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_body ON documents USING GIN(body)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    fn name(&self) -> &str {
        &self.database
    }

    async fn insert(&self, collection: &str, id: &str, body: Record) -> StoreResult<()> {
        sqlx::query("INSERT INTO documents (id, collection, body) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(collection)
            .bind(Value::Object(body))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: usize,
    ) -> StoreResult<Vec<Record>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows: Vec<(String, Value)> = sqlx::query_as(
            r#"
            SELECT id, body
            FROM documents
            WHERE collection = $1 AND body @> $2
            ORDER BY seq
            LIMIT $3
            "#,
        )
        .bind(collection)
        .bind(Value::Object(filter.clone()))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, body)| {
                // Non-object bodies are passed through empty so entity
                // validation reports the missing fields.
                let mut record = match body {
                    Value::Object(map) => map,
                    _ => Record::new(),
                };
                record.insert(ID_FIELD.to_string(), Value::String(id));
                record
            })
            .collect())
    }

    async fn collection_names(&self) -> StoreResult<Vec<String>> {
        let names = sqlx::query_scalar("SELECT DISTINCT collection FROM documents ORDER BY collection")
            .fetch_all(&self.pool)
            .await?;
        Ok(names)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Connects to `TEST_DATABASE_URL`; tests return early when it is unset.
    async fn test_store() -> Option<PgDocumentStore> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        let config = DbConfig {
            url: Some(url.clone()),
            ..DbConfig::default()
        };
        Some(PgDocumentStore::connect(&config, &url).await.unwrap())
    }

    #[tokio::test]
    async fn test_insert_then_find_by_containment() {
        let Some(store) = test_store().await else {
            eprintln!("TEST_DATABASE_URL missing; skipping postgres store test");
            return;
        };
        let collection = format!("test_{}", uuid::Uuid::new_v4().simple());

        let body = json!({ "title": "Hello", "published": true });
        store
            .insert(&collection, "first", body.as_object().cloned().unwrap())
            .await
            .unwrap();
        let other = json!({ "title": "Draft", "published": false });
        store
            .insert(&collection, "second", other.as_object().cloned().unwrap())
            .await
            .unwrap();

        let all = store.find(&collection, &Filter::new(), 10).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0][ID_FIELD], "first");

        let filter = json!({ "published": false }).as_object().cloned().unwrap();
        let drafts = store.find(&collection, &filter, 10).await.unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0]["title"], "Draft");

        assert!(store.collection_names().await.unwrap().contains(&collection));
        sqlx::query("DELETE FROM documents WHERE collection = $1")
            .bind(&collection)
            .execute(store.pool())
            .await
            .unwrap();
    }
}
