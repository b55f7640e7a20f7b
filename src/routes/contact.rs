/**
 * Contact Routes
 * Contact form submissions (write-only)
 */
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::db::models::{ContactMessage, NewContactMessage};
use crate::error::AppError;
use crate::routes::ApiJson;
use crate::AppState;

/// Response for POST /api/contact
#[derive(Debug, Serialize, Deserialize)]
pub struct ContactResponse {
    pub status: String,
    pub id: String,
}

/// POST /api/contact - Store a contact message
pub async fn submit_contact(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<NewContactMessage>,
) -> Result<(StatusCode, Json<ContactResponse>), AppError> {
    let msg = ContactMessage::new(form)?;
    let id = state.db.create(&msg).await?;

    tracing::info!(id = %id, "contact message stored");
    Ok((
        StatusCode::CREATED,
        Json(ContactResponse {
            status: "ok".to_string(),
            id,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, EntityKind, Filter, MemoryDocumentStore};
    use crate::routes::ErrorResponse;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::post;
    use axum::Router;
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn submit(db: &Database, json: serde_json::Value) -> (StatusCode, axum::body::Bytes) {
        let app = Router::new()
            .route("/api/contact", post(submit_contact))
            .with_state(AppState::new(db.clone(), Default::default()));
        let req = Request::post("/api/contact")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes)
    }

    fn form(email: &str) -> serde_json::Value {
        json!({ "name": "Ada", "email": email, "message": "Hello there" })
    }

    #[tokio::test]
    async fn test_valid_submission_returns_created() {
        let db = Database::new(Arc::new(MemoryDocumentStore::default()));
        let (status, bytes) = submit(&db, form("a@b.com")).await;
        assert_eq!(status, StatusCode::CREATED);

        let body: ContactResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.status, "ok");
        assert!(!body.id.is_empty());

        let stored = db
            .list(EntityKind::ContactMessage, &Filter::new(), 10)
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["message"], "Hello there");
    }

    #[tokio::test]
    async fn test_invalid_email_is_rejected_without_write() {
        let db = Database::new(Arc::new(MemoryDocumentStore::default()));
        let (status, bytes) = submit(&db, form("not-an-email")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(body.detail.contains("email"));
        assert!(db.collection_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_message_is_rejected() {
        let db = Database::new(Arc::new(MemoryDocumentStore::default()));
        let (status, _) = submit(&db, json!({ "name": "Ada", "email": "a@b.com" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_without_database_is_server_error() {
        let (status, _) = submit(&Database::disconnected(), form("a@b.com")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
