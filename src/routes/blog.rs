/**
 * Blog Routes
 * List and create blog posts
 */
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::db::models::{BlogPost, Entity, EntityKind, NewBlogPost};
use crate::db::Filter;
use crate::error::AppError;
use crate::routes::{ApiJson, ApiQuery};
use crate::AppState;

/// Query parameters for GET /api/blog
#[derive(Debug, Deserialize)]
pub struct BlogListQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Only posts with this publish status. All posts when absent.
    pub published: Option<bool>,
}

fn default_limit() -> usize {
    20
}

/// Response for POST /api/blog
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: String,
}

/// GET /api/blog - Up to `limit` posts in storage order
pub async fn list_posts(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<BlogListQuery>,
) -> Result<Json<Vec<BlogPost>>, AppError> {
    let mut filter = Filter::new();
    if let Some(published) = query.published {
        filter.insert("published".to_string(), published.into());
    }

    let records = state
        .db
        .list(EntityKind::BlogPost, &filter, query.limit)
        .await
        .map_err(AppError::from_read)?;

    // One bad record fails the whole listing.
    let posts = records
        .into_iter()
        .map(BlogPost::from_record)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(posts))
}

/// POST /api/blog - Create a post
pub async fn create_post(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewBlogPost>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let post = BlogPost::new(payload)?;
    let id = state.db.create(&post).await?;

    tracing::info!(id = %id, slug = %post.slug, "blog post created");
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}
