//! PostgreSQL implementation of the link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{LinkId, LinkRecord, LinkUpdate, TagSet};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// PostgreSQL repository for link storage and retrieval.
///
/// Links live in the `links` table (see `migrations/`); tags and images are
/// `TEXT[]` columns and the identifier is stored as its 24-hex text form.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: String,
    url: String,
    title: String,
    tags: Vec<String>,
    images: Vec<String>,
    user_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LinkRow {
    fn into_record(self) -> Result<LinkRecord, AppError> {
        let id = self
            .id
            .parse::<LinkId>()
            .map_err(|e| AppError::persist(format!("corrupt id {:?}: {e}", self.id)))?;

        Ok(LinkRecord {
            id,
            url: self.url,
            title: self.title,
            tags: self.tags.into_iter().collect::<TagSet>(),
            images: self.images,
            user_id: self.user_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn find_by_id(&self, id: LinkId) -> Result<Option<LinkRecord>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, url, title, tags, images, user_id, created_at, updated_at
            FROM links
            WHERE id = $1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(LinkRow::into_record).transpose()
    }

    async fn update(&self, update: LinkUpdate) -> Result<LinkRecord, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            UPDATE links
            SET url = $2, title = $3, tags = $4, images = $5, user_id = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING id, url, title, tags, images, user_id, created_at, updated_at
            "#,
        )
        .bind(update.id.to_string())
        .bind(&update.url)
        .bind(&update.title)
        .bind(update.tags.as_slice())
        .bind(&update.images)
        .bind(&update.user_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        // The row can vanish between the refresher's read and this write.
        match row {
            Some(row) => row.into_record(),
            None => Err(AppError::not_found(update.id)),
        }
    }
}
