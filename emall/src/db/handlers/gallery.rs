//! Database repository for gallery items.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::gallery::{GalleryItemCreateDBRequest, GalleryItemDBResponse, GalleryItemUpdateDBRequest, GalleryStatsDBResponse},
};
use crate::types::{GalleryItemId, abbrev_uuid};
use sqlx::{PgConnection, QueryBuilder};
use tracing::instrument;

/// Filter for listing gallery items
#[derive(Debug, Clone, Default)]
pub struct GalleryFilter {
    pub category: Option<String>,
    pub only_visible: bool,
}

pub struct Gallery<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Gallery<'c> {
    type CreateRequest = GalleryItemCreateDBRequest;
    type UpdateRequest = GalleryItemUpdateDBRequest;
    type Response = GalleryItemDBResponse;
    type Id = GalleryItemId;
    type Filter = GalleryFilter;

    #[instrument(skip(self, request), fields(title = %request.title), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let item = sqlx::query_as::<_, GalleryItemDBResponse>(
            r#"
            INSERT INTO gallery (title, category, image_url, cloudinary_id, is_visible)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&request.title)
        .bind(&request.category)
        .bind(&request.image_url)
        .bind(&request.cloudinary_id)
        .bind(request.is_visible)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(item)
    }

    #[instrument(skip(self), fields(item_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let item = sqlx::query_as::<_, GalleryItemDBResponse>("SELECT * FROM gallery WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(item)
    }

    #[instrument(skip(self, filter), fields(category = ?filter.category, only_visible = filter.only_visible), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM gallery WHERE 1=1");

        if filter.only_visible {
            query.push(" AND is_visible = TRUE");
        }
        if let Some(ref category) = filter.category {
            query.push(" AND category = ");
            query.push_bind(category);
        }

        query.push(" ORDER BY created_at DESC");

        let items = query.build_query_as::<GalleryItemDBResponse>().fetch_all(&mut *self.db).await?;

        Ok(items)
    }

    #[instrument(skip(self), fields(item_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM gallery WHERE id = $1").bind(id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(item_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let item = sqlx::query_as::<_, GalleryItemDBResponse>(
            r#"
            UPDATE gallery SET
                title = COALESCE($2, title),
                category = COALESCE($3, category),
                image_url = COALESCE($4, image_url),
                cloudinary_id = COALESCE($5, cloudinary_id),
                is_visible = COALESCE($6, is_visible)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.title)
        .bind(&request.category)
        .bind(&request.image_url)
        .bind(&request.cloudinary_id)
        .bind(request.is_visible)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(item)
    }
}

impl<'c> Gallery<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Aggregate counts for the admin dashboard
    #[instrument(skip(self), err)]
    pub async fn stats(&mut self) -> Result<GalleryStatsDBResponse> {
        let stats = sqlx::query_as::<_, GalleryStatsDBResponse>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE is_visible) AS visible,
                COUNT(*) FILTER (WHERE NOT is_visible) AS hidden
            FROM gallery
            "#,
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(stats)
    }
}
