//! Database repository for events and their ordered images.

use crate::api::models::events::EventStatus;
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::events::{EventCreateDBRequest, EventDBResponse, EventImageDBRequest, EventImageDBResponse, EventStatsDBResponse, EventUpdateDBRequest},
};
use crate::slug::{slugify, with_millis_suffix};
use crate::types::{EventId, abbrev_uuid};
use chrono::Utc;
use sqlx::{PgConnection, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

/// Filter for listing events
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub status: Option<EventStatus>,
}

pub struct Events<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Events<'c> {
    type CreateRequest = EventCreateDBRequest;
    type UpdateRequest = EventUpdateDBRequest;
    type Response = EventDBResponse;
    type Id = EventId;
    type Filter = EventFilter;

    #[instrument(skip(self, request), fields(title = %request.title), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let slug = self.unique_slug(&request.title, None).await?;

        let mut event = sqlx::query_as::<_, EventDBResponse>(
            r#"
            INSERT INTO events (title, slug, description, event_date, status, display_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&request.title)
        .bind(&slug)
        .bind(&request.description)
        .bind(request.event_date)
        .bind(request.status)
        .bind(request.display_order)
        .fetch_one(&mut *self.db)
        .await?;

        event.images = self.insert_images(event.id, &request.images).await?;

        Ok(event)
    }

    #[instrument(skip(self), fields(event_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let event = sqlx::query_as::<_, EventDBResponse>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        match event {
            Some(mut event) => {
                event.images = self.images_for(event.id).await?;
                Ok(Some(event))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, filter), fields(status = ?filter.status), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM events WHERE 1=1");

        if let Some(status) = filter.status {
            query.push(" AND status = ");
            query.push_bind(status);
        }

        query.push(" ORDER BY display_order ASC, created_at DESC");

        let events = query.build_query_as::<EventDBResponse>().fetch_all(&mut *self.db).await?;

        self.attach_images(events).await
    }

    #[instrument(skip(self), fields(event_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        // Images go with the event via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM events WHERE id = $1").bind(id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(event_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // A new title means a new slug, checked against every other event
        let slug = match &request.title {
            Some(title) => Some(self.unique_slug(title, Some(id)).await?),
            None => None,
        };

        let mut event = sqlx::query_as::<_, EventDBResponse>(
            r#"
            UPDATE events SET
                title = COALESCE($2, title),
                slug = COALESCE($3, slug),
                description = COALESCE($4, description),
                event_date = COALESCE($5, event_date),
                status = COALESCE($6, status),
                display_order = COALESCE($7, display_order),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.title)
        .bind(&slug)
        .bind(&request.description)
        .bind(request.event_date)
        .bind(request.status)
        .bind(request.display_order)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        // An images field in the request replaces the whole set, even when empty
        event.images = match &request.images {
            Some(images) => {
                sqlx::query("DELETE FROM event_images WHERE event_id = $1")
                    .bind(id)
                    .execute(&mut *self.db)
                    .await?;
                self.insert_images(id, images).await?
            }
            None => self.images_for(id).await?,
        };

        Ok(event)
    }
}

impl<'c> Events<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_slug(&mut self, slug: &str) -> Result<Option<EventDBResponse>> {
        let event = sqlx::query_as::<_, EventDBResponse>("SELECT * FROM events WHERE slug = $1 LIMIT 1")
            .bind(slug)
            .fetch_optional(&mut *self.db)
            .await?;

        match event {
            Some(mut event) => {
                event.images = self.images_for(event.id).await?;
                Ok(Some(event))
            }
            None => Ok(None),
        }
    }

    /// Aggregate counts for the admin dashboard
    #[instrument(skip(self), err)]
    pub async fn stats(&mut self) -> Result<EventStatsDBResponse> {
        let stats = sqlx::query_as::<_, EventStatsDBResponse>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'published') AS published,
                COUNT(*) FILTER (WHERE status = 'draft') AS draft
            FROM events
            "#,
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(stats)
    }

    /// Derive a slug from the title, suffixing with epoch millis on collision.
    ///
    /// Uniqueness lives here rather than in a DB constraint, so two concurrent
    /// creates with the same title can race through the existence check. The
    /// loser keeps a duplicate slug instead of failing the insert, which is
    /// acceptable for a back office with a single admin.
    async fn unique_slug(&mut self, title: &str, exclude: Option<EventId>) -> Result<String> {
        let slug = slugify(title);

        let taken: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM events WHERE slug = $1 AND ($2::uuid IS NULL OR id != $2))")
            .bind(&slug)
            .bind(exclude)
            .fetch_one(&mut *self.db)
            .await?;

        if taken {
            Ok(with_millis_suffix(&slug, Utc::now().timestamp_millis()))
        } else {
            Ok(slug)
        }
    }

    async fn insert_images(&mut self, event_id: EventId, images: &[EventImageDBRequest]) -> Result<Vec<EventImageDBResponse>> {
        let mut inserted = Vec::with_capacity(images.len());
        for (index, image) in images.iter().enumerate() {
            let row = sqlx::query_as::<_, EventImageDBResponse>(
                r#"
                INSERT INTO event_images (event_id, image_url, cloudinary_id, display_order)
                VALUES ($1, $2, $3, $4)
                RETURNING *
                "#,
            )
            .bind(event_id)
            .bind(&image.image_url)
            .bind(&image.cloudinary_id)
            .bind(index as i32)
            .fetch_one(&mut *self.db)
            .await?;
            inserted.push(row);
        }
        Ok(inserted)
    }

    async fn images_for(&mut self, event_id: EventId) -> Result<Vec<EventImageDBResponse>> {
        let images =
            sqlx::query_as::<_, EventImageDBResponse>("SELECT * FROM event_images WHERE event_id = $1 ORDER BY display_order ASC")
                .bind(event_id)
                .fetch_all(&mut *self.db)
                .await?;

        Ok(images)
    }

    async fn attach_images(&mut self, mut events: Vec<EventDBResponse>) -> Result<Vec<EventDBResponse>> {
        if events.is_empty() {
            return Ok(events);
        }

        let ids: Vec<EventId> = events.iter().map(|e| e.id).collect();
        let images =
            sqlx::query_as::<_, EventImageDBResponse>("SELECT * FROM event_images WHERE event_id = ANY($1) ORDER BY display_order ASC")
                .bind(&ids)
                .fetch_all(&mut *self.db)
                .await?;

        let mut by_event: HashMap<EventId, Vec<EventImageDBResponse>> = HashMap::new();
        for image in images {
            by_event.entry(image.event_id).or_default().push(image);
        }
        for event in &mut events {
            event.images = by_event.remove(&event.id).unwrap_or_default();
        }

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    fn sample_event(title: &str) -> EventCreateDBRequest {
        EventCreateDBRequest {
            title: title.to_string(),
            description: "A night of music and food.".to_string(),
            event_date: None,
            status: EventStatus::Draft,
            display_order: 0,
            images: vec![],
        }
    }

    fn image(url: &str) -> EventImageDBRequest {
        EventImageDBRequest {
            image_url: url.to_string(),
            cloudinary_id: None,
        }
    }

    #[sqlx::test]
    async fn create_derives_slug_from_title(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Events::new(&mut conn);

        let event = repo.create(&sample_event("Summer Night Market!")).await.unwrap();
        assert_eq!(event.slug, "summer-night-market");
        assert_eq!(event.status, EventStatus::Draft);
    }

    #[sqlx::test]
    async fn colliding_slug_gets_millis_suffix(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Events::new(&mut conn);

        let first = repo.create(&sample_event("Grand Opening")).await.unwrap();
        let second = repo.create(&sample_event("Grand Opening")).await.unwrap();

        assert_eq!(first.slug, "grand-opening");
        assert!(second.slug.starts_with("grand-opening-"));
        assert_ne!(first.slug, second.slug);
    }

    #[sqlx::test]
    async fn update_with_same_title_keeps_own_slug(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Events::new(&mut conn);

        let event = repo.create(&sample_event("Grand Opening")).await.unwrap();

        // Re-submitting the same title must not trip the collision check on itself
        let updated = repo
            .update(
                event.id,
                &EventUpdateDBRequest {
                    title: Some("Grand Opening".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.slug, "grand-opening");
        assert!(updated.updated_at >= event.updated_at);
    }

    #[sqlx::test]
    async fn images_keep_submission_order(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Events::new(&mut conn);

        let mut request = sample_event("Food Festival");
        request.images = vec![
            image("https://cdn.example.com/1.jpg"),
            image("https://cdn.example.com/2.jpg"),
            image("https://cdn.example.com/3.jpg"),
        ];
        let event = repo.create(&request).await.unwrap();

        let orders: Vec<i32> = event.images.iter().map(|i| i.display_order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
        assert_eq!(event.images[0].image_url, "https://cdn.example.com/1.jpg");

        // Replacing the set restarts the ordering from zero
        let updated = repo
            .update(
                event.id,
                &EventUpdateDBRequest {
                    images: Some(vec![image("https://cdn.example.com/9.jpg")]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.images.len(), 1);
        assert_eq!(updated.images[0].display_order, 0);
    }

    #[sqlx::test]
    async fn list_orders_by_display_order_then_newest(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Events::new(&mut conn);

        let mut pinned = sample_event("Pinned");
        pinned.display_order = 1;
        pinned.status = EventStatus::Published;
        repo.create(&pinned).await.unwrap();

        let mut front = sample_event("Front");
        front.status = EventStatus::Published;
        repo.create(&front).await.unwrap();

        let published = repo
            .list(&EventFilter {
                status: Some(EventStatus::Published),
            })
            .await
            .unwrap();
        let titles: Vec<&str> = published.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Front", "Pinned"]);

        let drafts = repo
            .list(&EventFilter {
                status: Some(EventStatus::Draft),
            })
            .await
            .unwrap();
        assert!(drafts.is_empty());
    }

    #[sqlx::test]
    async fn get_by_slug_returns_event_with_images(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Events::new(&mut conn);

        let mut request = sample_event("Kids Day");
        request.images = vec![EventImageDBRequest {
            image_url: "https://cdn.example.com/kids.jpg".to_string(),
            cloudinary_id: Some("emall/events/kids".to_string()),
        }];
        repo.create(&request).await.unwrap();

        let found = repo.get_by_slug("kids-day").await.unwrap().unwrap();
        assert_eq!(found.title, "Kids Day");
        assert_eq!(found.images.len(), 1);
        assert_eq!(found.images[0].cloudinary_id.as_deref(), Some("emall/events/kids"));

        assert!(repo.get_by_slug("no-such-event").await.unwrap().is_none());
    }

    #[sqlx::test]
    async fn delete_cascades_to_images(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Events::new(&mut conn);

        let mut request = sample_event("Cleanup");
        request.images = vec![image("https://cdn.example.com/x.jpg")];
        let event = repo.create(&request).await.unwrap();

        assert!(repo.delete(event.id).await.unwrap());

        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM event_images WHERE event_id = $1")
            .bind(event.id)
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[sqlx::test]
    async fn stats_counts_by_status(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Events::new(&mut conn);

        repo.create(&sample_event("Draft One")).await.unwrap();
        let mut published = sample_event("Live One");
        published.status = EventStatus::Published;
        repo.create(&published).await.unwrap();

        let stats = repo.stats().await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.published, 1);
        assert_eq!(stats.draft, 1);
    }
}
