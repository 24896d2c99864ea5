//! Database repository for rooms and their images.

use crate::api::models::rooms::RoomStatus;
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::rooms::{RoomCreateDBRequest, RoomDBResponse, RoomImageDBRequest, RoomImageDBResponse, RoomStatsDBResponse, RoomUpdateDBRequest},
};
use crate::types::{RoomId, abbrev_uuid};
use sqlx::{PgConnection, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

/// Filter for listing rooms
#[derive(Debug, Clone, Default)]
pub struct RoomFilter {
    pub status: Option<RoomStatus>,
}

pub struct Rooms<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Rooms<'c> {
    type CreateRequest = RoomCreateDBRequest;
    type UpdateRequest = RoomUpdateDBRequest;
    type Response = RoomDBResponse;
    type Id = RoomId;
    type Filter = RoomFilter;

    #[instrument(skip(self, request), fields(room_number = %request.room_number), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let mut room = sqlx::query_as::<_, RoomDBResponse>(
            r#"
            INSERT INTO rooms (room_number, title, block, floor, category, rent, status, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&request.room_number)
        .bind(&request.title)
        .bind(&request.block)
        .bind(&request.floor)
        .bind(&request.category)
        .bind(request.rent)
        .bind(request.status)
        .bind(&request.description)
        .fetch_one(&mut *self.db)
        .await?;

        room.images = self.insert_images(room.id, &request.images).await?;

        Ok(room)
    }

    #[instrument(skip(self), fields(room_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let room = sqlx::query_as::<_, RoomDBResponse>("SELECT * FROM rooms WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        match room {
            Some(mut room) => {
                room.images = self.images_for(room.id).await?;
                Ok(Some(room))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, filter), fields(status = ?filter.status), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM rooms WHERE 1=1");

        if let Some(status) = filter.status {
            query.push(" AND status = ");
            query.push_bind(status);
        }

        query.push(" ORDER BY block ASC, room_number ASC");

        let rooms = query.build_query_as::<RoomDBResponse>().fetch_all(&mut *self.db).await?;

        self.attach_images(rooms).await
    }

    #[instrument(skip(self), fields(room_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        // Images go with the room via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM rooms WHERE id = $1").bind(id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(room_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let mut room = sqlx::query_as::<_, RoomDBResponse>(
            r#"
            UPDATE rooms SET
                room_number = COALESCE($2, room_number),
                title = COALESCE($3, title),
                block = COALESCE($4, block),
                floor = COALESCE($5, floor),
                category = COALESCE($6, category),
                rent = COALESCE($7, rent),
                status = COALESCE($8, status),
                description = COALESCE($9, description)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.room_number)
        .bind(&request.title)
        .bind(&request.block)
        .bind(&request.floor)
        .bind(&request.category)
        .bind(request.rent)
        .bind(request.status)
        .bind(&request.description)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        // An images field in the request replaces the whole set, even when empty
        room.images = match &request.images {
            Some(images) => {
                sqlx::query("DELETE FROM room_images WHERE room_id = $1")
                    .bind(id)
                    .execute(&mut *self.db)
                    .await?;
                self.insert_images(id, images).await?
            }
            None => self.images_for(id).await?,
        };

        Ok(room)
    }
}

impl<'c> Rooms<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Aggregate counts for the admin dashboard
    #[instrument(skip(self), err)]
    pub async fn stats(&mut self) -> Result<RoomStatsDBResponse> {
        let stats = sqlx::query_as::<_, RoomStatsDBResponse>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'vacant') AS vacant,
                COUNT(*) FILTER (WHERE status = 'rented') AS rented,
                COUNT(*) FILTER (WHERE category = 'Business Centre') AS business_centre
            FROM rooms
            "#,
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(stats)
    }

    async fn insert_images(&mut self, room_id: RoomId, images: &[RoomImageDBRequest]) -> Result<Vec<RoomImageDBResponse>> {
        let mut inserted = Vec::with_capacity(images.len());
        for image in images {
            let row = sqlx::query_as::<_, RoomImageDBResponse>(
                r#"
                INSERT INTO room_images (room_id, image_url, cloudinary_id)
                VALUES ($1, $2, $3)
                RETURNING *
                "#,
            )
            .bind(room_id)
            .bind(&image.image_url)
            .bind(&image.cloudinary_id)
            .fetch_one(&mut *self.db)
            .await?;
            inserted.push(row);
        }
        Ok(inserted)
    }

    async fn images_for(&mut self, room_id: RoomId) -> Result<Vec<RoomImageDBResponse>> {
        let images = sqlx::query_as::<_, RoomImageDBResponse>("SELECT * FROM room_images WHERE room_id = $1 ORDER BY created_at ASC")
            .bind(room_id)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(images)
    }

    async fn attach_images(&mut self, mut rooms: Vec<RoomDBResponse>) -> Result<Vec<RoomDBResponse>> {
        if rooms.is_empty() {
            return Ok(rooms);
        }

        let ids: Vec<RoomId> = rooms.iter().map(|r| r.id).collect();
        let images = sqlx::query_as::<_, RoomImageDBResponse>("SELECT * FROM room_images WHERE room_id = ANY($1) ORDER BY created_at ASC")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        let mut by_room: HashMap<RoomId, Vec<RoomImageDBResponse>> = HashMap::new();
        for image in images {
            by_room.entry(image.room_id).or_default().push(image);
        }
        for room in &mut rooms {
            room.images = by_room.remove(&room.id).unwrap_or_default();
        }

        Ok(rooms)
    }
}
