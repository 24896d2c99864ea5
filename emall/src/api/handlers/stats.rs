//! Aggregate dashboard statistics for the back office.

use crate::api::models::stats::AdminStatsResponse;
use crate::api::models::users::CurrentUser;
use crate::db::handlers::{Events, Gallery, Rooms};
use crate::errors::{Error, Result};
use crate::AppState;
use axum::{Json, extract::State};
use sqlx::Acquire;

#[utoipa::path(
    get,
    path = "/admin/stats",
    tag = "stats",
    summary = "Dashboard statistics",
    responses(
        (status = 200, description = "Counts for rooms, events, and gallery", body = AdminStatsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn admin_stats(State(state): State<AppState>, _current_user: CurrentUser) -> Result<Json<AdminStatsResponse>> {
    // One transaction so the three counts come from a consistent snapshot
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let rooms = {
        let mut repo = Rooms::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        repo.stats().await?
    };
    let events = {
        let mut repo = Events::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        repo.stats().await?
    };
    let gallery = {
        let mut repo = Gallery::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        repo.stats().await?
    };

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(AdminStatsResponse {
        rooms: rooms.into(),
        events: events.into(),
        gallery: gallery.into(),
    }))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn stats_require_a_session(pool: PgPool) {
        let app = create_test_app(pool).await;
        app.get("/api/v1/admin/stats").await.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn stats_aggregate_all_three_sections(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        create_test_admin(&pool, "admin@example.com", "password123").await;
        login(&app, "admin@example.com", "password123").await;

        app.post("/api/v1/rooms")
            .json(&json!({
                "room_number": "A-101", "title": "Shop", "block": "A",
                "category": "Business Centre", "rent": 900, "status": "rented"
            }))
            .await
            .assert_status(StatusCode::CREATED);

        app.post("/api/v1/events")
            .json(&json!({ "title": "Launch", "description": "Opening", "status": "published" }))
            .await
            .assert_status(StatusCode::CREATED);

        app.post("/api/v1/gallery")
            .json(&json!({ "title": "atrium", "image_url": "https://cdn.example.com/a.jpg", "is_visible": false }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = app.get("/api/v1/admin/stats").await;
        response.assert_status_ok();
        let stats: serde_json::Value = response.json();

        assert_eq!(stats["rooms"]["total"], 1);
        assert_eq!(stats["rooms"]["rented"], 1);
        assert_eq!(stats["rooms"]["businessCentre"], 1);
        assert_eq!(stats["events"]["total"], 1);
        assert_eq!(stats["events"]["published"], 1);
        assert_eq!(stats["gallery"]["total"], 1);
        assert_eq!(stats["gallery"]["hidden"], 1);
    }
}
