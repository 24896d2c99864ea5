//! Event endpoints.
//!
//! The public site reads published events only, by list or by slug. The
//! back office sees drafts too and manages the lifecycle through the
//! authenticated CRUD routes.

use crate::api::models::events::{EventCreate, EventResponse, EventStatus, EventUpdate, EventsQuery};
use crate::api::models::users::CurrentUser;
use crate::auth::current_user::OptionalCurrentUser;
use crate::db::handlers::{Events, Repository, events::EventFilter};
use crate::db::models::events::EventUpdateDBRequest;
use crate::errors::{Error, Result};
use crate::types::EventId;
use crate::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

fn resolve_filter(query: &EventsQuery, user: &Option<CurrentUser>) -> Result<EventFilter> {
    let is_admin = query.admin.unwrap_or(false);
    if is_admin && user.is_none() {
        return Err(Error::Unauthenticated { message: None });
    }

    let status = if is_admin { query.status } else { Some(EventStatus::Published) };
    Ok(EventFilter { status })
}

#[utoipa::path(
    get,
    path = "/events",
    tag = "events",
    summary = "List events",
    responses(
        (status = 200, description = "Events in display order", body = Vec<EventResponse>),
        (status = 401, description = "admin=true requires a session"),
        (status = 500, description = "Internal server error")
    ),
    params(EventsQuery)
)]
#[tracing::instrument(skip_all)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
    OptionalCurrentUser(user): OptionalCurrentUser,
) -> Result<Json<Vec<EventResponse>>> {
    let filter = resolve_filter(&query, &user)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Events::new(&mut conn);

    let events = repo.list(&filter).await?;
    Ok(Json(events.into_iter().map(EventResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/events/slug/{slug}",
    tag = "events",
    summary = "Get event by slug",
    responses(
        (status = 200, description = "Event details", body = EventResponse),
        (status = 404, description = "Event not found or not published"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("slug" = String, Path, description = "Event slug")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_event_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    OptionalCurrentUser(user): OptionalCurrentUser,
) -> Result<Json<EventResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Events::new(&mut conn);

    let event = repo.get_by_slug(&slug).await?.ok_or_else(|| Error::NotFound {
        resource: "Event".to_string(),
        id: slug.clone(),
    })?;

    // Drafts are invisible to the public site
    if event.status != EventStatus::Published && user.is_none() {
        return Err(Error::NotFound {
            resource: "Event".to_string(),
            id: slug,
        });
    }

    Ok(Json(EventResponse::from(event)))
}

#[utoipa::path(
    get,
    path = "/events/{event_id}",
    tag = "events",
    summary = "Get event",
    responses(
        (status = 200, description = "Event details", body = EventResponse),
        (status = 404, description = "Event not found or not published"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("event_id" = uuid::Uuid, Path, description = "Event ID")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
    OptionalCurrentUser(user): OptionalCurrentUser,
) -> Result<Json<EventResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Events::new(&mut conn);

    let event = repo.get_by_id(event_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Event".to_string(),
        id: event_id.to_string(),
    })?;

    // Drafts are invisible to the public site
    if event.status != EventStatus::Published && user.is_none() {
        return Err(Error::NotFound {
            resource: "Event".to_string(),
            id: event_id.to_string(),
        });
    }

    Ok(Json(EventResponse::from(event)))
}

#[utoipa::path(
    post,
    path = "/events",
    tag = "events",
    summary = "Create event",
    request_body = EventCreate,
    responses(
        (status = 201, description = "Event created with a generated slug", body = EventResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_event(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(create): Json<EventCreate>,
) -> Result<(StatusCode, Json<EventResponse>)> {
    let request = create.into_db_request()?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let event = {
        let mut repo = Events::new(&mut tx);
        repo.create(&request).await?
    };
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok((StatusCode::CREATED, Json(EventResponse::from(event))))
}

#[utoipa::path(
    put,
    path = "/events/{event_id}",
    tag = "events",
    summary = "Update event",
    request_body = EventUpdate,
    responses(
        (status = 200, description = "Event updated", body = EventResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("event_id" = uuid::Uuid, Path, description = "Event ID")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_event(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
    _current_user: CurrentUser,
    Json(update): Json<EventUpdate>,
) -> Result<Json<EventResponse>> {
    let request = EventUpdateDBRequest::from(update);

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let event = {
        let mut repo = Events::new(&mut tx);
        repo.update(event_id, &request).await?
    };
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(EventResponse::from(event)))
}

#[utoipa::path(
    delete,
    path = "/events/{event_id}",
    tag = "events",
    summary = "Delete event",
    responses(
        (status = 204, description = "Event deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("event_id" = uuid::Uuid, Path, description = "Event ID")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_event(State(state): State<AppState>, Path(event_id): Path<EventId>, _current_user: CurrentUser) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Events::new(&mut conn);

    if repo.delete(event_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "Event".to_string(),
            id: event_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{api::models::events::EventResponse, test_utils::*};
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::PgPool;

    fn event_payload(title: &str, status: &str) -> serde_json::Value {
        json!({
            "title": title,
            "description": "An event at the mall",
            "status": status,
            "images": [{ "image_url": "https://cdn.example.com/poster.jpg", "cloudinary_id": "emall/events/poster" }]
        })
    }

    #[sqlx::test]
    #[test_log::test]
    async fn public_listing_shows_published_events_only(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        create_test_admin(&pool, "admin@example.com", "password123").await;
        login(&app, "admin@example.com", "password123").await;

        app.post("/api/v1/events")
            .json(&event_payload("Summer Sale", "published"))
            .await
            .assert_status(StatusCode::CREATED);
        app.post("/api/v1/events")
            .json(&event_payload("Secret Draft", "draft"))
            .await
            .assert_status(StatusCode::CREATED);

        let public = create_test_app(pool.clone()).await;
        let response = public.get("/api/v1/events").await;
        response.assert_status_ok();
        let events: Vec<EventResponse> = response.json();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Summer Sale");
        assert_eq!(events[0].images[0].cloudinary_id.as_deref(), Some("emall/events/poster"));

        // Admins see everything
        let response = app.get("/api/v1/events?admin=true").await;
        response.assert_status_ok();
        let events: Vec<EventResponse> = response.json();
        assert_eq!(events.len(), 2);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn slug_lookup_hides_drafts_from_the_public(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        create_test_admin(&pool, "admin@example.com", "password123").await;
        login(&app, "admin@example.com", "password123").await;

        let response = app.post("/api/v1/events").json(&event_payload("Winter Fair!", "draft")).await;
        response.assert_status(StatusCode::CREATED);
        let event: EventResponse = response.json();
        assert_eq!(event.slug, "winter-fair");

        let public = create_test_app(pool.clone()).await;
        public.get("/api/v1/events/slug/winter-fair").await.assert_status(StatusCode::NOT_FOUND);

        // Admin session can preview the draft by slug
        let response = app.get("/api/v1/events/slug/winter-fair").await;
        response.assert_status_ok();

        // Publish and the public route works
        app.put(&format!("/api/v1/events/{}", event.id))
            .json(&json!({ "status": "published" }))
            .await
            .assert_status_ok();
        public.get("/api/v1/events/slug/winter-fair").await.assert_status_ok();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn id_lookup_is_public_for_published_events(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        create_test_admin(&pool, "admin@example.com", "password123").await;
        login(&app, "admin@example.com", "password123").await;

        let response = app.post("/api/v1/events").json(&event_payload("Open Day", "published")).await;
        let published: EventResponse = response.json();
        let response = app.post("/api/v1/events").json(&event_payload("Backstage", "draft")).await;
        let draft: EventResponse = response.json();

        let public = create_test_app(pool.clone()).await;
        let response = public.get(&format!("/api/v1/events/{}", published.id)).await;
        response.assert_status_ok();
        let fetched: EventResponse = response.json();
        assert_eq!(fetched.title, "Open Day");

        // Drafts look like missing events to anonymous callers
        public.get(&format!("/api/v1/events/{}", draft.id)).await.assert_status(StatusCode::NOT_FOUND);

        // An admin session can still fetch the draft by id
        app.get(&format!("/api/v1/events/{}", draft.id)).await.assert_status_ok();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn renaming_regenerates_the_slug(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        create_test_admin(&pool, "admin@example.com", "password123").await;
        login(&app, "admin@example.com", "password123").await;

        let response = app.post("/api/v1/events").json(&event_payload("Spring Market", "published")).await;
        let event: EventResponse = response.json();
        assert_eq!(event.slug, "spring-market");

        let response = app
            .put(&format!("/api/v1/events/{}", event.id))
            .json(&json!({ "title": "Autumn Market" }))
            .await;
        response.assert_status_ok();
        let updated: EventResponse = response.json();
        assert_eq!(updated.slug, "autumn-market");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn create_requires_title_and_description(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        create_test_admin(&pool, "admin@example.com", "password123").await;
        login(&app, "admin@example.com", "password123").await;

        let response = app.post("/api/v1/events").json(&json!({ "description": "no title" })).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().contains("Missing required field: title"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn writes_require_a_session(pool: PgPool) {
        let app = create_test_app(pool).await;
        app.post("/api/v1/events")
            .json(&event_payload("Anything", "draft"))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
