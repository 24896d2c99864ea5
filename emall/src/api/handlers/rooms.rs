//! Room endpoints.
//!
//! Listing is public but only ever shows vacant rooms unless the caller is
//! an authenticated admin asking with `admin=true`. Writes require a
//! session and run inside a transaction so a room and its images land
//! together.

use crate::api::models::rooms::{RoomCreate, RoomResponse, RoomStatsResponse, RoomStatus, RoomUpdate, RoomsQuery};
use crate::api::models::users::CurrentUser;
use crate::auth::current_user::OptionalCurrentUser;
use crate::db::handlers::{Repository, Rooms, rooms::RoomFilter};
use crate::db::models::rooms::RoomUpdateDBRequest;
use crate::errors::{Error, Result};
use crate::types::RoomId;
use crate::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

/// Resolve the query into a repository filter, enforcing the admin switch.
///
/// `admin=true` without a valid session is a 401 rather than silently
/// downgrading, so the back office notices an expired session.
fn resolve_filter(query: &RoomsQuery, user: &Option<CurrentUser>) -> Result<RoomFilter> {
    let is_admin = query.admin.unwrap_or(false);
    if is_admin && user.is_none() {
        return Err(Error::Unauthenticated { message: None });
    }

    let status = if is_admin { query.status } else { Some(RoomStatus::Vacant) };
    Ok(RoomFilter { status })
}

#[utoipa::path(
    get,
    path = "/rooms",
    tag = "rooms",
    summary = "List rooms",
    responses(
        (status = 200, description = "Rooms ordered by block and room number", body = Vec<RoomResponse>),
        (status = 401, description = "admin=true requires a session"),
        (status = 500, description = "Internal server error")
    ),
    params(RoomsQuery)
)]
#[tracing::instrument(skip_all)]
pub async fn list_rooms(
    State(state): State<AppState>,
    Query(query): Query<RoomsQuery>,
    OptionalCurrentUser(user): OptionalCurrentUser,
) -> Result<Json<Vec<RoomResponse>>> {
    let filter = resolve_filter(&query, &user)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Rooms::new(&mut conn);

    let rooms = repo.list(&filter).await?;
    Ok(Json(rooms.into_iter().map(RoomResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/rooms/stats",
    tag = "rooms",
    summary = "Room occupancy statistics",
    responses(
        (status = 200, description = "Room counts", body = RoomStatsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn room_stats(State(state): State<AppState>, _current_user: CurrentUser) -> Result<Json<RoomStatsResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Rooms::new(&mut conn);

    let stats = repo.stats().await?;
    Ok(Json(RoomStatsResponse::from(stats)))
}

#[utoipa::path(
    get,
    path = "/rooms/{room_id}",
    tag = "rooms",
    summary = "Get room",
    responses(
        (status = 200, description = "Room details", body = RoomResponse),
        (status = 404, description = "Room not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("room_id" = uuid::Uuid, Path, description = "Room ID")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_room(State(state): State<AppState>, Path(room_id): Path<RoomId>) -> Result<Json<RoomResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Rooms::new(&mut conn);

    match repo.get_by_id(room_id).await? {
        Some(room) => Ok(Json(RoomResponse::from(room))),
        None => Err(Error::NotFound {
            resource: "Room".to_string(),
            id: room_id.to_string(),
        }),
    }
}

#[utoipa::path(
    post,
    path = "/rooms",
    tag = "rooms",
    summary = "Create room",
    request_body = RoomCreate,
    responses(
        (status = 201, description = "Room created", body = RoomResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_room(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(create): Json<RoomCreate>,
) -> Result<(StatusCode, Json<RoomResponse>)> {
    let request = create.into_db_request()?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let room = {
        let mut repo = Rooms::new(&mut tx);
        repo.create(&request).await?
    };
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok((StatusCode::CREATED, Json(RoomResponse::from(room))))
}

#[utoipa::path(
    put,
    path = "/rooms/{room_id}",
    tag = "rooms",
    summary = "Update room",
    request_body = RoomUpdate,
    responses(
        (status = 200, description = "Room updated", body = RoomResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Room not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("room_id" = uuid::Uuid, Path, description = "Room ID")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_room(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
    _current_user: CurrentUser,
    Json(update): Json<RoomUpdate>,
) -> Result<Json<RoomResponse>> {
    let request = RoomUpdateDBRequest::from(update);

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let room = {
        let mut repo = Rooms::new(&mut tx);
        repo.update(room_id, &request).await?
    };
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(RoomResponse::from(room)))
}

#[utoipa::path(
    delete,
    path = "/rooms/{room_id}",
    tag = "rooms",
    summary = "Delete room",
    responses(
        (status = 204, description = "Room deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Room not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("room_id" = uuid::Uuid, Path, description = "Room ID")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_room(State(state): State<AppState>, Path(room_id): Path<RoomId>, _current_user: CurrentUser) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Rooms::new(&mut conn);

    if repo.delete(room_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "Room".to_string(),
            id: room_id.to_string(),
        })
    }
}
