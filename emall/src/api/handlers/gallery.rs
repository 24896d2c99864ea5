//! Gallery endpoints.
//!
//! The public site lists visible items, optionally filtered by category.
//! Admins list everything and flip visibility through the update route.

use crate::api::models::gallery::{GalleryItemCreate, GalleryItemResponse, GalleryItemUpdate, GalleryQuery};
use crate::api::models::users::CurrentUser;
use crate::auth::current_user::OptionalCurrentUser;
use crate::db::handlers::{Gallery, Repository, gallery::GalleryFilter};
use crate::db::models::gallery::GalleryItemUpdateDBRequest;
use crate::errors::{Error, Result};
use crate::types::GalleryItemId;
use crate::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

fn resolve_filter(query: GalleryQuery, user: &Option<CurrentUser>) -> Result<GalleryFilter> {
    let is_admin = query.admin.unwrap_or(false);
    if is_admin && user.is_none() {
        return Err(Error::Unauthenticated { message: None });
    }

    // "All" is the frontend's sentinel for no category filter
    let category = query.category.filter(|c| !c.is_empty() && c != "All");

    Ok(GalleryFilter {
        category,
        only_visible: !is_admin,
    })
}

#[utoipa::path(
    get,
    path = "/gallery",
    tag = "gallery",
    summary = "List gallery items",
    responses(
        (status = 200, description = "Gallery items, newest first", body = Vec<GalleryItemResponse>),
        (status = 401, description = "admin=true requires a session"),
        (status = 500, description = "Internal server error")
    ),
    params(GalleryQuery)
)]
#[tracing::instrument(skip_all)]
pub async fn list_gallery(
    State(state): State<AppState>,
    Query(query): Query<GalleryQuery>,
    OptionalCurrentUser(user): OptionalCurrentUser,
) -> Result<Json<Vec<GalleryItemResponse>>> {
    let filter = resolve_filter(query, &user)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Gallery::new(&mut conn);

    let items = repo.list(&filter).await?;
    Ok(Json(items.into_iter().map(GalleryItemResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/gallery",
    tag = "gallery",
    summary = "Create gallery item",
    request_body = GalleryItemCreate,
    responses(
        (status = 201, description = "Gallery item created", body = GalleryItemResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_gallery_item(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(create): Json<GalleryItemCreate>,
) -> Result<(StatusCode, Json<GalleryItemResponse>)> {
    let request = create.into_db_request()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Gallery::new(&mut conn);

    let item = repo.create(&request).await?;
    Ok((StatusCode::CREATED, Json(GalleryItemResponse::from(item))))
}

#[utoipa::path(
    put,
    path = "/gallery/{item_id}",
    tag = "gallery",
    summary = "Update gallery item",
    request_body = GalleryItemUpdate,
    responses(
        (status = 200, description = "Gallery item updated", body = GalleryItemResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Gallery item not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("item_id" = uuid::Uuid, Path, description = "Gallery item ID")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_gallery_item(
    State(state): State<AppState>,
    Path(item_id): Path<GalleryItemId>,
    _current_user: CurrentUser,
    Json(update): Json<GalleryItemUpdate>,
) -> Result<Json<GalleryItemResponse>> {
    let request = GalleryItemUpdateDBRequest::from(update);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Gallery::new(&mut conn);

    let item = repo.update(item_id, &request).await?;
    Ok(Json(GalleryItemResponse::from(item)))
}

#[utoipa::path(
    delete,
    path = "/gallery/{item_id}",
    tag = "gallery",
    summary = "Delete gallery item",
    responses(
        (status = 204, description = "Gallery item deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Gallery item not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("item_id" = uuid::Uuid, Path, description = "Gallery item ID")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_gallery_item(
    State(state): State<AppState>,
    Path(item_id): Path<GalleryItemId>,
    _current_user: CurrentUser,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Gallery::new(&mut conn);

    if repo.delete(item_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "Gallery item".to_string(),
            id: item_id.to_string(),
        })
    }
}
