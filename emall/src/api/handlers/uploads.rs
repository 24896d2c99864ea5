//! Image upload relay.
//!
//! The admin frontend posts multipart form data here; the server validates
//! the file and relays it to the storage backend with a signed request, so
//! API credentials never reach the browser.

use crate::api::models::uploads::UploadResponse;
use crate::api::models::users::CurrentUser;
use crate::errors::{Error, Result};
use crate::AppState;
use axum::{Json, extract::Multipart, extract::State};
use bytes::Bytes;

struct UploadedFile {
    data: Bytes,
    filename: String,
    content_type: String,
}

async fn read_multipart(mut multipart: Multipart) -> Result<(Option<UploadedFile>, Option<String>)> {
    let mut file = None;
    let mut folder = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
        message: format!("Invalid multipart request: {e}"),
    })? {
        match field.name() {
            Some("image") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(|e| Error::BadRequest {
                    message: format!("Failed to read image data: {e}"),
                })?;
                file = Some(UploadedFile {
                    data,
                    filename,
                    content_type,
                });
            }
            Some("folder") => {
                folder = Some(field.text().await.map_err(|e| Error::BadRequest {
                    message: format!("Failed to read folder field: {e}"),
                })?);
            }
            _ => {}
        }
    }

    Ok((file, folder))
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "uploads",
    summary = "Upload an image",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image stored", body = UploadResponse),
        (status = 400, description = "Missing file, unsupported type, or file too large"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Storage backend failure")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn upload_image(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let (file, folder) = read_multipart(multipart).await?;

    let file = file.ok_or_else(|| Error::BadRequest {
        message: "Missing required field: image".to_string(),
    })?;

    let uploads = &state.config.uploads;
    if !uploads.allowed_types.iter().any(|t| t == &file.content_type) {
        return Err(Error::BadRequest {
            message: format!(
                "Unsupported file type '{}'. Allowed types: {}",
                file.content_type,
                uploads.allowed_types.join(", ")
            ),
        });
    }
    if file.data.len() as u64 > uploads.max_file_size {
        return Err(Error::BadRequest {
            message: format!("File exceeds the maximum size of {} bytes", uploads.max_file_size),
        });
    }

    let folder = folder.filter(|f| !f.trim().is_empty()).unwrap_or_else(|| state.config.storage.upload_folder.clone());

    let stored = state.storage.upload(file.data, &file.filename, &file.content_type, &folder).await?;

    Ok(Json(UploadResponse {
        image_url: stored.url,
        public_id: stored.public_id,
    }))
}

#[cfg(test)]
mod tests {
    use crate::{api::models::uploads::UploadResponse, test_utils::*};
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use sqlx::PgPool;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn image_form(bytes: &'static [u8], content_type: &str) -> MultipartForm {
        MultipartForm::new().add_part("image", Part::bytes(bytes).file_name("photo.jpg").mime_type(content_type))
    }

    async fn mock_storage_backend() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1_1/test-cloud/image/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "secure_url": "https://res.cloudinary.com/test-cloud/image/upload/v1/emall/rooms/x.jpg",
                "public_id": "emall/rooms/x"
            })))
            .mount(&server)
            .await;
        server
    }

    #[sqlx::test]
    #[test_log::test]
    async fn upload_relays_to_the_storage_backend(pool: PgPool) {
        let backend = mock_storage_backend().await;
        let app = create_test_app_with_storage_url(pool.clone(), &backend.uri()).await;
        create_test_admin(&pool, "admin@example.com", "password123").await;
        login(&app, "admin@example.com", "password123").await;

        let response = app.post("/api/v1/upload").multipart(image_form(b"jpegbytes", "image/jpeg")).await;
        response.assert_status_ok();
        let body: UploadResponse = response.json();
        assert!(body.image_url.starts_with("https://res.cloudinary.com/"));
        assert_eq!(body.public_id, "emall/rooms/x");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn upload_rejects_unsupported_content_types(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        create_test_admin(&pool, "admin@example.com", "password123").await;
        login(&app, "admin@example.com", "password123").await;

        let response = app.post("/api/v1/upload").multipart(image_form(b"%PDF-", "application/pdf")).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().contains("Unsupported file type"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn upload_requires_the_image_field(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        create_test_admin(&pool, "admin@example.com", "password123").await;
        login(&app, "admin@example.com", "password123").await;

        let form = MultipartForm::new().add_text("folder", "emall/events");
        let response = app.post("/api/v1/upload").multipart(form).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().contains("Missing required field: image"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn upload_requires_a_session(pool: PgPool) {
        let app = create_test_app(pool).await;
        let response = app.post("/api/v1/upload").multipart(image_form(b"jpegbytes", "image/jpeg")).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }
}
