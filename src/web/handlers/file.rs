//! File handlers for the file API.
//!
//! Each handler is a straight pipeline that stops at the first failure:
//! authenticate, validate names, authorize, then touch the filesystem.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::auth::{Identity, PermissionError};
use crate::storage::{FileEntry, Segment};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// Multipart field carrying the uploaded file.
pub const SOURCE_FIELD: &str = "source";

/// Validate the project route segment.
fn parse_project(raw: &str) -> Result<Segment, ApiError> {
    Segment::parse(raw).map_err(|e| {
        tracing::error!(project = raw, error = %e, "Rejected project name");
        ApiError::from(e)
    })
}

/// Validate a client-supplied file name.
fn parse_file_name(raw: &str) -> Result<Segment, ApiError> {
    Segment::file_name(raw).map_err(|e| {
        tracing::error!(file = raw, error = %e, "Rejected file name");
        ApiError::from(e)
    })
}

/// Map a failure while reading the upload body.
///
/// Exceeding the body limit is 413; anything else means no usable source file.
fn upload_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::error!(error = %e, "Upload exceeds body limit");
        ApiError::payload_too_large("file too large")
    } else {
        tracing::error!(error = %e, "Failed to read multipart field");
        ApiError::bad_request("failed to get source file")
    }
}

/// Check the caller's allow-list for `project`.
async fn authorize(state: &AppState, user: &Identity, project: &Segment) -> Result<(), ApiError> {
    state.permissions.check(user, project).await.map_err(|e| {
        match &e {
            PermissionError::Unreadable { path, source } => tracing::error!(
                path = %path.display(),
                user = %user,
                error = %source,
                "Failed to read user permissions"
            ),
            PermissionError::NotPermitted { .. } => tracing::error!(
                user = %user,
                project = %project,
                "Forbidden"
            ),
            PermissionError::InvalidIdentity(reason) => tracing::error!(
                user = %user,
                error = %reason,
                "Forbidden: identity cannot name a permission file"
            ),
        }
        ApiError::from(e)
    })
}

/// POST /:project - Upload a file.
///
/// Request body: multipart/form-data with the file in the `source` field.
/// The file is stored under its own file name, replacing any existing file.
pub async fn create_file(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(project): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<StatusCode, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::error!(error = %e, "Failed to read file from request");
        ApiError::bad_request("failed to get source file")
    })?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        if field.name() != Some(SOURCE_FIELD) {
            continue;
        }

        let filename = field.file_name().map(str::to_string).ok_or_else(|| {
            tracing::error!("Source field has no file name");
            ApiError::bad_request("failed to get source file")
        })?;
        let content = field.bytes().await.map_err(upload_error)?;

        upload = Some((filename, content));
        break;
    }

    let (filename, content) = upload.ok_or_else(|| {
        tracing::error!("No source file in request");
        ApiError::bad_request("failed to get source file")
    })?;

    let project = parse_project(&project)?;
    let file = parse_file_name(&filename)?;

    authorize(&state, &user, &project).await?;

    let path = state
        .store
        .save(&project, &file, &content)
        .await
        .map_err(|e| {
            tracing::error!(path = %e.path().display(), error = %e, "Failed to write file");
            ApiError::internal("failed to write file")
        })?;

    tracing::info!(
        user = %user,
        project = %project,
        path = %path.display(),
        bytes = content.len(),
        "Stored file"
    );

    Ok(StatusCode::OK)
}

/// GET /:project - List files in a project.
///
/// Responds with a JSON array of `{"name", "bytes"}` objects.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(project): Path<String>,
) -> Result<Json<Vec<FileEntry>>, ApiError> {
    let project = parse_project(&project)?;

    authorize(&state, &user, &project).await?;

    let files = state.store.list(&project).await.map_err(|e| {
        tracing::error!(path = %e.path().display(), error = %e, "Failed to list projects");
        ApiError::storage(&e, "failed to list projects")
    })?;

    Ok(Json(files))
}

/// GET /:project/:fname - Download a file.
///
/// Responds with the raw file bytes.
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path((project, fname)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let project = parse_project(&project)?;
    let file = parse_file_name(&fname)?;

    authorize(&state, &user, &project).await?;

    let data = state.store.load(&project, &file).await.map_err(|e| {
        tracing::error!(path = %e.path().display(), error = %e, "Failed to read file");
        ApiError::storage(&e, "failed to retrieve file")
    })?;

    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], data).into_response())
}
