use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection, Multipart, Path, State},
    Json,
};
use futures::TryStreamExt;
use tracing::warn;
use validator::Validate;

use crate::{
    dto::{
        file::{
            to_file_response, to_update_file, to_upload_file, FileResponse, UpdateFileRequest,
            UploadFileForm, UploadFileRequest,
        },
        filter::{PaginationInputWithFilter, PagedList},
    },
    error::{AppError, AppResult},
    handlers::crud::{self, ApiResponse},
    services::{dto::StoredUpload, file::FileService},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/v1/files/",
    request_body(content = UploadFileForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "File uploaded", body = FileResponse),
        (status = 400, description = "Missing or invalid file"),
        (status = 500, description = "Internal server error")
    ),
    tag = "file"
)]
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResponse<FileResponse> {
    let service = state.file_service.as_ref();

    let mut stored = None;
    let request = match read_upload_form(service, &mut multipart, &mut stored).await {
        Ok(request) => request,
        Err(err) => {
            if let Some(upload) = &stored {
                service.discard_upload(upload).await;
            }
            return Err(err);
        }
    };

    crud::create(
        request,
        to_upload_file,
        |input| service.create_from_upload(input),
        to_file_response,
    )
    .await
}

/// Reads the `file` and `description` parts. The file is streamed to disk as
/// soon as its part arrives and recorded in `stored` so the caller can remove
/// it if the rest of the form turns out to be invalid.
async fn read_upload_form(
    service: &FileService,
    multipart: &mut Multipart,
    stored: &mut Option<StoredUpload>,
) -> AppResult<UploadFileRequest> {
    let mut description = String::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                if stored.is_some() {
                    return Err(AppError::validation("only one file may be uploaded"));
                }
                let original_name = field.file_name().unwrap_or_default().to_string();
                if original_name.is_empty() {
                    return Err(AppError::validation("file part must carry a file name"));
                }
                let mime_type = field.content_type().map(str::to_string);
                let upload = service
                    .save_upload(&original_name, mime_type, field.map_err(multipart_error))
                    .await?;
                *stored = Some(upload);
            }
            "description" => {
                description = field.text().await.map_err(multipart_error)?;
            }
            other => warn!(field = other, "ignoring unknown multipart field"),
        }
    }

    let file = stored
        .clone()
        .ok_or_else(|| AppError::validation("file is required"))?;
    let request = UploadFileRequest { description, file };
    request.validate()?;
    Ok(request)
}

fn multipart_error(err: MultipartError) -> AppError {
    AppError::validation(err.body_text())
}

#[utoipa::path(
    put,
    path = "/api/v1/files/{id}",
    params(("id" = i64, Path, description = "File id")),
    request_body = UpdateFileRequest,
    responses(
        (status = 200, description = "File updated", body = FileResponse),
        (status = 400, description = "Invalid body"),
        (status = 404, description = "Invalid id or file not found")
    ),
    tag = "file"
)]
pub async fn update_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateFileRequest>, JsonRejection>,
) -> ApiResponse<FileResponse> {
    crud::update(
        &id,
        payload,
        to_update_file,
        |id, input| state.file_service.update(id, input),
        to_file_response,
    )
    .await
}

#[utoipa::path(
    delete,
    path = "/api/v1/files/{id}",
    params(("id" = i64, Path, description = "File id")),
    responses(
        (status = 200, description = "File removed from disk and database"),
        (status = 404, description = "Invalid id or file not found"),
        (status = 500, description = "Disk or database failure")
    ),
    tag = "file"
)]
pub async fn delete_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResponse<()> {
    crud::delete(&id, |id| state.file_service.delete(id)).await
}

#[utoipa::path(
    get,
    path = "/api/v1/files/{id}",
    params(("id" = i64, Path, description = "File id")),
    responses(
        (status = 200, description = "File found", body = FileResponse),
        (status = 404, description = "Invalid id or file not found")
    ),
    tag = "file"
)]
pub async fn get_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResponse<FileResponse> {
    crud::get_by_id(&id, |id| state.file_service.get_by_id(id), to_file_response).await
}

#[utoipa::path(
    post,
    path = "/api/v1/files/get-by-filter",
    request_body = PaginationInputWithFilter,
    responses(
        (status = 200, description = "One page of files"),
        (status = 400, description = "Invalid paging or filter")
    ),
    tag = "file"
)]
pub async fn get_files_by_filter(
    State(state): State<AppState>,
    payload: Result<Json<PaginationInputWithFilter>, JsonRejection>,
) -> ApiResponse<PagedList<FileResponse>> {
    crud::get_by_filter(
        payload,
        |req| state.file_service.get_by_filter(req),
        to_file_response,
    )
    .await
}
