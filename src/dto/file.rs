use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::services::dto::{FileOutput, StoredUpload, UpdateFile, UploadFile};

/// Multipart body of `POST /api/v1/files/`. Documentation only; the handler
/// reads the parts as a stream.
#[derive(Debug, ToSchema)]
pub struct UploadFileForm {
    #[schema(format = Binary)]
    pub file: String,
    pub description: Option<String>,
}

/// Upload after the multipart parts have been read.
#[derive(Debug, Clone, Validate)]
pub struct UploadFileRequest {
    #[validate(length(max = 1024))]
    pub description: String,
    pub file: StoredUpload,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFileRequest {
    #[validate(length(max = 1024))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    pub id: i64,
    pub name: String,
    pub directory: String,
    pub description: String,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn to_upload_file(request: UploadFileRequest) -> UploadFile {
    UploadFile {
        upload: request.file,
        description: request.description,
    }
}

pub fn to_update_file(request: UpdateFileRequest) -> UpdateFile {
    UpdateFile {
        description: request.description,
    }
}

pub fn to_file_response(output: FileOutput) -> FileResponse {
    FileResponse {
        id: output.id,
        name: output.name,
        directory: output.directory,
        description: output.description,
        mime_type: output.mime_type,
        created_at: output.created_at,
        updated_at: output.updated_at,
    }
}
