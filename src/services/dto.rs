//! Usecase-facing input and output shapes.

use chrono::{DateTime, Utc};

use crate::models::file::{File, FilePatch, NewFile};

#[derive(Debug, Clone, PartialEq)]
pub struct CreateFile {
    pub name: String,
    pub directory: String,
    pub description: String,
    pub mime_type: String,
}

impl From<CreateFile> for NewFile {
    fn from(input: CreateFile) -> Self {
        NewFile {
            name: input.name,
            directory: input.directory,
            description: input.description,
            mime_type: input.mime_type,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateFile {
    pub description: Option<String>,
}

impl From<UpdateFile> for FilePatch {
    fn from(input: UpdateFile) -> Self {
        FilePatch {
            description: input.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileOutput {
    pub id: i64,
    pub name: String,
    pub directory: String,
    pub description: String,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<File> for FileOutput {
    fn from(file: File) -> Self {
        FileOutput {
            id: file.id,
            name: file.name,
            directory: file.directory,
            description: file.description,
            mime_type: file.mime_type,
            created_at: file.created_at,
            updated_at: file.updated_at,
        }
    }
}

/// A file already written to disk, waiting for its record.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredUpload {
    pub name: String,
    pub directory: String,
    pub mime_type: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub upload: StoredUpload,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SendOtp {
    /// Blank means the configured default.
    pub country_code: String,
    pub mobile_number: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginByMobile {
    pub country_code: String,
    pub mobile_number: String,
    pub otp: String,
}
