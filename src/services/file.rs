use std::sync::Arc;

use axum::body::Bytes;
use futures::Stream;
use tracing::{error, info, warn};

use crate::{
    dto::filter::{PaginationInputWithFilter, PagedList},
    error::AppResult,
    models::file::File,
    repository::FileRepository,
    services::{
        base::BaseService,
        dto::{CreateFile, FileOutput, StoredUpload, UpdateFile, UploadFile},
        storage::FileStorage,
    },
    utils::random_file_name,
};

pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// File usecase: generic CRUD over [`File`] records plus the disk side of
/// uploads and deletes.
#[derive(Clone)]
pub struct FileService {
    base: BaseService<File, CreateFile, UpdateFile, FileOutput>,
    storage: FileStorage,
}

impl FileService {
    pub fn new(repository: Arc<FileRepository>, storage: FileStorage) -> Self {
        Self {
            base: BaseService::new(repository),
            storage,
        }
    }

    pub fn storage(&self) -> &FileStorage {
        &self.storage
    }

    pub async fn create(&self, input: CreateFile) -> AppResult<FileOutput> {
        self.base.create(input).await
    }

    pub async fn update(&self, id: i64, input: UpdateFile) -> AppResult<FileOutput> {
        self.base.update(id, input).await
    }

    /// Removes the file from disk, then its record.
    ///
    /// If the disk removal fails the record is kept and the error returned.
    /// If the record delete fails afterwards the file is already gone; that
    /// path is logged so it can be reconciled.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let file = self.base.repository().get_by_id(id).await?;

        if let Err(err) = self.storage.remove(&file.directory, &file.name).await {
            error!(id, path = %file.path(), error = %err, "could not remove file from disk, keeping record");
            return Err(err);
        }

        if let Err(err) = self.base.delete(id).await {
            error!(id, path = %file.path(), error = %err, "file removed from disk but its record was not deleted");
            return Err(err);
        }

        info!(id, path = %file.path(), "file deleted");
        Ok(())
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<FileOutput> {
        self.base.get_by_id(id).await
    }

    pub async fn get_by_filter(
        &self,
        req: PaginationInputWithFilter,
    ) -> AppResult<PagedList<FileOutput>> {
        self.base.get_by_filter(req).await
    }

    /// Streams an uploaded part to disk under a fresh random name.
    pub async fn save_upload<S>(
        &self,
        original_name: &str,
        mime_type: Option<String>,
        stream: S,
    ) -> AppResult<StoredUpload>
    where
        S: Stream<Item = AppResult<Bytes>> + Send,
    {
        let name = random_file_name(original_name);
        let size = self.storage.save(&name, stream).await?;

        Ok(StoredUpload {
            name,
            directory: self.storage.directory().to_string_lossy().into_owned(),
            mime_type: mime_type
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
            size,
        })
    }

    /// Removes an upload whose record will never be created.
    pub async fn discard_upload(&self, upload: &StoredUpload) {
        if let Err(err) = self.storage.remove(&upload.directory, &upload.name).await {
            warn!(name = %upload.name, error = %err, "could not discard upload");
        }
    }

    /// Persists the record for a stored upload. If that fails the stored file
    /// is removed again.
    pub async fn create_from_upload(&self, input: UploadFile) -> AppResult<FileOutput> {
        let UploadFile {
            upload,
            description,
        } = input;

        let create = CreateFile {
            name: upload.name.clone(),
            directory: upload.directory.clone(),
            description,
            mime_type: upload.mime_type.clone(),
        };

        match self.create(create).await {
            Ok(output) => {
                info!(id = output.id, name = %output.name, bytes = upload.size, "file uploaded");
                Ok(output)
            }
            Err(err) => {
                error!(name = %upload.name, error = %err, "could not persist uploaded file");
                self.discard_upload(&upload).await;
                Err(err)
            }
        }
    }
}
