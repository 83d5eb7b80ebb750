use std::path::{Path, PathBuf};

use axum::body::Bytes;
use futures::{Stream, StreamExt};
use tokio::{fs, io::AsyncWriteExt};
use tracing::{info, warn};

use crate::error::AppResult;

/// Local disk storage for uploaded files.
#[derive(Debug, Clone)]
pub struct FileStorage {
    directory: PathBuf,
}

impl FileStorage {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Writes `stream` to `<directory>/<file_name>` chunk by chunk and returns
    /// the number of bytes written.
    ///
    /// The directory is created if needed. On any failure the partially
    /// written file is removed before the error is returned.
    pub async fn save<S>(&self, file_name: &str, stream: S) -> AppResult<u64>
    where
        S: Stream<Item = AppResult<Bytes>> + Send,
    {
        fs::create_dir_all(&self.directory).await?;
        let path = self.directory.join(file_name);
        let mut file = fs::File::create(&path).await?;

        let result = write_stream(&mut file, stream).await;
        drop(file);

        match result {
            Ok(written) => {
                info!(path = %path.display(), bytes = written, "stored upload");
                Ok(written)
            }
            Err(err) => {
                if let Err(remove_err) = fs::remove_file(&path).await {
                    warn!(path = %path.display(), error = %remove_err, "could not remove partial upload");
                }
                Err(err)
            }
        }
    }

    /// Removes `<directory>/<name>`. A missing file is an error.
    pub async fn remove(&self, directory: &str, name: &str) -> AppResult<()> {
        let path = Path::new(directory).join(name);
        fs::remove_file(&path).await?;
        info!(path = %path.display(), "removed stored file");
        Ok(())
    }
}

async fn write_stream<S>(file: &mut fs::File, stream: S) -> AppResult<u64>
where
    S: Stream<Item = AppResult<Bytes>> + Send,
{
    futures::pin_mut!(stream);
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}
