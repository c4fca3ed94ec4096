//! Project content storage.
//!
//! Projects are plain directories under the data root; files are stored
//! under their client-supplied names. The filesystem is the only record:
//! nothing is cached or indexed in memory.

use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::path::{PathResolver, Segment, UPLOAD_TEMP_PREFIX};

/// Storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The project directory or file does not exist.
    #[error("{} not found", .0.display())]
    NotFound(PathBuf),

    /// Any other filesystem failure.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// Path the operation was acting on.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            StorageError::NotFound(path.to_path_buf())
        } else {
            StorageError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Path the failed operation was acting on.
    pub fn path(&self) -> &Path {
        match self {
            StorageError::NotFound(path) => path,
            StorageError::Io { path, .. } => path,
        }
    }
}

/// A stored file as seen in a project listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    /// File name within the project.
    pub name: String,
    /// Size in bytes.
    pub bytes: u64,
}

/// File storage scoped to project directories.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    resolver: PathResolver,
}

impl ProjectStore {
    /// Create a new store over the given resolver.
    pub fn new(resolver: PathResolver) -> Self {
        Self { resolver }
    }

    /// Path resolver backing this store.
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Create the project directory if it does not exist yet.
    ///
    /// Idempotent; returns the directory path.
    pub async fn ensure_project_dir(&self, project: &Segment) -> Result<PathBuf, StorageError> {
        let dir = self.resolver.project_dir(project);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StorageError::from_io(&dir, e))?;
        Ok(dir)
    }

    /// Store `content` as `file` inside `project`, replacing any existing file.
    ///
    /// The content is written to a temporary file in the project directory
    /// and renamed over the destination, so readers never observe a partial
    /// file. Concurrent uploads of the same name are last-writer-wins.
    pub async fn save(
        &self,
        project: &Segment,
        file: &Segment,
        content: &[u8],
    ) -> Result<PathBuf, StorageError> {
        let dir = self.ensure_project_dir(project).await?;
        let dest = self.resolver.content_path(project, file);
        let temp_name = format!("{UPLOAD_TEMP_PREFIX}{}.tmp", Uuid::new_v4());
        let temp = TempUpload::new(dir.join(temp_name));

        write_file(temp.path(), content)
            .await
            .map_err(|e| StorageError::from_io(temp.path(), e))?;
        temp.persist(&dest).await?;

        Ok(dest)
    }

    /// Read a stored file in full.
    pub async fn load(&self, project: &Segment, file: &Segment) -> Result<Vec<u8>, StorageError> {
        let path = self.resolver.content_path(project, file);
        fs::read(&path)
            .await
            .map_err(|e| StorageError::from_io(&path, e))
    }

    /// List the direct entries of a project directory.
    ///
    /// Best-effort: entries whose metadata cannot be read are skipped and
    /// logged rather than failing the listing. In-flight uploads are hidden.
    /// Entries are sorted by name.
    pub async fn list(&self, project: &Segment) -> Result<Vec<FileEntry>, StorageError> {
        let dir = self.resolver.project_dir(project);
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| StorageError::from_io(&dir, e))?;

        let mut files = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => return Err(StorageError::from_io(&dir, e)),
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(UPLOAD_TEMP_PREFIX) {
                continue;
            }

            if let Some(file) = entry_for(&entry.path(), name, entry.metadata().await) {
                files.push(file);
            }
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }
}

async fn write_file(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(content).await?;
    file.sync_all().await
}

/// Listing entry for `name`, or `None` when its metadata is unreadable.
fn entry_for(path: &Path, name: String, metadata: io::Result<Metadata>) -> Option<FileEntry> {
    match metadata {
        Ok(metadata) => Some(FileEntry {
            name,
            bytes: metadata.len(),
        }),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to get file info (size), skipping entry"
            );
            None
        }
    }
}

/// Temporary upload file, removed on drop unless persisted.
///
/// Dropping covers both write failures and a handler future cancelled
/// mid-write.
struct TempUpload {
    path: PathBuf,
    armed: bool,
}

impl TempUpload {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// Rename the temporary file over `dest`.
    async fn persist(mut self, dest: &Path) -> Result<(), StorageError> {
        fs::rename(&self.path, dest)
            .await
            .map_err(|e| StorageError::from_io(dest, e))?;
        self.armed = false;
        Ok(())
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove temporary upload"
                );
            }
        }
    }
}
