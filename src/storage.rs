use chrono::Utc;
use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};
use tempfile::TempDir;
use tracing::{debug, warn};

/// Batch-scoped blob storage for rendered slices.
///
/// One batch namespace per upload; the pipeline only creates namespaces and
/// writes blobs, while delivery, deletion and the age-based retention sweep
/// belong to whoever hosts the store.
pub trait SliceStore {
    /// Create the namespace for a batch, clearing any stale content left by
    /// a previous run under the same identifier.
    fn create_batch(&self, batch_id: &str) -> io::Result<()>;

    fn write_blob(&self, batch_id: &str, name: &str, bytes: &[u8]) -> io::Result<()>;

    fn read_blob(&self, batch_id: &str, name: &str) -> io::Result<Vec<u8>>;

    /// Blob names in a batch, sorted
    fn list_batch(&self, batch_id: &str) -> io::Result<Vec<String>>;

    fn remove_batch(&self, batch_id: &str) -> io::Result<()>;

    /// Remove every batch older than `max_age`, returning how many were
    /// swept. Individual failures are logged and skipped.
    fn sweep_older_than(&self, max_age: Duration) -> io::Result<usize>;
}

/// Derive a collision-free batch identifier from an upload's file stem
pub fn batch_id(stem: &str) -> String {
    format!("{}_{}_slices", stem, Utc::now().format("%Y%m%d%H%M%S"))
}

/// Filesystem-backed store: one directory per batch under a common root
pub struct FsStore {
    root: PathBuf,
    temp: Option<TempDir>,
}

impl FsStore {
    /// Open a store rooted at `root`, creating it if necessary
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(FsStore { root, temp: None })
    }

    /// Open a store in a fresh temporary directory that lives as long as
    /// the store itself
    pub fn open_temp() -> io::Result<Self> {
        let temp = tempfile::Builder::new().prefix("dicom_slicer_").tempdir()?;
        Ok(FsStore {
            root: temp.path().to_path_buf(),
            temp: Some(temp),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Release the store, deleting the temporary root when one was created
    pub fn close(self) -> io::Result<()> {
        match self.temp {
            Some(temp) => temp.close(),
            None => Ok(()),
        }
    }

    fn batch_dir(&self, batch_id: &str) -> io::Result<PathBuf> {
        Ok(self.root.join(sanitize(batch_id)?))
    }

    fn blob_path(&self, batch_id: &str, name: &str) -> io::Result<PathBuf> {
        Ok(self.batch_dir(batch_id)?.join(sanitize(name)?))
    }
}

// Batch and blob names are plain path components; anything that could
// escape the root is refused.
fn sanitize(name: &str) -> io::Result<&str> {
    let tainted = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\');
    if tainted {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid store name: {name:?}"),
        ));
    }
    Ok(name)
}

impl SliceStore for FsStore {
    fn create_batch(&self, batch_id: &str) -> io::Result<()> {
        let dir = self.batch_dir(batch_id)?;
        if dir.exists() {
            debug!(batch_id, "clearing stale batch");
            fs::remove_dir_all(&dir)?;
        }
        fs::create_dir_all(&dir)
    }

    fn write_blob(&self, batch_id: &str, name: &str, bytes: &[u8]) -> io::Result<()> {
        fs::write(self.blob_path(batch_id, name)?, bytes)
    }

    fn read_blob(&self, batch_id: &str, name: &str) -> io::Result<Vec<u8>> {
        fs::read(self.blob_path(batch_id, name)?)
    }

    fn list_batch(&self, batch_id: &str) -> io::Result<Vec<String>> {
        let mut names: Vec<String> = fs::read_dir(self.batch_dir(batch_id)?)?
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        names.sort();
        Ok(names)
    }

    fn remove_batch(&self, batch_id: &str) -> io::Result<()> {
        fs::remove_dir_all(self.batch_dir(batch_id)?)
    }

    fn sweep_older_than(&self, max_age: Duration) -> io::Result<usize> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.root)?.filter_map(Result::ok) {
            let path = entry.path();
            let age = entry
                .metadata()
                .and_then(|meta| meta.modified())
                .map(|modified| modified.elapsed().unwrap_or_default());
            let expired = match age {
                Ok(age) => age >= max_age,
                Err(error) => {
                    warn!(path = %path.display(), %error, "skipping unreadable entry in sweep");
                    continue;
                }
            };
            if !expired {
                continue;
            }
            let result = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            match result {
                Ok(()) => removed += 1,
                Err(error) => warn!(path = %path.display(), %error, "failed to sweep entry"),
            }
        }
        debug!(removed, "retention sweep finished");
        Ok(removed)
    }
}
