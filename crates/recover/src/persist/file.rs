//! [`FilePersister`]: atomic replace-by-rename file writer.

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::info;

use super::{PersistError, Persister};

/// Writes the plaintext to a fixed path.
///
/// Contents are staged in a temporary file in the destination directory,
/// flushed to disk, then renamed over the destination, and the directory entry
/// is flushed as well. Readers see either the
/// previous file or the complete new one. If any step fails the staging file
/// is removed when it drops. On Unix the staging file, and therefore the
/// result, is created with mode `0600`.
#[derive(Debug, Clone)]
pub struct FilePersister {
    path: PathBuf,
}

impl FilePersister {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl Persister for FilePersister {
    fn persist(&self, contents: &[u8]) -> Result<(), PersistError> {
        let write_err = |source| PersistError::Write {
            path: self.path.clone(),
            source,
        };

        let mut staged = NamedTempFile::new_in(self.staging_dir()).map_err(write_err)?;
        staged.write_all(contents).map_err(write_err)?;
        staged.as_file().sync_all().map_err(write_err)?;

        staged
            .persist(&self.path)
            .map_err(|e| PersistError::Replace {
                path: self.path.clone(),
                source: e.error,
            })?;
        sync_dir(self.staging_dir()).map_err(|source| PersistError::Replace {
            path: self.path.clone(),
            source,
        })?;

        info!(path = %self.path.display(), bytes = contents.len(), "plaintext persisted");
        Ok(())
    }
}

/// Flush a directory so a completed rename inside it survives a crash.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    std::fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
