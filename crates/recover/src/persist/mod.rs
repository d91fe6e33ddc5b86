//! Durable storage of the recovered plaintext.
//!
//! Only called after every pipeline stage has succeeded, so a failed run never
//! creates or modifies the destination.

pub mod file;

pub use file::FilePersister;

use std::{io, path::PathBuf};

use common::RecoveryError;
use thiserror::Error;

/// Errors produced while persisting the plaintext.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Creating or writing the staging file failed.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Moving the staging file over the destination failed.
    #[error("failed to replace {path}: {source}")]
    Replace {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl From<PersistError> for RecoveryError {
    fn from(e: PersistError) -> Self {
        RecoveryError::Persist(e.to_string())
    }
}

/// Capability: write bytes durably, all or nothing.
#[cfg_attr(test, mockall::automock)]
pub trait Persister: Send + Sync {
    fn persist(&self, contents: &[u8]) -> Result<(), PersistError>;
}
