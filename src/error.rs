//! Errors of the roster commands.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::storage::StorageError;

/// Errors which can occur while a roster command runs.
///
/// Every error terminates the command that raised it. Nothing is retried and writes issued
/// before the error are not rolled back.
#[derive(Debug, Error)]
pub enum RollcallError {
    #[error("roster store unavailable: {0}")]
    StoreUnavailable(#[from] StorageError),
    #[error("import aborted: student `{name}` already exists")]
    ImportConflict { name: String },
    #[error("cannot access file {}: {source}", .path.display())]
    FileAccess { path: PathBuf, source: io::Error },
    #[error("invalid record on line {line}: {reason}")]
    InvalidRecord { line: u64, reason: String },
}
