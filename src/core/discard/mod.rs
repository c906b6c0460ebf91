//! # Discard Module
//!
//! Moves rejected images into a `.discarded` folder next to them.
//!
//! ## Guarantees
//! - Never overwrites: an existing `.discarded/<name>` is a collision
//! - Never deletes outright: a cross-device fallback removes the source
//!   only after the copy has been verified
//! - On failure the original stays where it was

use crate::core::catalog::ImageRecord;
use crate::error::DiscardError;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Name of the folder rejected images are moved into
pub const DISCARD_DIR: &str = ".discarded";

/// Where a discarded image went
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscardRecord {
    pub original: PathBuf,
    pub moved_to: PathBuf,
}

/// Destination of a discarded file: `<parent>/.discarded/<file name>`
pub fn discard_destination(path: &Path) -> Option<PathBuf> {
    let parent = path.parent()?;
    let name = path.file_name()?;
    Some(parent.join(DISCARD_DIR).join(name))
}

/// Somewhere to put rejected images
pub trait DiscardStore: Send {
    /// Move the record's file out of the way
    fn discard(&mut self, record: &ImageRecord) -> Result<DiscardRecord, DiscardError>;
}

/// Bounded retry for transient filesystem errors
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub attempts: u32,
    /// Pause between attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_millis(50),
        }
    }
}

impl RetryPolicy {
    /// Run `op` until it succeeds, fails permanently or runs out of attempts
    pub fn run<T>(&self, mut op: impl FnMut() -> io::Result<T>) -> io::Result<T> {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;
        loop {
            match op() {
                Err(e) if attempt < attempts && is_transient(&e) => {
                    tracing::debug!(attempt, "transient filesystem error, retrying: {e}");
                    thread::sleep(self.backoff);
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

fn is_transient(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        ErrorKind::Interrupted | ErrorKind::WouldBlock | ErrorKind::TimedOut
    )
}

/// Discard store that moves files on the local filesystem
#[derive(Debug, Clone, Default)]
pub struct FsDiscardStore {
    retry: RetryPolicy,
}

impl FsDiscardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Move `path` into its sibling `.discarded` folder
    pub fn discard_path(&self, path: &Path) -> Result<DiscardRecord, DiscardError> {
        let destination = discard_destination(path).ok_or_else(|| DiscardError::Io {
            path: path.to_path_buf(),
            destination: PathBuf::new(),
            source: io::Error::new(ErrorKind::InvalidInput, "path has no parent or file name"),
        })?;
        let io_error = |source: io::Error| DiscardError::Io {
            path: path.to_path_buf(),
            destination: destination.clone(),
            source,
        };

        fs::symlink_metadata(path).map_err(io_error)?;

        if fs::symlink_metadata(&destination).is_ok() {
            return Err(DiscardError::Collision {
                path: path.to_path_buf(),
                destination: destination.clone(),
            });
        }

        if let Some(dir) = destination.parent() {
            self.retry.run(|| fs::create_dir_all(dir)).map_err(io_error)?;
        }

        match self.retry.run(|| move_file(path, &destination)) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(DiscardError::Collision {
                    path: path.to_path_buf(),
                    destination: destination.clone(),
                });
            }
            Err(e) => return Err(io_error(e)),
        }

        tracing::info!(from = %path.display(), to = %destination.display(), "discarded");

        Ok(DiscardRecord {
            original: path.to_path_buf(),
            moved_to: destination,
        })
    }
}

impl DiscardStore for FsDiscardStore {
    fn discard(&mut self, record: &ImageRecord) -> Result<DiscardRecord, DiscardError> {
        self.discard_path(&record.path)
    }
}

/// Move `source` to `destination`, never replacing an existing file.
///
/// The destination is created by `hard_link`, or `create_new` in the copy
/// fallback; both fail with `AlreadyExists` if it is taken.
fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::hard_link(source, destination) {
        Ok(()) => {
            if let Err(e) = fs::remove_file(source) {
                let _ = fs::remove_file(destination);
                return Err(e);
            }
            Ok(())
        }
        Err(e)
            if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::AlreadyExists)
                || is_transient(&e) =>
        {
            Err(e)
        }
        // no hard links across filesystems or on some volumes; copy, verify, then remove the source
        Err(_) => copy_then_remove(source, destination),
    }
}

fn copy_then_remove(source: &Path, destination: &Path) -> io::Result<()> {
    let metadata = fs::metadata(source)?;
    let mut reader = File::open(source)?;
    let mut writer = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)?;

    let copied = io::copy(&mut reader, &mut writer).and_then(|n| writer.sync_all().map(|_| n));
    drop(writer);

    match copied {
        Ok(n) if n == metadata.len() => {}
        Ok(n) => {
            let _ = fs::remove_file(destination);
            return Err(io::Error::other(format!(
                "copy verification failed: source {} bytes, destination {} bytes",
                metadata.len(),
                n
            )));
        }
        Err(e) => {
            let _ = fs::remove_file(destination);
            return Err(e);
        }
    }

    let _ = fs::set_permissions(destination, metadata.permissions());

    if let Err(e) = fs::remove_file(source) {
        let _ = fs::remove_file(destination);
        return Err(e);
    }
    Ok(())
}
