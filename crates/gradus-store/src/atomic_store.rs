//! Lock-scoped atomic mutation of a store directory.
//!
//! Validation and persistence of a recipe happen under one lock, so the
//! snapshot a recipe was validated against is the one it is written into.

use crate::layout::StoreLayout;
use crate::memory::{MemoryStore, StoreError};
use chrono::Utc;
use std::error::Error as StdError;
use std::fmt::{Display, Formatter};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum AtomicStoreMutationError<E> {
    LockBusy { lock_path: String },
    LockIo { lock_path: String, message: String },
    Store(StoreError),
    Mutation(E),
}

impl<E> AtomicStoreMutationError<E> {
    fn lock_busy(lock_path: &Path) -> Self {
        Self::LockBusy {
            lock_path: lock_path.display().to_string(),
        }
    }

    fn lock_io(lock_path: &Path, message: impl Into<String>) -> Self {
        Self::LockIo {
            lock_path: lock_path.display().to_string(),
            message: message.into(),
        }
    }
}

impl<E: Display> Display for AtomicStoreMutationError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LockBusy { lock_path } => write!(f, "store lock busy: {lock_path}"),
            Self::LockIo { lock_path, message } => {
                write!(f, "failed to acquire store lock {lock_path}: {message}")
            }
            Self::Store(err) => write!(f, "{err}"),
            Self::Mutation(err) => write!(f, "{err}"),
        }
    }
}

impl<E> StdError for AtomicStoreMutationError<E> where
    E: Display + std::fmt::Debug + StdError + 'static
{
}

/// Execute one lock-scoped mutation against a store directory.
///
/// The mutator returns `(value, changed)` where:
/// - `value` is returned to the caller
/// - `changed=true` persists the store before the lock is released.
///
/// A mutator error leaves the files on disk untouched.
pub fn mutate_store<T, E, F>(
    layout: &StoreLayout,
    mutator: F,
) -> Result<T, AtomicStoreMutationError<E>>
where
    F: FnOnce(&mut MemoryStore) -> Result<(T, bool), E>,
{
    let _guard = StoreLockGuard::acquire::<E>(&layout.lock_path())?;

    let mut store = MemoryStore::load(layout).map_err(AtomicStoreMutationError::Store)?;
    let (value, changed) = mutator(&mut store).map_err(AtomicStoreMutationError::Mutation)?;
    if changed {
        store.save(layout).map_err(AtomicStoreMutationError::Store)?;
    }
    Ok(value)
}

struct StoreLockGuard {
    lock_path: PathBuf,
    _file: File,
}

impl StoreLockGuard {
    fn acquire<E>(lock_path: &Path) -> Result<Self, AtomicStoreMutationError<E>> {
        if let Some(parent) = lock_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|e| AtomicStoreMutationError::lock_io(lock_path, e.to_string()))?;
        }

        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(lock_path)
        {
            Ok(mut file) => {
                let _ = writeln!(
                    file,
                    "pid={}\nutc={}",
                    std::process::id(),
                    Utc::now().to_rfc3339()
                );
                tracing::trace!(lock = %lock_path.display(), "acquired store lock");
                Ok(Self {
                    lock_path: lock_path.to_path_buf(),
                    _file: file,
                })
            }
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(AtomicStoreMutationError::lock_busy(lock_path))
            }
            Err(err) => Err(AtomicStoreMutationError::lock_io(lock_path, err.to_string())),
        }
    }
}

impl Drop for StoreLockGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}
