// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Advisory exclusive lock guarding single-writer access to an index
//! directory.

use crate::error::{IndexError, IndexResult};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// RAII write-lock handle. The lock is released when this value drops.
///
/// Acquisition is a single non-blocking attempt: a held lock fails
/// `open` immediately with [`IndexError::LockHeld`] rather than
/// retrying with a timeout, since an index is opened once per process
/// and a contended lock means a programming error, not a transient
/// race worth waiting out.
#[derive(Debug)]
pub struct WriteLock {
    file: File,
    path: PathBuf,
}

impl WriteLock {
    /// Acquire the exclusive lock on `directory`'s `write.lock` file.
    ///
    /// ## Error Conditions
    /// - `IndexError::LockHeld` if another handle already holds it.
    /// - `IndexError::Io` if the lock file cannot be created.
    pub fn acquire(directory: &Path) -> IndexResult<Self> {
        std::fs::create_dir_all(directory)?;
        let path = directory.join("write.lock");

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&path)?;

        file.try_lock_exclusive()
            .map_err(|_| IndexError::LockHeld { path: path.clone() })?;

        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

#[cfg(test)]
#[path = "lock_test.rs"]
mod lock_test;
