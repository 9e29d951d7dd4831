// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use super::Persist;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A [`Persist`] implementation backed by a JSON file. Writes go to a
/// sibling temporary file first and are moved into place, so a crash
/// mid-write never truncates the stored value.
#[derive(derive_more::Deref)]
pub struct File<T> {
    #[deref]
    value: T,
    path: PathBuf,
}

impl<T: Serialize + DeserializeOwned> File<T> {
    /// Wraps a fresh value to be stored at `path`.
    pub fn new(path: impl Into<PathBuf>, value: T) -> Self {
        Self {
            value,
            path: path.into(),
        }
    }

    /// Reads the value stored at `path`.
    pub fn read(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let contents = std::fs::read_to_string(&path)?;
        let value = serde_json::from_str(&contents)?;
        Ok(Self { value, path })
    }

    /// Reads the value stored at `path`, or starts from `default` if the
    /// file does not exist yet.
    pub fn read_or_default(path: impl Into<PathBuf>, default: T) -> Result<Self, Error> {
        let path = path.into();
        if path.exists() {
            Self::read(path)
        } else {
            Ok(Self {
                value: default,
                path,
            })
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T: Serialize + DeserializeOwned> Persist for File<T> {
    type Error = Error;

    fn as_mut(this: &mut Self) -> &mut T {
        &mut this.value
    }

    fn persist(this: &mut Self) -> Result<(), Error> {
        let contents = serde_json::to_string_pretty(&this.value)?;
        let staging = this.path.with_extension("new");
        std::fs::write(&staging, contents)?;
        std::fs::rename(&staging, &this.path)?;
        Ok(())
    }

    fn into_value(this: Self) -> T {
        this.value
    }
}
