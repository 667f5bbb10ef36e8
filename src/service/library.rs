//! Catalog operations on the storage directory.

use crate::error::Result;
use crate::types::CatalogEntry;
use std::path::PathBuf;

use super::TuneFetch;

impl TuneFetch {
    /// List stored artifacts, most recently modified first
    pub async fn list_catalog(&self) -> Result<Vec<CatalogEntry>> {
        self.catalog.list().await
    }

    /// Locate a stored file, returning its path and content type
    ///
    /// # Errors
    ///
    /// [`crate::CatalogError::NotFound`] when the file does not exist and
    /// [`crate::CatalogError::InvalidName`] for names that are not a single
    /// path component.
    pub async fn open_file(&self, filename: &str) -> Result<(PathBuf, &'static str)> {
        self.catalog.open(filename).await
    }

    /// Delete a stored mp3 file
    ///
    /// Files of any other encoding are protected and yield
    /// [`crate::CatalogError::NotDeletable`], leaving the file in place.
    pub async fn delete_file(&self, filename: &str) -> Result<()> {
        self.catalog.delete(filename).await
    }
}
