//! Book data models

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BookError, Result};

/// Personal reading status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingStatus {
    /// On the wish list
    Want,
    /// Currently reading
    Reading,
    /// Finished
    Read,
}

/// A book, with the reader's own notes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: u64,
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// 1 to 5
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub my_rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub my_review: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading_status: Option<ReadingStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_date: Option<String>,
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub list: Vec<T>,
    pub total: u64,
}

/// A validated cover image ready to upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverUpload {
    book_id: u64,
    file_name: String,
    mime: String,
    bytes: Vec<u8>,
}

impl CoverUpload {
    /// Validate the required fields of a cover upload
    pub fn new(
        book_id: u64,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self> {
        let file_name = file_name.into();
        let mime = mime.into();

        if book_id == 0 {
            return Err(BookError::InvalidUpload("book id is required".to_string()));
        }
        if file_name.trim().is_empty() {
            return Err(BookError::InvalidUpload("file name is required".to_string()));
        }
        if bytes.is_empty() {
            return Err(BookError::InvalidUpload(format!("{file_name} is empty")));
        }
        if !mime.starts_with("image/") {
            return Err(BookError::InvalidUpload(format!(
                "{file_name} is not an image ({mime})"
            )));
        }

        Ok(Self {
            book_id,
            file_name,
            mime,
            bytes,
        })
    }

    /// Read a cover from disk, guessing its type from the extension
    pub fn from_path(book_id: u64, path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        Self::new(book_id, file_name, mime.to_string(), bytes)
    }

    pub fn book_id(&self) -> u64 {
        self.book_id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}
