//! Book API endpoints

use readlog_http::{
    multipart::{Form, Part},
    ApiResponse, HttpClient, RequestConfig,
};
use tracing::debug;

use crate::{
    error::{BookError, Result},
    models::{Book, CoverUpload, PageResponse},
};

/// Typed access to the book endpoints
#[derive(Clone)]
pub struct BookApi {
    client: HttpClient,
}

impl BookApi {
    /// Create the API over a configured client
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Underlying client
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// All books
    pub async fn get_book_list(&self) -> Result<ApiResponse<PageResponse<Book>>> {
        Ok(self.client.get("/book", RequestConfig::new()).await?)
    }

    /// One book by id
    pub async fn get_book_detail(&self, id: u64) -> Result<ApiResponse<Book>> {
        Ok(self
            .client
            .get(&format!("/books/{id}"), RequestConfig::new())
            .await?)
    }

    /// Books matching `keyword`
    pub async fn search_books(&self, keyword: &str) -> Result<ApiResponse<Vec<Book>>> {
        let config = RequestConfig::new().with_query("keyword", keyword);
        Ok(self.client.get("/books/search", config).await?)
    }

    /// Upload a cover image as `bookId` + `file` multipart fields
    pub async fn upload_book_cover(
        &self,
        cover: &CoverUpload,
    ) -> Result<ApiResponse<serde_json::Value>> {
        let part = Part::bytes(cover.bytes().to_vec())
            .file_name(cover.file_name().to_string())
            .mime_str(cover.mime())
            .map_err(|e| BookError::InvalidUpload(e.to_string()))?;
        let form = Form::new()
            .text("bookId", cover.book_id().to_string())
            .part("file", part);

        debug!(book_id = cover.book_id(), file = cover.file_name(), "Uploading book cover");
        Ok(self
            .client
            .upload("/upload/book-cover", form, RequestConfig::new())
            .await?)
    }
}
