pub mod service;

use async_trait::async_trait;
use crate::books::domain::model::BookPatch;
use crate::books::dto::BookDto;
use crate::core::library::LibraryResult;
use crate::gateway::metadata::BookMetadata;

#[async_trait]
pub(crate) trait CatalogService: Sync + Send {
    async fn list_books(&self) -> LibraryResult<Vec<BookDto>>;
    async fn find_book_by_isbn(&self, isbn: &str) -> LibraryResult<BookDto>;
    async fn search_books(&self, title: Option<&str>, author: Option<&str>) -> LibraryResult<Vec<BookDto>>;
    async fn add_book(&self, book: &BookDto) -> LibraryResult<BookDto>;
    async fn update_book(&self, isbn: &str, patch: &BookPatch) -> LibraryResult<BookDto>;
    async fn remove_book(&self, isbn: &str) -> LibraryResult<()>;
    async fn toggle_read(&self, isbn: &str) -> LibraryResult<BookDto>;
    async fn fetch_metadata(&self, isbn: &str) -> LibraryResult<BookMetadata>;
    // fetch-and-store: strictly insert-if-absent
    async fn import_book(&self, isbn: &str) -> LibraryResult<BookDto>;
    async fn close(&self) -> LibraryResult<()>;
}
