pub mod json_book_repository;

use async_trait::async_trait;
use crate::books::domain::model::{BookEntity, BookPatch};
use crate::core::library::LibraryResult;
use crate::core::repository::Repository;

#[async_trait]
pub(crate) trait BookRepository: Repository<BookEntity> {
    async fn find_by_title(&self, title: &str) -> LibraryResult<Vec<BookEntity>>;
    async fn find_by_author(&self, author: &str) -> LibraryResult<Vec<BookEntity>>;
    async fn patch(&self, isbn: &str, patch: &BookPatch) -> LibraryResult<BookEntity>;
    async fn toggle_read(&self, isbn: &str) -> LibraryResult<BookEntity>;
    // waits for in-flight mutations before the process exits
    async fn close(&self) -> LibraryResult<()>;
}
