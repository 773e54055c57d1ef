use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::books::dto::BookDto;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};

pub(crate) struct AddBookCommand {
    catalog_service: Arc<dyn CatalogService>,
}

impl AddBookCommand {
    pub(crate) fn new(catalog_service: Arc<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddBookCommandRequest {
    pub(crate) isbn: String,
    pub(crate) title: String,
    pub(crate) author: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) is_read: bool,
}

impl AddBookCommandRequest {
    pub fn new(isbn: &str, title: &str, author: &str) -> Self {
        Self {
            isbn: isbn.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            description: None,
            is_read: false,
        }
    }
    pub fn build_book(&self) -> BookDto {
        let mut book = BookDto::new(self.isbn.as_str(), self.title.as_str(), self.author.as_str())
            .with_description(self.description.as_deref().unwrap_or_default());
        book.is_read = self.is_read;
        book
    }
}


#[derive(Debug, Serialize)]
pub(crate) struct AddBookCommandResponse {
    pub book: BookDto,
}

impl AddBookCommandResponse {
    pub fn new(book: BookDto) -> Self {
        Self {
            book,
        }
    }
}

#[async_trait]
impl Command<AddBookCommandRequest, AddBookCommandResponse> for AddBookCommand {
    async fn execute(&self, req: AddBookCommandRequest) -> Result<AddBookCommandResponse, CommandError> {
        let book = req.build_book();
        self.catalog_service.add_book(&book).await.map_err(CommandError::from).map(AddBookCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use async_once::AsyncOnce;
    use lazy_static::lazy_static;
    use tempfile::TempDir;
    use crate::catalog::command::add_book_cmd::{AddBookCommand, AddBookCommandRequest};
    use crate::catalog::domain::CatalogService;
    use crate::catalog::factory::testing::create_test_catalog_service;
    use crate::core::command::{Command, CommandError};

    lazy_static! {
        static ref SUT_SVC : AsyncOnce<(TempDir, Arc<dyn CatalogService>)> = AsyncOnce::new(async {
                let dir = tempfile::tempdir().expect("tempdir");
                let svc = create_test_catalog_service(dir.path()).await;
                (dir, svc)
            });
    }

    #[tokio::test]
    async fn test_should_run_add_book() {
        let cmd = AddBookCommand::new(SUT_SVC.get().await.1.clone());

        let res = cmd.execute(AddBookCommandRequest::new("add-1", "test book", "tester"))
            .await.expect("should add book");
        assert_eq!("add-1", res.book.isbn.as_str());
        assert!(!res.book.is_read);
    }

    #[tokio::test]
    async fn test_should_parse_add_book_request() {
        let req: AddBookCommandRequest = serde_json::from_str(
            r#"{"isbn": "add-2", "title": "A", "author": "B", "description": "C", "is_read": true}"#)
            .expect("should parse request");
        let book = req.build_book();
        assert_eq!("C", book.description.as_str());
        assert!(book.is_read);
    }

    #[tokio::test]
    async fn test_should_fail_add_duplicate_book() {
        let cmd = AddBookCommand::new(SUT_SVC.get().await.1.clone());

        let _ = cmd.execute(AddBookCommandRequest::new("add-3", "test book", "tester"))
            .await.expect("should add book");
        let res = cmd.execute(AddBookCommandRequest::new("add-3", "test book", "tester")).await;
        assert!(matches!(res, Err(CommandError::DuplicateKey { .. })));
    }
}
