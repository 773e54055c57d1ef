use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::books::dto::BookDto;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};

pub(crate) struct ImportBookCommand {
    catalog_service: Arc<dyn CatalogService>,
}

impl ImportBookCommand {
    pub(crate) fn new(catalog_service: Arc<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImportBookCommandRequest {
    pub(crate) isbn: String,
}

impl ImportBookCommandRequest {
    pub fn new(isbn: &str) -> Self {
        Self {
            isbn: isbn.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ImportBookCommandResponse {
    pub book: BookDto,
}

impl ImportBookCommandResponse {
    pub fn new(book: BookDto) -> Self {
        Self {
            book,
        }
    }
}

#[async_trait]
impl Command<ImportBookCommandRequest, ImportBookCommandResponse> for ImportBookCommand {
    async fn execute(&self, req: ImportBookCommandRequest) -> Result<ImportBookCommandResponse, CommandError> {
        self.catalog_service.import_book(req.isbn.as_str())
            .await.map_err(CommandError::from).map(ImportBookCommandResponse::new)
    }
}
