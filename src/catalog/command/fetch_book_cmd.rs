use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};
use crate::gateway::metadata::BookMetadata;

pub(crate) struct FetchBookCommand {
    catalog_service: Arc<dyn CatalogService>,
}

impl FetchBookCommand {
    pub(crate) fn new(catalog_service: Arc<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct FetchBookCommandRequest {
    pub(crate) isbn: String,
}

impl FetchBookCommandRequest {
    pub fn new(isbn: &str) -> Self {
        Self {
            isbn: isbn.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct FetchBookCommandResponse {
    pub book: BookMetadata,
}

impl FetchBookCommandResponse {
    pub fn new(book: BookMetadata) -> Self {
        Self {
            book,
        }
    }
}

#[async_trait]
impl Command<FetchBookCommandRequest, FetchBookCommandResponse> for FetchBookCommand {
    async fn execute(&self, req: FetchBookCommandRequest) -> Result<FetchBookCommandResponse, CommandError> {
        self.catalog_service.fetch_metadata(req.isbn.as_str())
            .await.map_err(CommandError::from).map(FetchBookCommandResponse::new)
    }
}
