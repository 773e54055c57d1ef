use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::books::domain::model::BookPatch;
use crate::books::dto::BookDto;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};
use crate::core::library::{LibraryError, LibraryResult};

pub(crate) struct UpdateBookCommand {
    catalog_service: Arc<dyn CatalogService>,
}

impl UpdateBookCommand {
    pub(crate) fn new(catalog_service: Arc<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

// The path isbn selects the book; an isbn in the body may only repeat it.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct UpdateBookCommandRequest {
    #[serde(skip)]
    pub isbn: String,
    #[serde(rename = "isbn", default)]
    pub body_isbn: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub is_read: Option<bool>,
}

impl UpdateBookCommandRequest {
    pub fn new(isbn: &str, title: &str, author: &str) -> Self {
        Self {
            isbn: isbn.to_string(),
            title: Some(title.to_string()),
            author: Some(author.to_string()),
            ..Self::default()
        }
    }

    pub fn build_patch(&self) -> LibraryResult<BookPatch> {
        if let Some(body_isbn) = &self.body_isbn {
            if body_isbn != &self.isbn {
                return Err(LibraryError::validation(
                    format!("isbn {} does not match book {}, delete and add the book to change its isbn",
                            body_isbn, self.isbn).as_str(), Some("isbn".to_string())));
            }
        }
        Ok(BookPatch {
            title: self.title.clone(),
            author: self.author.clone(),
            description: self.description.clone(),
            is_read: self.is_read,
        })
    }
}


#[derive(Debug, Serialize)]
pub(crate) struct UpdateBookCommandResponse {
    pub book: BookDto,
}

impl UpdateBookCommandResponse {
    pub fn new(book: BookDto) -> Self {
        Self {
            book,
        }
    }
}

#[async_trait]
impl Command<UpdateBookCommandRequest, UpdateBookCommandResponse> for UpdateBookCommand {
    async fn execute(&self, req: UpdateBookCommandRequest) -> Result<UpdateBookCommandResponse, CommandError> {
        let patch = req.build_patch()?;
        self.catalog_service.update_book(req.isbn.as_str(), &patch)
            .await.map_err(CommandError::from).map(UpdateBookCommandResponse::new)
    }
}
