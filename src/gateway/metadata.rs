use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::books::dto::BookDto;
use crate::core::library::LibraryResult;

// BookMetadata holds the descriptive fields an external catalog knows about an isbn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct BookMetadata {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub description: String,
}

impl BookMetadata {
    pub fn new(isbn: &str, title: &str, author: &str, description: &str) -> Self {
        Self {
            isbn: isbn.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            description: description.to_string(),
        }
    }

    // Fetched books enter the catalog unread.
    pub fn to_book(&self) -> BookDto {
        BookDto::new(self.isbn.as_str(), self.title.as_str(), self.author.as_str())
            .with_description(self.description.as_str())
    }
}

/// Looks up book details by isbn in a third-party service.
///
/// Implementations return `NotFound` when the service has no such isbn and
/// `CurrentlyUnavailable` when it cannot be reached in time or answers with an error.
#[async_trait]
pub(crate) trait MetadataFetcher: Sync + Send {
    async fn fetch_by_isbn(&self, isbn: &str) -> LibraryResult<BookMetadata>;
}
