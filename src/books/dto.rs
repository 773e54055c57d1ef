use serde::{Deserialize, Serialize};
use crate::books::domain::model::{nullable_string, require_text};
use crate::core::domain::Identifiable;
use crate::core::library::LibraryResult;

// BookDto is a data transfer object for Catalog service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct BookDto {
    pub isbn: String,
    pub title: String,
    pub author: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub description: String,
    #[serde(default)]
    pub is_read: bool,
}

impl BookDto {
    pub fn new(isbn: &str, title: &str, author: &str) -> BookDto {
        BookDto {
            isbn: isbn.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            description: String::new(),
            is_read: false,
        }
    }

    pub fn with_description(mut self, description: &str) -> BookDto {
        self.description = description.to_string();
        self
    }

    pub fn validate(&self) -> LibraryResult<()> {
        require_text("isbn", self.isbn.as_str())?;
        require_text("title", self.title.as_str())?;
        require_text("author", self.author.as_str())
    }
}

impl Identifiable for BookDto {
    fn id(&self) -> String {
        self.isbn.to_string()
    }
}
