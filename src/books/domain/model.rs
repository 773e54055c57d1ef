use serde::{Deserialize, Deserializer, Serialize};
use crate::core::domain::Identifiable;
use crate::core::library::{LibraryError, LibraryResult};

// BookEntity is one record of the personal catalog, keyed by isbn. Records written by
// older versions of the catalog may lack `is_read` or carry a null description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct BookEntity {
    pub isbn: String,
    pub title: String,
    pub author: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub description: String,
    #[serde(default)]
    pub is_read: bool,
}

impl BookEntity {
    pub fn new(isbn: &str, title: &str, author: &str) -> Self {
        Self {
            isbn: isbn.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            description: String::new(),
            is_read: false,
        }
    }
}

impl Identifiable for BookEntity {
    fn id(&self) -> String {
        self.isbn.to_string()
    }
}

// BookPatch carries the mutable fields of an update; absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub is_read: Option<bool>,
}

impl BookPatch {
    pub fn validate(&self) -> LibraryResult<()> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        if let Some(author) = &self.author {
            require_text("author", author)?;
        }
        Ok(())
    }

    pub fn apply(&self, book: &mut BookEntity) {
        if let Some(title) = &self.title {
            book.title = title.to_string();
        }
        if let Some(author) = &self.author {
            book.author = author.to_string();
        }
        if let Some(description) = &self.description {
            book.description = description.to_string();
        }
        if let Some(is_read) = self.is_read {
            book.is_read = is_read;
        }
    }
}

pub(crate) fn require_text(field: &str, value: &str) -> LibraryResult<()> {
    if value.trim().is_empty() {
        return Err(LibraryError::validation(
            format!("{} must not be blank", field).as_str(), Some(field.to_string())));
    }
    Ok(())
}

pub(crate) fn nullable_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use crate::books::domain::model::{BookEntity, BookPatch};
    use crate::core::domain::Identifiable;

    #[tokio::test]
    async fn test_should_build_books() {
        let book = BookEntity::new("isbn", "title", "author");
        assert_eq!("isbn", book.id().as_str());
        assert_eq!("title", book.title.as_str());
        assert_eq!("", book.description.as_str());
        assert!(!book.is_read);
    }

    #[tokio::test]
    async fn test_should_read_legacy_record() {
        let json = r#"{"title": "Dune", "author": "Frank Herbert", "isbn": "0441013597", "description": null}"#;
        let book: BookEntity = serde_json::from_str(json).expect("should parse book");
        assert_eq!("", book.description.as_str());
        assert!(!book.is_read);
    }

    #[tokio::test]
    async fn test_should_apply_patch_fields() {
        let mut book = BookEntity::new("isbn", "title", "author");
        book.description = "old".to_string();
        let patch = BookPatch { title: Some("new title".to_string()), is_read: Some(true), ..BookPatch::default() };
        patch.apply(&mut book);
        assert_eq!("new title", book.title.as_str());
        assert_eq!("author", book.author.as_str());
        assert_eq!("old", book.description.as_str());
        assert!(book.is_read);
        assert_eq!("isbn", book.isbn.as_str());
    }

    #[tokio::test]
    async fn test_should_reject_blank_patch() {
        let patch = BookPatch { author: Some("  ".to_string()), ..BookPatch::default() };
        assert!(patch.validate().is_err());
        assert!(BookPatch::default().validate().is_ok());
    }
}
