use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use tracing::{info, warn};
use crate::books::domain::model::{require_text, BookEntity, BookPatch};
use crate::books::dto::BookDto;
use crate::books::repository::BookRepository;
use crate::catalog::domain::CatalogService;
use crate::core::domain::{Configuration, Identifiable};
use crate::core::events::DomainEvent;
use crate::core::library::{LibraryError, LibraryResult};
use crate::gateway::events::EventPublisher;
use crate::gateway::metadata::{BookMetadata, MetadataFetcher};

const EVENT_GROUP: &str = "books";

pub(crate) struct CatalogServiceImpl {
    book_repository: Arc<dyn BookRepository>,
    events_publisher: Box<dyn EventPublisher>,
    metadata_fetcher: Box<dyn MetadataFetcher>,
}

impl CatalogServiceImpl {
    pub(crate) fn new(_config: &Configuration, book_repository: Arc<dyn BookRepository>,
                      events_publisher: Box<dyn EventPublisher>,
                      metadata_fetcher: Box<dyn MetadataFetcher>) -> Self {
        Self {
            book_repository,
            events_publisher,
            metadata_fetcher,
        }
    }

    // Runs after the store change is durable, so failures are logged and the change stands.
    async fn publish(&self, event: serde_json::Result<DomainEvent>) {
        let event = match event {
            Ok(event) => event,
            Err(err) => {
                warn!("failed to encode book event: {}", err);
                return;
            }
        };
        if let Err(err) = self.events_publisher.publish(&event).await {
            warn!(key = event.key.as_str(), kind = ?event.kind, "failed to publish book event: {}", err);
        }
    }
}

#[async_trait]
impl CatalogService for CatalogServiceImpl {
    async fn list_books(&self) -> LibraryResult<Vec<BookDto>> {
        let books = self.book_repository.list().await?;
        Ok(books.iter().map(BookDto::from).collect())
    }

    async fn find_book_by_isbn(&self, isbn: &str) -> LibraryResult<BookDto> {
        self.book_repository.get(isbn).await.map(|b| BookDto::from(&b))
    }

    async fn search_books(&self, title: Option<&str>, author: Option<&str>) -> LibraryResult<Vec<BookDto>> {
        let res = match (title, author) {
            (Some(title), None) => self.book_repository.find_by_title(title).await?,
            (None, Some(author)) => self.book_repository.find_by_author(author).await?,
            (Some(title), Some(author)) => {
                self.book_repository.query(&HashMap::from([
                    ("title".to_string(), title.to_string()),
                    ("author".to_string(), author.to_string()),
                ])).await?
            }
            (None, None) => {
                return Err(LibraryError::validation("search needs a title or an author", None));
            }
        };
        Ok(res.iter().map(BookDto::from).collect())
    }

    async fn add_book(&self, book: &BookDto) -> LibraryResult<BookDto> {
        book.validate()?;
        let _ = self.book_repository.create(&BookEntity::from(book)).await?;
        self.publish(DomainEvent::added(EVENT_GROUP, book.id().as_str(), book)).await;
        Ok(book.clone())
    }

    async fn update_book(&self, isbn: &str, patch: &BookPatch) -> LibraryResult<BookDto> {
        patch.validate()?;
        let updated = BookDto::from(&self.book_repository.patch(isbn, patch).await?);
        self.publish(DomainEvent::updated(EVENT_GROUP, isbn, &updated)).await;
        Ok(updated)
    }

    async fn remove_book(&self, isbn: &str) -> LibraryResult<()> {
        let _ = self.book_repository.delete(isbn).await?;
        self.publish(DomainEvent::deleted(EVENT_GROUP, isbn, &isbn.to_string())).await;
        Ok(())
    }

    async fn toggle_read(&self, isbn: &str) -> LibraryResult<BookDto> {
        let updated = BookDto::from(&self.book_repository.toggle_read(isbn).await?);
        self.publish(DomainEvent::updated(EVENT_GROUP, isbn, &updated)).await;
        Ok(updated)
    }

    async fn fetch_metadata(&self, isbn: &str) -> LibraryResult<BookMetadata> {
        require_text("isbn", isbn)?;
        self.metadata_fetcher.fetch_by_isbn(isbn).await
    }

    async fn import_book(&self, isbn: &str) -> LibraryResult<BookDto> {
        require_text("isbn", isbn)?;
        match self.book_repository.get(isbn).await {
            Ok(_) => {
                return Err(LibraryError::duplicate_key(
                    format!("book with isbn {} is already cataloged", isbn).as_str()));
            }
            Err(LibraryError::NotFound { .. }) => {}
            Err(err) => return Err(err),
        }
        let metadata = self.metadata_fetcher.fetch_by_isbn(isbn).await.map_err(|err| {
            warn!(isbn, retryable = err.retryable(), "metadata lookup failed: {}", err);
            err
        })?;
        let book = self.add_book(&metadata.to_book()).await?;
        info!(isbn, title = book.title.as_str(), "imported book from metadata service");
        Ok(book)
    }

    async fn close(&self) -> LibraryResult<()> {
        self.book_repository.close().await
    }
}

impl From<&BookEntity> for BookDto {
    fn from(other: &BookEntity) -> Self {
        Self {
            isbn: other.isbn.to_string(),
            title: other.title.to_string(),
            author: other.author.to_string(),
            description: other.description.to_string(),
            is_read: other.is_read,
        }
    }
}

impl From<&BookDto> for BookEntity {
    fn from(other: &BookDto) -> Self {
        Self {
            isbn: other.isbn.to_string(),
            title: other.title.to_string(),
            author: other.author.to_string(),
            description: other.description.to_string(),
            is_read: other.is_read,
        }
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use tempfile::TempDir;
    use crate::books::domain::model::BookPatch;
    use crate::books::dto::BookDto;
    use crate::catalog::domain::CatalogService;
    use crate::catalog::factory;
    use crate::core::domain::{Configuration, Identifiable};
    use crate::core::events::DomainEventType;
    use crate::core::library::LibraryError;
    use crate::gateway::events::recording::{FailingPublisher, RecordingPublisher};
    use crate::gateway::metadata::BookMetadata;
    use crate::gateway::metadata::stub::StubMetadataFetcher;

    struct Fixture {
        _dir: TempDir,
        svc: Arc<dyn CatalogService>,
        fetcher: StubMetadataFetcher,
        publisher: RecordingPublisher,
    }

    async fn fixture_with(fetcher: StubMetadataFetcher) -> Fixture {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("books.json");
        let config = Configuration::new(path.to_str().expect("utf8 path"));
        let publisher = RecordingPublisher::default();
        let svc = factory::create_catalog_service_with(
            &config, Box::new(fetcher.clone()), Box::new(publisher.clone()))
            .await.expect("should create service");
        Fixture { _dir: dir, svc, fetcher, publisher }
    }

    async fn fixture() -> Fixture {
        fixture_with(StubMetadataFetcher::new(vec![
            BookMetadata::new("9780441013593", "Dune", "Frank Herbert", "Spice must flow"),
        ])).await
    }

    #[tokio::test]
    async fn test_should_add_book() {
        let f = fixture().await;

        let book = BookDto::new("111", "test book", "tester").with_description("about");
        let _ = f.svc.add_book(&book).await.expect("should add book");

        let loaded = f.svc.find_book_by_isbn("111").await.expect("should return book");
        assert_eq!(book, loaded);
        assert_eq!(DomainEventType::Added, f.publisher.published()[0].kind);
    }

    #[tokio::test]
    async fn test_should_reject_duplicate_book() {
        let f = fixture().await;

        let book = BookDto::new("111", "test book", "tester");
        let _ = f.svc.add_book(&book).await.expect("should add book");
        let res = f.svc.add_book(&BookDto::new("111", "other", "someone")).await;
        assert!(matches!(res, Err(LibraryError::DuplicateKey { .. })));

        let books = f.svc.list_books().await.expect("should list");
        assert_eq!(vec![book], books);
        assert_eq!(1, f.publisher.published().len());
    }

    #[tokio::test]
    async fn test_should_reject_invalid_book() {
        let f = fixture().await;
        let res = f.svc.add_book(&BookDto::new("111", " ", "tester")).await;
        assert!(matches!(res, Err(LibraryError::Validation { .. })));
        assert!(f.svc.list_books().await.expect("should list").is_empty());
    }

    #[tokio::test]
    async fn test_should_update_book() {
        let f = fixture().await;

        let book = BookDto::new("111", "test book", "tester").with_description("about");
        let _ = f.svc.add_book(&book).await.expect("should add book");

        let patch = BookPatch { title: Some("new title".to_string()), is_read: Some(true), ..BookPatch::default() };
        let updated = f.svc.update_book("111", &patch).await.expect("should update book");
        assert_eq!("new title", updated.title.as_str());

        let loaded = f.svc.find_book_by_isbn("111").await.expect("should return book");
        assert_eq!("new title", loaded.title.as_str());
        assert_eq!("tester", loaded.author.as_str());
        assert_eq!("about", loaded.description.as_str());
        assert!(loaded.is_read);
        assert_eq!("111", loaded.isbn.as_str());
    }

    #[tokio::test]
    async fn test_should_not_update_missing_book() {
        let f = fixture().await;
        let patch = BookPatch { title: Some("new title".to_string()), ..BookPatch::default() };
        let res = f.svc.update_book("404", &patch).await;
        assert!(matches!(res, Err(LibraryError::NotFound { .. })));
        assert!(f.publisher.published().is_empty());
    }

    #[tokio::test]
    async fn test_should_search_books() {
        let f = fixture().await;
        let _ = f.svc.add_book(&BookDto::new("1", "The Hobbit", "J. R. R. Tolkien")).await.expect("add");
        let _ = f.svc.add_book(&BookDto::new("2", "The Silmarillion", "J. R. R. Tolkien")).await.expect("add");
        let _ = f.svc.add_book(&BookDto::new("3", "Hobbit Cookbook", "Someone Else")).await.expect("add");

        assert_eq!(2, f.svc.search_books(Some("hobbit"), None).await.expect("search").len());
        assert_eq!(2, f.svc.search_books(None, Some("tolkien")).await.expect("search").len());
        assert_eq!(1, f.svc.search_books(Some("HOBBIT"), Some("tolkien")).await.expect("search").len());
        assert!(f.svc.search_books(Some("dune"), None).await.expect("search").is_empty());
        assert!(matches!(f.svc.search_books(None, None).await, Err(LibraryError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_should_remove_book() {
        let f = fixture().await;

        let book = BookDto::new("isbn123", "test book", "tester");
        let _ = f.svc.add_book(&book).await.expect("should add book");

        let _ = f.svc.remove_book("isbn123").await.expect("should remove book");

        let loaded = f.svc.find_book_by_isbn("isbn123").await;
        assert!(matches!(loaded, Err(LibraryError::NotFound { .. })));
        assert!(matches!(f.svc.remove_book("isbn123").await, Err(LibraryError::NotFound { .. })));
        assert_eq!(DomainEventType::Deleted, f.publisher.published()[1].kind);
    }

    #[tokio::test]
    async fn test_should_toggle_read() {
        let f = fixture().await;
        let _ = f.svc.add_book(&BookDto::new("111", "A", "B")).await.expect("should add book");

        assert!(f.svc.toggle_read("111").await.expect("should toggle").is_read);
        assert!(!f.svc.toggle_read("111").await.expect("should toggle").is_read);
        assert!(matches!(f.svc.toggle_read("222").await, Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_should_fetch_metadata_without_storing() {
        let f = fixture().await;
        let metadata = f.svc.fetch_metadata("9780441013593").await.expect("should fetch");
        assert_eq!("Dune", metadata.title.as_str());
        assert!(f.svc.list_books().await.expect("should list").is_empty());

        let res = f.svc.fetch_metadata("000").await;
        assert!(matches!(res, Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_should_import_book() {
        let f = fixture().await;
        let book = f.svc.import_book("9780441013593").await.expect("should import");
        assert_eq!("Frank Herbert", book.author.as_str());
        assert!(!book.is_read);

        let loaded = f.svc.find_book_by_isbn("9780441013593").await.expect("should return book");
        assert_eq!(book, loaded);
        assert_eq!(1, f.fetcher.calls());
    }

    #[tokio::test]
    async fn test_should_not_import_cataloged_book() {
        let f = fixture().await;
        let mine = BookDto::new("9780441013593", "My Dune", "F. Herbert");
        let _ = f.svc.add_book(&mine).await.expect("should add book");

        let res = f.svc.import_book("9780441013593").await;
        assert!(matches!(res, Err(LibraryError::DuplicateKey { .. })));
        assert_eq!(0, f.fetcher.calls());
        assert_eq!(vec![mine], f.svc.list_books().await.expect("should list"));
    }

    #[tokio::test]
    async fn test_should_not_import_unknown_book() {
        let f = fixture().await;
        let res = f.svc.import_book("000").await;
        assert!(matches!(res, Err(LibraryError::NotFound { .. })));
        assert!(f.svc.list_books().await.expect("should list").is_empty());
    }

    #[tokio::test]
    async fn test_should_surface_unavailable_metadata_service() {
        let f = fixture_with(StubMetadataFetcher::unavailable()).await;
        let res = f.svc.import_book("9780441013593").await;
        assert!(matches!(res, Err(LibraryError::CurrentlyUnavailable { .. })));
        assert!(f.svc.list_books().await.expect("should list").is_empty());
    }

    #[tokio::test]
    async fn test_should_run_catalog_lifecycle() {
        let f = fixture().await;
        let _ = f.svc.add_book(&BookDto::new("111", "A", "B")).await.expect("should add book");
        let books = f.svc.list_books().await.expect("should list");
        assert_eq!(1, books.len());
        assert!(!books[0].is_read);

        let _ = f.svc.toggle_read("111").await.expect("should toggle");
        assert!(f.svc.find_book_by_isbn("111").await.expect("should return book").is_read);

        let _ = f.svc.remove_book("111").await.expect("should remove book");
        assert!(f.svc.list_books().await.expect("should list").is_empty());
        f.svc.close().await.expect("should close");
    }

    #[tokio::test]
    async fn test_should_keep_changes_when_publishing_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Configuration::new(dir.path().join("books.json").to_str().expect("utf8 path"));
        let svc = factory::create_catalog_service_with(
            &config, Box::new(StubMetadataFetcher::default()), Box::new(FailingPublisher::default()))
            .await.expect("should create service");

        let _ = svc.add_book(&BookDto::new("111", "A", "B")).await.expect("should add book");
        let toggled = svc.toggle_read("111").await.expect("should toggle");
        assert!(toggled.is_read);
        let patch = BookPatch { description: Some("notes".to_string()), ..BookPatch::default() };
        let updated = svc.update_book("111", &patch).await.expect("should update book");
        assert_eq!("notes", updated.description.as_str());
        assert_eq!(updated, svc.find_book_by_isbn("111").await.expect("should return book"));

        svc.remove_book("111").await.expect("should remove book");
        assert!(svc.list_books().await.expect("should list").is_empty());
    }
}
