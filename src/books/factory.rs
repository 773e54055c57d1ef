use std::sync::Arc;
use tracing::info;
use crate::books::repository::BookRepository;
use crate::books::repository::json_book_repository::JsonBookRepository;
use crate::core::domain::Configuration;
use crate::core::library::LibraryResult;

pub(crate) async fn create_book_repository(config: &Configuration) -> LibraryResult<Arc<dyn BookRepository>> {
    let repo = JsonBookRepository::open(config.books_file.as_path()).await?;
    info!(path = %repo.path().display(), "book repository ready");
    Ok(Arc::new(repo))
}
