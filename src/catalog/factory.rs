use std::sync::Arc;
use crate::books::factory;
use crate::catalog::domain::CatalogService;
use crate::catalog::domain::service::CatalogServiceImpl;
use crate::core::domain::Configuration;
use crate::core::library::LibraryResult;
use crate::gateway::events::EventPublisher;
use crate::gateway::factory::{create_metadata_fetcher, create_publisher};
use crate::gateway::metadata::MetadataFetcher;

pub(crate) async fn create_catalog_service(config: &Configuration) -> LibraryResult<Arc<dyn CatalogService>> {
    let fetcher = create_metadata_fetcher(config)?;
    create_catalog_service_with(config, fetcher, create_publisher()).await
}

pub(crate) async fn create_catalog_service_with(config: &Configuration,
                                                metadata_fetcher: Box<dyn MetadataFetcher>,
                                                publisher: Box<dyn EventPublisher>) -> LibraryResult<Arc<dyn CatalogService>> {
    let book_repo = factory::create_book_repository(config).await?;
    Ok(Arc::new(CatalogServiceImpl::new(config, book_repo, publisher, metadata_fetcher)))
}
