use crate::core::domain::Configuration;
use crate::core::library::LibraryResult;
use crate::gateway::events::EventPublisher;
use crate::gateway::google::fetcher::GoogleBooksFetcher;
use crate::gateway::logs::publisher::LogPublisher;
use crate::gateway::metadata::MetadataFetcher;

pub(crate) fn create_publisher() -> Box<dyn EventPublisher> {
    Box::new(LogPublisher::new())
}

pub(crate) fn create_metadata_fetcher(config: &Configuration) -> LibraryResult<Box<dyn MetadataFetcher>> {
    let fetcher = GoogleBooksFetcher::new(config.metadata_url.as_str(), config.fetch_timeout())?;
    Ok(Box::new(fetcher))
}
