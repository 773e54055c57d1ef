use std::sync::Arc;
use axum::http::StatusCode;
use tracing::{error, warn};
use crate::catalog::domain::CatalogService;
use crate::core::command::CommandError;
use crate::core::library::LibraryError;

// AppState carries the catalog opened at startup to every handler
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) catalog: Arc<dyn CatalogService>,
}

impl AppState {
    pub fn new(catalog: Arc<dyn CatalogService>) -> AppState {
        AppState {
            catalog,
        }
    }
}

pub(crate) type ServerError = (StatusCode, String);

pub fn json_to_server_error(err: serde_json::Error) -> ServerError {
    ServerError::from(CommandError::from(LibraryError::from(err)))
}

impl From<CommandError> for ServerError {
    fn from(err: CommandError) -> Self {
        let status = match err {
            CommandError::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            CommandError::DuplicateKey { .. } => StatusCode::CONFLICT,
            CommandError::NotFound { .. } => StatusCode::NOT_FOUND,
            CommandError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            CommandError::Runtime { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            CommandError::Serialization { .. } => StatusCode::BAD_REQUEST,
            CommandError::Validation { .. } => StatusCode::BAD_REQUEST,
        };
        if status.is_server_error() {
            error!(status = status.as_u16(), "request failed: {}", err);
        } else {
            warn!(status = status.as_u16(), "request rejected: {}", err);
        }
        (status, err.to_string())
    }
}
