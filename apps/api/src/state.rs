use std::sync::Arc;

use crate::analysis::error::ServiceError;
use crate::analysis::Services;

/// Outcome of the one-time collaborator initialization.
pub enum Readiness {
    Ready(Services),
    Unavailable { reason: String },
}

impl Readiness {
    pub fn from_init(result: Result<Services, ServiceError>) -> Self {
        match result {
            Ok(services) => Readiness::Ready(services),
            Err(e) => {
                let reason = e.to_string();
                Readiness::Unavailable {
                    reason: if reason.is_empty() {
                        "unknown initialization error".to_string()
                    } else {
                        reason
                    },
                }
            }
        }
    }

    pub fn initialization_error(&self) -> Option<&str> {
        match self {
            Readiness::Ready(_) => None,
            Readiness::Unavailable { reason } => Some(reason.as_str()),
        }
    }
}

/// Shared application state injected into all route handlers via Axum extractors.
/// Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub readiness: Arc<Readiness>,
}

impl AppState {
    pub fn new(readiness: Readiness) -> Self {
        Self {
            readiness: Arc::new(readiness),
        }
    }
}
