use crate::key::ComponentKey;
use std::sync::Arc;
use thiserror::Error;

/// Shared pointer for application-level errors raised by component factories.
pub type ErrorPtr = Arc<dyn std::error::Error + Send + Sync>;

/// Errors raised while composing a container or decorating component
/// adapters. Composition errors surface immediately to the composing caller
/// and are never retried.
#[derive(Error, Clone, Debug)]
pub enum CompositionError {
    #[error("cannot proxy implementation '{implementation}' - it declares no capability contracts")]
    NoContracts { implementation: &'static str },
    #[error("a component is already registered for key {0}")]
    DuplicateKey(ComponentKey),
}

/// Errors raised while resolving component instances. Resolution failures
/// propagate synchronously on the calling thread and are never cached, so a
/// later call may retry.
#[derive(Error, Clone, Debug)]
pub enum ResolutionError {
    #[error("no component registered for key {0}")]
    UnknownKey(ComponentKey),
    #[error("component registered for key {0} cannot be resolved as the requested type")]
    IncompatibleKey(ComponentKey),
    #[error("resolution context for component {0} is no longer available")]
    ContextUnavailable(ComponentKey),
    #[error("cannot construct component {key}: {source}")]
    Construction {
        key: ComponentKey,
        #[source]
        source: ErrorPtr,
    },
}

impl ResolutionError {
    /// Wraps an application-level construction failure for the given
    /// component. The original error stays reachable through
    /// [source](std::error::Error::source).
    pub fn construction<E: std::error::Error + Send + Sync + 'static>(
        key: ComponentKey,
        error: E,
    ) -> Self {
        Self::Construction {
            key,
            source: Arc::new(error),
        }
    }
}
