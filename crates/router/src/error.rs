use crate::Verb;
use thiserror::Error;

pub type RouteResult<T> = Result<T, RouteError>;

/// Errors reported by route registration and dispatch.
///
/// `RouteNotFound` and `VerbNotImplemented` are ordinary negative dispatch outcomes, mapping them to a
/// status code is up to the server. The remaining variants are setup-time configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("route not found: {path}")]
    RouteNotFound { path: String },

    #[error("verb {verb} not implemented for route: {path}")]
    VerbNotImplemented { verb: Verb, path: String },

    #[error("duplicate registration: {verb} {path}")]
    DuplicateRegistration { verb: Verb, path: String },

    #[error("route path must not be empty")]
    EmptyPath,

    #[error("ambiguous capture in route {path}: '{conflicting}' conflicts with registered '{existing}'")]
    AmbiguousCapture { path: String, existing: String, conflicting: String },
}

impl RouteError {
    pub fn route_not_found<S: ToString>(path: S) -> Self {
        Self::RouteNotFound { path: path.to_string() }
    }

    pub fn verb_not_implemented<S: ToString>(verb: Verb, path: S) -> Self {
        Self::VerbNotImplemented { verb, path: path.to_string() }
    }

    pub fn duplicate_registration<S: ToString>(verb: Verb, path: S) -> Self {
        Self::DuplicateRegistration { verb, path: path.to_string() }
    }

    pub fn ambiguous_capture<P: ToString, E: ToString, C: ToString>(path: P, existing: E, conflicting: C) -> Self {
        Self::AmbiguousCapture { path: path.to_string(), existing: existing.to_string(), conflicting: conflicting.to_string() }
    }

    /// Returns true for the recoverable outcomes of dispatching a request
    pub fn is_dispatch_miss(&self) -> bool {
        matches!(self, Self::RouteNotFound { .. } | Self::VerbNotImplemented { .. })
    }
}
