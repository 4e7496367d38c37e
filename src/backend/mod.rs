//! Analysis backend collaborator
//!
//! The backend performs the sliding-window inference; the client only talks to
//! it. `AnalysisBackend` is the seam between the session and the network so
//! the UI bridge can be driven by a fake in tests.

pub mod http;

use futures::future::BoxFuture;

use crate::error::BackendError;
use crate::models::{AnalysisOutcome, ResultRef};
use crate::session::AnalysisRequest;

pub use http::HttpBackend;

/// Trait for the remote analysis service
pub trait AnalysisBackend: Send + Sync {
    /// `POST /api/analyze` with the multipart payload.
    fn analyze(&self, request: AnalysisRequest) -> BoxFuture<'static, Result<AnalysisOutcome, BackendError>>;

    /// `POST /api/open-folder`: ask the backend to reveal its output directory.
    fn open_folder(&self) -> BoxFuture<'static, Result<(), BackendError>>;

    /// `GET` the cache-busted result artifact.
    fn fetch_artifact(&self, result: &ResultRef) -> BoxFuture<'static, Result<Vec<u8>, BackendError>>;
}
