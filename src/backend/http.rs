//! reqwest implementation of `AnalysisBackend`.

use futures::future::{BoxFuture, FutureExt};
use serde::Deserialize;

use super::AnalysisBackend;
use crate::error::BackendError;
use crate::models::{AnalysisOutcome, AnalysisResponse, ResultRef};
use crate::session::AnalysisRequest;

/// Body of `/api/open-folder`. Older backends return nothing useful, so
/// both fields are optional.
#[derive(Debug, Default, Deserialize)]
struct FolderResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// HTTP client for the analysis backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    origin: String,
}

impl HttpBackend {
    pub fn new(origin: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), origin)
    }

    pub fn with_client(client: reqwest::Client, origin: impl Into<String>) -> Self {
        let origin = origin.into().trim_end_matches('/').to_string();
        HttpBackend { client, origin }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.origin, path)
    }
}

impl AnalysisBackend for HttpBackend {
    fn analyze(&self, request: AnalysisRequest) -> BoxFuture<'static, Result<AnalysisOutcome, BackendError>> {
        let client = self.client.clone();
        let url = self.endpoint("analyze");
        async move {
            log::debug!("[Backend] POST {}", url);
            let response = client.post(&url).multipart(request.into_form()).send().await?;

            let status = response.status();
            if !status.is_success() {
                return Err(BackendError::HttpStatus(status.as_u16()));
            }

            let body: AnalysisResponse = response
                .json()
                .await
                .map_err(|e| BackendError::UnexpectedResponse(e.to_string()))?;
            log::debug!("[Backend] analyze response: {:?}", body);
            body.into_outcome()
        }
        .boxed()
    }

    fn open_folder(&self) -> BoxFuture<'static, Result<(), BackendError>> {
        let client = self.client.clone();
        let url = self.endpoint("open-folder");
        async move {
            log::debug!("[Backend] POST {}", url);
            let response = client.post(&url).send().await?;

            let status = response.status();
            if !status.is_success() {
                return Err(BackendError::HttpStatus(status.as_u16()));
            }

            let text = response.text().await?;
            let body: FolderResponse = serde_json::from_str(&text).unwrap_or_default();
            match body.status.as_deref() {
                Some("error") => Err(BackendError::Rejected(
                    body.message.unwrap_or_else(|| "open-folder failed".to_string()),
                )),
                _ => Ok(()),
            }
        }
        .boxed()
    }

    fn fetch_artifact(&self, result: &ResultRef) -> BoxFuture<'static, Result<Vec<u8>, BackendError>> {
        let client = self.client.clone();
        let url = result.url.clone();
        async move {
            log::debug!("[Backend] GET {}", url);
            let response = client.get(&url).send().await?;

            let status = response.status();
            if !status.is_success() {
                return Err(BackendError::HttpStatus(status.as_u16()));
            }

            let bytes = response.bytes().await?;
            Ok(bytes.to_vec())
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let backend = HttpBackend::new("http://127.0.0.1:8000/");
        assert_eq!(backend.origin(), "http://127.0.0.1:8000");
        assert_eq!(backend.endpoint("analyze"), "http://127.0.0.1:8000/api/analyze");
    }

    #[test]
    fn test_folder_response_tolerates_non_json() {
        let body: FolderResponse = serde_json::from_str("null").unwrap_or_default();
        assert!(body.status.is_none());
    }
}
