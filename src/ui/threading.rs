//! Threading and async integration helpers
//!
//! Backend calls run as tokio tasks and report back as `SessionEvent`s. The
//! UI thread drains the receiver every frame, so the `SessionController`
//! only ever has a single writer.

use std::sync::Arc;

use eframe::egui;
use tokio::sync::mpsc;

use crate::backend::AnalysisBackend;
use crate::error::BackendError;
use crate::models::{AnalysisOutcome, ResultRef};
use crate::session::AnalysisRequest;

/// Completion messages from background tasks
#[derive(Debug)]
pub enum SessionEvent {
    AnalysisFinished(Result<AnalysisOutcome, BackendError>),
    FolderOpened(Result<(), BackendError>),
    ArtifactLoaded {
        url: String,
        result: Result<Vec<u8>, BackendError>,
    },
}

/// Spawns backend work and funnels its results into one channel
pub struct AsyncBridge {
    event_tx: mpsc::Sender<SessionEvent>,
    backend: Arc<dyn AnalysisBackend>,
}

impl AsyncBridge {
    pub fn new(backend: Arc<dyn AnalysisBackend>) -> (Self, mpsc::Receiver<SessionEvent>) {
        let (event_tx, event_rx) = mpsc::channel(32);
        (Self { event_tx, backend }, event_rx)
    }

    /// Submit an analysis. Exactly one `AnalysisFinished` follows.
    pub fn spawn_analysis(&self, request: AnalysisRequest, ctx: Option<egui::Context>) -> tokio::task::JoinHandle<()> {
        let fut = self.backend.analyze(request);
        spawn_monitored_task("analyze", self.event_tx.clone(), ctx, async move {
            SessionEvent::AnalysisFinished(fut.await)
        })
    }

    pub fn spawn_open_folder(&self, ctx: Option<egui::Context>) -> tokio::task::JoinHandle<()> {
        let fut = self.backend.open_folder();
        spawn_monitored_task("open-folder", self.event_tx.clone(), ctx, async move {
            SessionEvent::FolderOpened(fut.await)
        })
    }

    pub fn spawn_artifact_fetch(&self, result: &ResultRef, ctx: Option<egui::Context>) -> tokio::task::JoinHandle<()> {
        let fut = self.backend.fetch_artifact(result);
        let url = result.url.clone();
        spawn_monitored_task("fetch-artifact", self.event_tx.clone(), ctx, async move {
            SessionEvent::ArtifactLoaded { url, result: fut.await }
        })
    }
}

/// Run `fut` on the tokio runtime, forward its event and wake the UI
pub fn spawn_monitored_task<Fut>(
    name: &'static str,
    tx: mpsc::Sender<SessionEvent>,
    ctx: Option<egui::Context>,
    fut: Fut,
) -> tokio::task::JoinHandle<()>
where
    Fut: std::future::Future<Output = SessionEvent> + Send + 'static,
{
    tokio::spawn(async move {
        let event = fut.await;
        log::debug!("[Bridge] Task '{}' finished", name);
        if tx.send(event).await.is_err() {
            log::warn!("[Bridge] Task '{}' finished after the UI went away", name);
        }
        request_ui_repaint(ctx.as_ref());
    })
}

/// Request UI repaint from a background thread
pub fn request_ui_repaint(ctx: Option<&egui::Context>) {
    if let Some(c) = ctx {
        c.request_repaint();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnalysisParameters;
    use crate::session::{request, SelectedFile};
    use futures::future::{BoxFuture, FutureExt};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingBackend {
        analyze_calls: AtomicUsize,
    }

    impl AnalysisBackend for CountingBackend {
        fn analyze(&self, request: AnalysisRequest) -> BoxFuture<'static, Result<AnalysisOutcome, BackendError>> {
            self.analyze_calls.fetch_add(1, Ordering::SeqCst);
            let stride = request.scalar("stride").map(str::to_string);
            async move {
                assert_eq!(stride.as_deref(), Some("50"));
                Ok(AnalysisOutcome {
                    result_path: "out/r.png".to_string(),
                    confidence: 91.0,
                })
            }
            .boxed()
        }

        fn open_folder(&self) -> BoxFuture<'static, Result<(), BackendError>> {
            async { Err(BackendError::Rejected("no display".to_string())) }.boxed()
        }

        fn fetch_artifact(&self, _result: &ResultRef) -> BoxFuture<'static, Result<Vec<u8>, BackendError>> {
            async { Ok(vec![1, 2, 3]) }.boxed()
        }
    }

    fn sample_request() -> AnalysisRequest {
        let model = SelectedFile::from_bytes("m.pt", b"weights".to_vec());
        let image = SelectedFile::from_bytes("i.png", b"pixels".to_vec());
        request::build(&AnalysisParameters::default(), &model, &image)
    }

    #[tokio::test]
    async fn test_analysis_round_trip() {
        let backend = Arc::new(CountingBackend::default());
        let (bridge, mut rx) = AsyncBridge::new(backend.clone());

        bridge.spawn_analysis(sample_request(), None).await.unwrap();

        match rx.recv().await {
            Some(SessionEvent::AnalysisFinished(Ok(outcome))) => {
                assert_eq!(outcome.result_path, "out/r.png");
            }
            other => panic!("Unexpected event: {:?}", other),
        }
        assert_eq!(backend.analyze_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_open_folder_and_artifact_events() {
        let (bridge, mut rx) = AsyncBridge::new(Arc::new(CountingBackend::default()));

        bridge.spawn_open_folder(None).await.unwrap();
        assert!(matches!(
            rx.recv().await,
            Some(SessionEvent::FolderOpened(Err(BackendError::Rejected(_))))
        ));

        let result = ResultRef::new("http://h", "out/r.png", 7);
        bridge.spawn_artifact_fetch(&result, None).await.unwrap();
        match rx.recv().await {
            Some(SessionEvent::ArtifactLoaded { url, result: Ok(bytes) }) => {
                assert_eq!(url, "http://h/out/r.png?t=7");
                assert_eq!(bytes, vec![1, 2, 3]);
            }
            other => panic!("Unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_late_event_after_receiver_dropped() {
        let (bridge, rx) = AsyncBridge::new(Arc::new(CountingBackend::default()));
        drop(rx);
        // Must not panic
        bridge.spawn_open_folder(None).await.unwrap();
    }
}
