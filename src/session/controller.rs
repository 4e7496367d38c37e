//! SessionController: the application-state object behind the analysis UI
//!
//! Owns the parameter store, both asset slots, the session phase and the
//! advisory queue. It is a synchronous state machine; the network call
//! happens outside (see `ui::threading`) and reports back via `complete`.
//!
//! ```text
//!            select asset              run (assets ok)
//!  Idle <------------------- Succeeded      |
//!   |  ^                        ^           v
//!   |  |  ack alert             |  ok   Submitting
//!   |  +------- Failed <--------+-------  |
//!   |                 err                 |
//!   +-------------------------------------+
//! ```

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{BackendError, SessionError};
use crate::models::{Advisory, AnalysisOutcome, AnalysisParameters, ParamField, ResultRef};
use crate::session::asset::{AssetSlot, ImageAsset, ModelAsset, PreviewStore, SelectedFile};
use crate::session::params::ParameterStore;
use crate::session::render::{self, ResultView};
use crate::session::request::{self, AnalysisRequest};
use crate::session::state::{CacheBuster, SessionPhase};

/// Central state manager for one analysis session.
#[derive(Debug)]
pub struct SessionController {
    /// Backend origin, e.g. `http://127.0.0.1:8000`
    origin: String,
    params: ParameterStore,
    model: AssetSlot<ModelAsset>,
    image: AssetSlot<ImageAsset>,
    phase: SessionPhase,
    cache_buster: CacheBuster,
    /// Blocking messages waiting to be shown, oldest first
    advisories: VecDeque<Advisory>,
}

impl SessionController {
    pub fn new(origin: impl Into<String>, previews: Arc<dyn PreviewStore>) -> Self {
        let origin = origin.into();
        log::info!("[Session] Controller created for backend {}", origin);
        SessionController {
            origin,
            params: ParameterStore::default(),
            model: AssetSlot::<ModelAsset>::new(),
            image: AssetSlot::with_previews(previews),
            phase: SessionPhase::Idle,
            cache_buster: CacheBuster::new(),
            advisories: VecDeque::new(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn model(&self) -> &AssetSlot<ModelAsset> {
        &self.model
    }

    pub fn image(&self) -> &AssetSlot<ImageAsset> {
        &self.image
    }

    // ------------------------------------------------------------------
    // Parameters
    // ------------------------------------------------------------------

    pub fn parameters(&self) -> AnalysisParameters {
        self.params.get()
    }

    pub fn set_parameter(&mut self, field: ParamField, raw: &str) -> i64 {
        self.params.set(field, raw)
    }

    // ------------------------------------------------------------------
    // Assets
    // ------------------------------------------------------------------

    pub fn select_model(&mut self, file: Option<SelectedFile>) {
        if self.model.select(file) {
            self.invalidate_result();
        }
    }

    pub fn select_image(&mut self, file: Option<SelectedFile>) {
        if self.image.select(file) {
            self.invalidate_result();
        }
    }

    /// Read a picked model file from disk. Read failures become a warning.
    pub fn select_model_path(&mut self, path: Option<PathBuf>) {
        let file = self.read_picked(path);
        self.select_model(file);
    }

    /// Read a picked image file from disk. Read failures become a warning.
    pub fn select_image_path(&mut self, path: Option<PathBuf>) {
        let file = self.read_picked(path);
        self.select_image(file);
    }

    fn read_picked(&mut self, path: Option<PathBuf>) -> Option<SelectedFile> {
        let path = path?;
        match SelectedFile::read(&path) {
            Ok(file) => Some(file),
            Err(e) => {
                log::warn!("[Session] {}", e);
                self.advisories.push_back(Advisory::warning(e.user_message()));
                None
            }
        }
    }

    /// Switching assets invalidates any prior result.
    fn invalidate_result(&mut self) {
        match self.phase {
            SessionPhase::Succeeded { .. } | SessionPhase::Failed { .. } => {
                log::debug!("[Session] Asset changed, {} -> idle", self.phase.as_str());
                self.phase = SessionPhase::Idle;
            }
            SessionPhase::Idle | SessionPhase::Submitting => {}
        }
    }

    // ------------------------------------------------------------------
    // Run / completion
    // ------------------------------------------------------------------

    /// Whether the run trigger should be enabled.
    pub fn can_run(&self) -> bool {
        !self.phase.is_submitting()
    }

    /// Guard and start a run. On success the session is `Submitting` and the
    /// caller must issue exactly one backend request with the returned payload.
    pub fn request_run(&mut self) -> Result<AnalysisRequest, SessionError> {
        if self.phase.is_submitting() {
            log::debug!("[Session] Run ignored: already submitting");
            return Err(SessionError::AlreadySubmitting);
        }

        let built = match (self.model.file(), self.image.file()) {
            (Some(model), Some(image)) => Ok(request::build(&self.params.get(), model, image)),
            (model, image) => Err(SessionError::MissingAssets {
                model_missing: model.is_none(),
                image_missing: image.is_none(),
            }),
        };
        let req = match built {
            Ok(req) => req,
            Err(err) => {
                log::warn!("[Session] Run blocked: {}", err);
                self.advisories.push_back(Advisory::warning(err.user_message()));
                return Err(err);
            }
        };

        log::info!(
            "[Session] Submitting analysis: model='{}' image='{}' params={:?}",
            req.model.file.name,
            req.image.file.name,
            req.scalars
        );
        self.phase = SessionPhase::Submitting;
        Ok(req)
    }

    /// Apply the backend's answer to the in-flight request.
    ///
    /// Completions that arrive outside `Submitting` are ignored.
    pub fn complete(&mut self, outcome: Result<AnalysisOutcome, BackendError>) -> &SessionPhase {
        if !self.phase.is_submitting() {
            log::warn!("[Session] Completion received in phase {}, ignoring", self.phase.as_str());
            return &self.phase;
        }

        self.phase = match outcome {
            Ok(outcome) => {
                let token = self.cache_buster.next_token();
                let result = ResultRef::new(&self.origin, &outcome.result_path, token);
                log::info!(
                    "[Session] Analysis succeeded: {} (confidence {:.2})",
                    result.url,
                    outcome.confidence
                );
                SessionPhase::Succeeded {
                    result,
                    confidence: outcome.confidence,
                }
            }
            Err(e) => {
                log::error!("[Session] Analysis failed: {}", e);
                let message = e.user_message();
                self.advisories.push_back(Advisory::error(message.clone()));
                SessionPhase::Failed { message }
            }
        };
        &self.phase
    }

    /// The failure alert has been shown; return to `Idle`.
    pub fn acknowledge_failure(&mut self) {
        if let SessionPhase::Failed { .. } = self.phase {
            self.phase = SessionPhase::Idle;
        }
    }

    /// Result of the "open result folder" side action. Never touches the phase.
    pub fn folder_opened(&mut self, result: Result<(), BackendError>) {
        match result {
            Ok(()) => log::info!("[Session] Result folder opened"),
            Err(e) => {
                log::warn!("[Session] Could not open result folder: {}", e);
                self.advisories
                    .push_back(Advisory::error("Could not open the result folder."));
            }
        }
    }

    // ------------------------------------------------------------------
    // Advisories
    // ------------------------------------------------------------------

    /// Oldest advisory not yet dismissed.
    pub fn pending_advisory(&self) -> Option<&Advisory> {
        self.advisories.front()
    }

    /// Dismiss the current advisory. Once the queue is empty a pending
    /// failure is acknowledged too.
    pub fn dismiss_advisory(&mut self) -> Option<Advisory> {
        let dismissed = self.advisories.pop_front();
        if self.advisories.is_empty() {
            self.acknowledge_failure();
        }
        dismissed
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    pub fn view(&self) -> ResultView {
        render::render(&self.phase, &self.image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::asset::tests::RecordingStore;

    const ORIGIN: &str = "http://127.0.0.1:8000";

    fn controller() -> (SessionController, Arc<RecordingStore>) {
        let store = Arc::new(RecordingStore::default());
        (SessionController::new(ORIGIN, store.clone()), store)
    }

    fn file(name: &str) -> Option<SelectedFile> {
        Some(SelectedFile::from_bytes(name, vec![7u8; 8]))
    }

    fn success(path: &str, confidence: f64) -> Result<AnalysisOutcome, BackendError> {
        Ok(AnalysisOutcome {
            result_path: path.to_string(),
            confidence,
        })
    }

    #[test]
    fn test_run_without_model_is_blocked() {
        let (mut c, _) = controller();
        c.select_image(file("i.png"));

        let err = c.request_run().unwrap_err();
        assert_eq!(
            err,
            SessionError::MissingAssets {
                model_missing: true,
                image_missing: false
            }
        );
        assert_eq!(c.phase(), &SessionPhase::Idle);
        assert!(c.pending_advisory().is_some());
    }

    #[test]
    fn test_second_run_while_submitting_rejected() {
        let (mut c, _) = controller();
        c.select_model(file("m.pt"));
        c.select_image(file("i.png"));

        assert!(c.request_run().is_ok());
        assert!(!c.can_run());
        assert_eq!(c.request_run().unwrap_err(), SessionError::AlreadySubmitting);
        assert!(c.pending_advisory().is_none());
    }

    #[test]
    fn test_success_then_asset_change_clears_result() {
        let (mut c, _) = controller();
        c.select_model(file("m.pt"));
        c.select_image(file("i.png"));
        c.request_run().unwrap();
        c.complete(success("out\\x.png", 87.345));

        let result = c.phase().result().unwrap().clone();
        assert_eq!(result.path, "out/x.png");
        assert!(result.url.starts_with("http://127.0.0.1:8000/out/x.png?t="));

        c.select_model(file("other.pt"));
        assert_eq!(c.phase(), &SessionPhase::Idle);
        assert!(c.phase().confidence().is_none());
    }

    #[test]
    fn test_failure_then_asset_change_returns_to_idle() {
        let (mut c, _) = controller();
        c.select_model(file("m.pt"));
        c.select_image(file("i.png"));
        c.request_run().unwrap();
        c.complete(Err(BackendError::HttpStatus(502)));
        assert!(matches!(c.phase(), SessionPhase::Failed { .. }));

        c.select_model(file("other.pt"));
        assert_eq!(c.phase(), &SessionPhase::Idle);
        assert!(c.phase().result().is_none());
        // The alert is still queued until the user dismisses it
        assert!(c.pending_advisory().is_some());
    }

    #[test]
    fn test_cancelled_pick_keeps_result() {
        let (mut c, _) = controller();
        c.select_model(file("m.pt"));
        c.select_image(file("i.png"));
        c.request_run().unwrap();
        c.complete(success("out/x.png", 10.0));

        c.select_image(None);
        assert!(c.phase().result().is_some());
    }

    #[test]
    fn test_successive_successes_get_distinct_tokens() {
        let (mut c, _) = controller();
        c.select_model(file("m.pt"));
        c.select_image(file("i.png"));

        c.request_run().unwrap();
        c.complete(success("out\\x.png", 1.0));
        let first = c.phase().result().unwrap().clone();

        c.request_run().unwrap();
        c.complete(success("out\\x.png", 2.0));
        let second = c.phase().result().unwrap().clone();

        assert_eq!(first.path, second.path);
        assert_ne!(first.token, second.token);
        assert_ne!(first.url, second.url);
    }

    #[test]
    fn test_failure_then_acknowledge() {
        let (mut c, _) = controller();
        c.select_model(file("m.pt"));
        c.select_image(file("i.png"));
        c.request_run().unwrap();

        let phase = c.complete(Err(BackendError::Transport("refused".to_string())));
        assert!(matches!(phase, SessionPhase::Failed { .. }));
        assert!(c.phase().result().is_none());

        let advisory = c.dismiss_advisory().unwrap();
        assert_eq!(advisory.severity, crate::models::Severity::Error);
        assert_eq!(c.phase(), &SessionPhase::Idle);
    }

    #[test]
    fn test_run_allowed_from_failed() {
        let (mut c, _) = controller();
        c.select_model(file("m.pt"));
        c.select_image(file("i.png"));
        c.request_run().unwrap();
        c.complete(Err(BackendError::HttpStatus(500)));

        assert!(c.request_run().is_ok());
        assert!(c.phase().is_submitting());
    }

    #[test]
    fn test_stray_completion_ignored() {
        let (mut c, _) = controller();
        c.complete(success("out/x.png", 1.0));
        assert_eq!(c.phase(), &SessionPhase::Idle);
    }

    #[test]
    fn test_asset_change_during_submit_keeps_submitting() {
        let (mut c, store) = controller();
        c.select_model(file("m.pt"));
        c.select_image(file("i.png"));
        c.request_run().unwrap();

        c.select_image(file("j.png"));
        assert!(c.phase().is_submitting());
        assert_eq!(store.released.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_folder_failure_does_not_touch_phase() {
        let (mut c, _) = controller();
        c.folder_opened(Err(BackendError::HttpStatus(404)));
        assert_eq!(c.phase(), &SessionPhase::Idle);
        assert!(c.pending_advisory().is_some());

        c.folder_opened(Ok(()));
        c.dismiss_advisory();
        assert!(c.pending_advisory().is_none());
    }

    #[test]
    fn test_unreadable_pick_is_noop_with_warning() {
        let (mut c, _) = controller();
        c.select_model_path(Some(PathBuf::from("/no/such/model.pt")));
        assert!(!c.model().is_selected());
        assert_eq!(
            c.pending_advisory().map(|a| a.severity),
            Some(crate::models::Severity::Warning)
        );
    }

    #[test]
    fn test_teardown_releases_preview() {
        let (mut c, store) = controller();
        c.select_image(file("i.png"));
        assert_eq!(store.live.lock().unwrap().len(), 1);
        drop(c);
        assert!(store.live.lock().unwrap().is_empty());
    }
}
