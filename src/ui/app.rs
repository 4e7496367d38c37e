//! Main app orchestrator
//!
//! Owns the `SessionController` (single writer), drains `SessionEvent`s at
//! the top of every frame and delegates drawing to `sidebar` and `viewport`.

use std::collections::HashMap;
use std::sync::Arc;

use eframe::egui;
use tokio::sync::mpsc;

use crate::backend::AnalysisBackend;
use crate::config::ClientSettings;
use crate::models::{ParamField, Severity};
use crate::session::{SessionController, SessionPhase};
use crate::ui::textures::{ArtifactCache, TexturePreviewStore};
use crate::ui::threading::{AsyncBridge, SessionEvent};

/// Main application UI structure
pub struct AppUI {
    pub controller: SessionController,
    bridge: AsyncBridge,
    event_rx: mpsc::Receiver<SessionEvent>,
    pub(crate) previews: Arc<TexturePreviewStore>,
    pub(crate) artifacts: ArtifactCache,
    /// Raw text of each parameter entry, normalized when focus leaves it
    pub(crate) param_inputs: HashMap<ParamField, String>,
    ctx_handle: egui::Context,
}

impl AppUI {
    pub fn new(ctx: egui::Context, settings: &ClientSettings, backend: Arc<dyn AnalysisBackend>) -> Self {
        ctx.set_visuals(egui::Visuals::dark());

        let previews = Arc::new(TexturePreviewStore::new(ctx.clone()));
        let controller = SessionController::new(settings.backend_url.clone(), previews.clone());
        let (bridge, event_rx) = AsyncBridge::new(backend);

        let params = controller.parameters();
        let param_inputs = ParamField::ALL
            .iter()
            .map(|&field| (field, params.value(field).to_string()))
            .collect();

        log::info!("[UI] Session started against {}", controller.origin());

        Self {
            controller,
            bridge,
            event_rx,
            previews,
            artifacts: ArtifactCache::default(),
            param_inputs,
            ctx_handle: ctx,
        }
    }

    /// Apply every completion that arrived since the last frame
    fn process_session_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                SessionEvent::AnalysisFinished(outcome) => {
                    self.controller.complete(outcome);
                }
                SessionEvent::FolderOpened(result) => {
                    self.controller.folder_opened(result);
                }
                SessionEvent::ArtifactLoaded { url, result } => {
                    self.artifacts.finish(&self.ctx_handle, &url, result);
                }
            }
        }
    }

    /// Keep the artifact texture in step with the session phase
    fn sync_artifact(&mut self) {
        match self.controller.phase() {
            SessionPhase::Succeeded { result, .. } => {
                if self.artifacts.begin(result) {
                    self.bridge.spawn_artifact_fetch(result, Some(self.ctx_handle.clone()));
                }
            }
            _ => self.artifacts.clear(),
        }
    }

    /// Run trigger. Guard failures are already queued as advisories.
    pub(crate) fn start_run(&mut self) {
        if let Ok(request) = self.controller.request_run() {
            self.bridge.spawn_analysis(request, Some(self.ctx_handle.clone()));
        }
    }

    pub(crate) fn open_result_folder(&self) {
        log::info!("[UI] Requesting backend to open the result folder");
        self.bridge.spawn_open_folder(Some(self.ctx_handle.clone()));
    }

    /// Modal alert for the oldest advisory
    fn render_alert(&mut self, ctx: &egui::Context) {
        let Some(advisory) = self.controller.pending_advisory() else {
            return;
        };
        let (title, color) = match advisory.severity {
            Severity::Warning => ("Warning", egui::Color32::from_rgb(230, 180, 60)),
            Severity::Error => ("Error", egui::Color32::from_rgb(230, 80, 80)),
        };
        let message = advisory.message.clone();

        let mut dismissed = false;
        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.colored_label(color, message);
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    if ui.button("OK").clicked() {
                        dismissed = true;
                    }
                });
            });

        if dismissed {
            self.controller.dismiss_advisory();
        }
    }
}

impl eframe::App for AppUI {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_session_events();
        self.sync_artifact();

        let blocked = self.controller.pending_advisory().is_some();

        super::sidebar::render_sidebar(ctx, self, !blocked);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!blocked, |ui| {
                let view = self.controller.view();
                super::viewport::render_viewport(ui, &view, &self.previews, &self.artifacts);
            });
        });

        self.render_alert(ctx);

        // Keep the spinner moving while a request is in flight
        if self.controller.phase().is_submitting() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}
