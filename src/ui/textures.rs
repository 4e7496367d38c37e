//! Texture management for previews and result artifacts
//!
//! - `TexturePreviewStore`: egui-texture implementation of `PreviewStore`.
//!   Dropping the last `TextureHandle` frees the GPU texture, so `release`
//!   only has to forget the handle.
//! - `ArtifactCache`: the texture of the current result, keyed by the full
//!   cache-busted URL so an older artifact is never shown for a newer run.

use eframe::egui;
use egui::{ColorImage, TextureHandle, TextureOptions};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::error::BackendError;
use crate::models::ResultRef;
use crate::session::{PreviewId, PreviewStore, SelectedFile};

/// Decode encoded image bytes (PNG, JPEG, ...) into an egui image
pub fn decode_color_image(bytes: &[u8]) -> Result<ColorImage, String> {
    let img = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
    let size = [img.width() as usize, img.height() as usize];
    let rgba = img.to_rgba8();
    let pixels = rgba.as_flat_samples();
    Ok(ColorImage::from_rgba_unmultiplied(size, pixels.as_slice()))
}

/// Preview textures for the image slot
pub struct TexturePreviewStore {
    ctx: egui::Context,
    next_id: AtomicU64,
    textures: Mutex<HashMap<PreviewId, TextureHandle>>,
}

impl TexturePreviewStore {
    pub fn new(ctx: egui::Context) -> Self {
        Self {
            ctx,
            next_id: AtomicU64::new(1),
            textures: Mutex::new(HashMap::new()),
        }
    }

    /// Texture for a live preview
    pub fn texture(&self, id: PreviewId) -> Option<TextureHandle> {
        self.textures.lock().ok().and_then(|map| map.get(&id).cloned())
    }

    /// Number of live preview textures
    pub fn live_count(&self) -> usize {
        self.textures.lock().map(|map| map.len()).unwrap_or(0)
    }
}

impl PreviewStore for TexturePreviewStore {
    fn acquire(&self, file: &SelectedFile) -> Result<PreviewId, String> {
        let image = decode_color_image(&file.bytes)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = self
            .ctx
            .load_texture(format!("preview-{}-{}", id, file.name), image, TextureOptions::LINEAR);
        self.textures
            .lock()
            .map_err(|e| format!("Preview store poisoned: {}", e))?
            .insert(id, handle);
        log::debug!("[UI] Preview texture {} created for '{}'", id, file.name);
        Ok(id)
    }

    fn release(&self, id: PreviewId) {
        if let Ok(mut map) = self.textures.lock() {
            if map.remove(&id).is_none() {
                log::warn!("[UI] Release of unknown preview texture {}", id);
            }
        }
    }
}

/// Loading state of the current result artifact
#[derive(Clone)]
pub enum ArtifactState {
    Loading,
    Ready(TextureHandle),
    Failed(String),
}

/// Holds at most one result texture: the one for the current `ResultRef`
#[derive(Default)]
pub struct ArtifactCache {
    current: Option<(String, ArtifactState)>,
}

impl ArtifactCache {
    /// Track `result`. Returns `true` when a fetch must be started for it.
    pub fn begin(&mut self, result: &ResultRef) -> bool {
        match &self.current {
            Some((url, _)) if *url == result.url => false,
            _ => {
                self.current = Some((result.url.clone(), ArtifactState::Loading));
                true
            }
        }
    }

    /// Store the fetched bytes. Answers for a superseded URL are dropped.
    pub fn finish(&mut self, ctx: &egui::Context, url: &str, bytes: Result<Vec<u8>, BackendError>) {
        let Some((current_url, state)) = self.current.as_mut() else {
            return;
        };
        if current_url.as_str() != url {
            log::debug!("[UI] Dropping stale artifact {}", url);
            return;
        }
        *state = match bytes.map_err(|e| e.to_string()).and_then(|b| decode_color_image(&b)) {
            Ok(image) => ArtifactState::Ready(ctx.load_texture(url, image, TextureOptions::LINEAR)),
            Err(e) => {
                log::warn!("[UI] Could not load result artifact {}: {}", url, e);
                ArtifactState::Failed(e)
            }
        };
    }

    pub fn state(&self, url: &str) -> Option<&ArtifactState> {
        match &self.current {
            Some((current_url, state)) if current_url == url => Some(state),
            _ => None,
        }
    }

    /// Forget the current artifact (session left `Succeeded`)
    pub fn clear(&mut self) {
        self.current = None;
    }
}
