//! UI module: egui front end for the analysis session
//!
//! The session core knows nothing about egui. This module supplies the
//! texture-backed `PreviewStore`, the async bridge to the backend and the
//! panels that draw the controller's state.

pub mod app;
pub mod sidebar;
pub mod textures;
pub mod threading;
pub mod viewport;

pub use app::AppUI;
pub use textures::{ArtifactCache, ArtifactState, TexturePreviewStore};
pub use threading::{AsyncBridge, SessionEvent};
