//! ScanCAM client
//!
//! Desktop client for a sliding-window Grad-CAM analysis service. The user
//! picks a model file and an image, tunes the window parameters, submits
//! them to the backend and views the annotated result.
//!
//! The crate is organized into functional modules:
//! - **error**: Unified error type hierarchy
//! - **models**: Parameters, backend response shapes, result references
//! - **session**: The analysis session core (params, assets, request, controller, renderer)
//! - **backend**: `AnalysisBackend` trait and its reqwest implementation
//! - **config**: Startup settings
//! - **log_collector**: Non-blocking log persistence
//! - **ui**: egui front end

// Core foundational modules
pub mod error;
pub mod models;

// Analysis session core (no UI dependencies)
pub mod session;

// Remote analysis service
pub mod backend;

pub mod config;

// Robust, decoupled logging system
pub mod log_collector;

// egui integration
pub mod ui;

// Re-export the log crate for macro usage
pub use log;

pub use log_collector::{LogCollector, LogLine};

// ============================================================================
// PUBLIC RE-EXPORTS FOR CONVENIENCE
// ============================================================================

pub use error::{AssetError, BackendError, ConfigError, Result, SessionError};

pub use models::{
    Advisory, AnalysisOutcome, AnalysisParameters, AnalysisResponse, ParamField, ResultRef, Severity,
};

pub use session::{
    AnalysisRequest, AssetSlot, ImageAsset, ModelAsset, PreviewStore, ResultView, SelectedFile,
    SessionController, SessionPhase,
};

pub use backend::{AnalysisBackend, HttpBackend};

pub use config::{ClientSettings, SettingsManager};

pub use ui::AppUI;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Main window title
pub const APP_TITLE: &str = "ScanCAM - Sliding Window Grad-CAM Analyzer";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert_eq!(VERSION, "0.1.0");
    }

    #[test]
    fn test_error_reexport() {
        let _: Result<i32> = Ok(42);
        let _ = BackendError::HttpStatus(500);
    }

    #[test]
    fn test_models_reexport() {
        let params = AnalysisParameters::default();
        assert_eq!(params.value(ParamField::WindowSize), 100);
        assert_eq!(SessionPhase::default(), SessionPhase::Idle);
    }
}
