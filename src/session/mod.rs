//! Analysis Session core.
//!
//! - `params`: Parameter Store with lenient integer coercion
//! - `asset`: Asset Slots and the preview lease lifecycle
//! - `request`: Request Builder (multipart snapshot)
//! - `state`: session phase and cache-busting tokens
//! - `controller`: the state machine tying it together
//! - `render`: pure state -> view mapping

pub mod asset;
pub mod controller;
pub mod params;
pub mod render;
pub mod request;
pub mod state;

pub use asset::{AssetSlot, ImageAsset, ModelAsset, PreviewId, PreviewLease, PreviewStore, SelectedFile};
pub use controller::SessionController;
pub use params::ParameterStore;
pub use render::{format_confidence, ResultView};
pub use request::AnalysisRequest;
pub use state::{CacheBuster, SessionPhase};
