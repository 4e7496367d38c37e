//! Result Renderer: total mapping from session state to what the viewport shows.

use crate::models::ResultRef;
use crate::session::asset::{AssetSlot, ImageAsset, PreviewId};
use crate::session::state::SessionPhase;

pub const PROGRESS_CAPTION: &str = "Analyzing with Sliding Window...";
pub const EMPTY_TITLE: &str = "Ready to Analyze";
pub const EMPTY_HINT: &str = "The uploaded image will be displayed here.";
pub const NO_PREVIEW_TITLE: &str = "Preview unavailable";

/// What the central viewport displays.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultView {
    /// Request in flight
    Progress { caption: &'static str },
    /// Annotated result plus confidence label
    Result {
        result: ResultRef,
        confidence_label: String,
    },
    /// Dimmed preview of the selected image
    Preview { preview: PreviewId, dimmed: bool },
    /// An image is selected but could not be decoded for display
    NoPreview {
        title: &'static str,
        file_name: String,
    },
    /// Nothing selected yet
    Empty {
        title: &'static str,
        hint: &'static str,
    },
}

pub fn render(phase: &SessionPhase, image: &AssetSlot<ImageAsset>) -> ResultView {
    match phase {
        SessionPhase::Submitting => ResultView::Progress {
            caption: PROGRESS_CAPTION,
        },
        SessionPhase::Succeeded { result, confidence } => ResultView::Result {
            result: result.clone(),
            confidence_label: format_confidence(*confidence),
        },
        // A failure is shown as an alert over the idle view.
        SessionPhase::Idle | SessionPhase::Failed { .. } => match (image.preview(), image.file()) {
            (Some(preview), _) => ResultView::Preview {
                preview,
                dimmed: true,
            },
            (None, Some(file)) => ResultView::NoPreview {
                title: NO_PREVIEW_TITLE,
                file_name: file.name.clone(),
            },
            (None, None) => ResultView::Empty {
                title: EMPTY_TITLE,
                hint: EMPTY_HINT,
            },
        },
    }
}

/// Two decimals, half away from zero, with a percent sign: `87.345` -> `"87.35%"`.
pub fn format_confidence(confidence: f64) -> String {
    let rounded = (confidence * 100.0).round() / 100.0;
    // -0.001 rounds to -0.0, which would print as "-0.00%"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{:.2}%", rounded)
}
