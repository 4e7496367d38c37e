//! Core data types for ScanCAM.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::BackendError;

/// Sliding-window analysis configuration sent with every run.
///
/// All fields are plain integers. Range checks are left to the backend, so
/// negative margins or a stride larger than the window are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisParameters {
    pub target_class: i64,
    pub window_size: i64,
    pub stride: i64,
    pub margin_top: i64,
    pub margin_bottom: i64,
    pub margin_left: i64,
    pub margin_right: i64,
}

impl Default for AnalysisParameters {
    fn default() -> Self {
        AnalysisParameters {
            target_class: 0,
            window_size: 100,
            stride: 50,
            margin_top: 20,
            margin_bottom: 20,
            margin_left: 20,
            margin_right: 20,
        }
    }
}

impl AnalysisParameters {
    /// Read a single field.
    pub fn value(&self, field: ParamField) -> i64 {
        match field {
            ParamField::TargetClass => self.target_class,
            ParamField::WindowSize => self.window_size,
            ParamField::Stride => self.stride,
            ParamField::MarginTop => self.margin_top,
            ParamField::MarginBottom => self.margin_bottom,
            ParamField::MarginLeft => self.margin_left,
            ParamField::MarginRight => self.margin_right,
        }
    }

    /// Replace a single field, leaving the others untouched.
    pub fn set_value(&mut self, field: ParamField, value: i64) {
        let slot = match field {
            ParamField::TargetClass => &mut self.target_class,
            ParamField::WindowSize => &mut self.window_size,
            ParamField::Stride => &mut self.stride,
            ParamField::MarginTop => &mut self.margin_top,
            ParamField::MarginBottom => &mut self.margin_bottom,
            ParamField::MarginLeft => &mut self.margin_left,
            ParamField::MarginRight => &mut self.margin_right,
        };
        *slot = value;
    }
}

/// Identifies one of the seven scalar analysis parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamField {
    TargetClass,
    WindowSize,
    Stride,
    MarginTop,
    MarginBottom,
    MarginLeft,
    MarginRight,
}

impl ParamField {
    /// All fields in wire order.
    pub const ALL: [ParamField; 7] = [
        ParamField::TargetClass,
        ParamField::WindowSize,
        ParamField::Stride,
        ParamField::MarginTop,
        ParamField::MarginBottom,
        ParamField::MarginLeft,
        ParamField::MarginRight,
    ];

    /// Multipart form field name expected by `/api/analyze`.
    pub fn form_name(&self) -> &'static str {
        match self {
            ParamField::TargetClass => "target_id",
            ParamField::WindowSize => "window_size",
            ParamField::Stride => "stride",
            ParamField::MarginTop => "m_top",
            ParamField::MarginBottom => "m_bottom",
            ParamField::MarginLeft => "m_left",
            ParamField::MarginRight => "m_right",
        }
    }

    /// Label shown next to the entry widget.
    pub fn label(&self) -> &'static str {
        match self {
            ParamField::TargetClass => "Target Class ID",
            ParamField::WindowSize => "Window Size",
            ParamField::Stride => "Stride",
            ParamField::MarginTop => "Margin Top",
            ParamField::MarginBottom => "Margin Bottom",
            ParamField::MarginLeft => "Margin Left",
            ParamField::MarginRight => "Margin Right",
        }
    }
}

impl fmt::Display for ParamField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.form_name())
    }
}

/// Raw JSON body returned by `/api/analyze`.
///
/// Every field is optional so that error bodies (`{"status":"error","message":...}`)
/// still deserialize and can be reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub result_path: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A successful analysis: relative artifact path plus confidence score.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub result_path: String,
    pub confidence: f64,
}

impl AnalysisResponse {
    /// Interpret the body. Anything but a complete success shape is a failure.
    pub fn into_outcome(self) -> Result<AnalysisOutcome, BackendError> {
        if self.status != "success" {
            let reason = self
                .message
                .unwrap_or_else(|| format!("status '{}'", self.status));
            return Err(BackendError::Rejected(reason));
        }
        match (self.result_path, self.confidence) {
            (Some(result_path), Some(confidence)) => Ok(AnalysisOutcome {
                result_path,
                confidence,
            }),
            (None, _) => Err(BackendError::UnexpectedResponse(
                "missing result_path".to_string(),
            )),
            (_, None) => Err(BackendError::UnexpectedResponse(
                "missing confidence".to_string(),
            )),
        }
    }
}

/// Cache-busted reference to a result artifact served by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResultRef {
    /// Backend-relative path with `/` separators
    pub path: String,
    /// Cache-busting token appended as `?t=`
    pub token: i64,
    /// Absolute URL used to fetch the artifact
    pub url: String,
}

impl ResultRef {
    /// Build a reference from the backend origin, the raw `result_path` and a token.
    ///
    /// Each path segment is percent-encoded, so `#`, `?`, `%` or spaces in a
    /// file name stay part of the path.
    pub fn new(origin: &str, raw_path: &str, token: i64) -> Self {
        let path = normalize_result_path(raw_path);
        let url = match artifact_url(origin, &path, token) {
            Ok(url) => url.to_string(),
            Err(e) => {
                log::warn!("[Models] Backend origin '{}' is not a base URL: {}", origin, e);
                format!("{}/{}?t={}", origin.trim_end_matches('/'), path, token)
            }
        };
        ResultRef { path, token, url }
    }
}

fn artifact_url(origin: &str, path: &str, token: i64) -> Result<Url, String> {
    let mut url = Url::parse(origin).map_err(|e| e.to_string())?;
    url.path_segments_mut()
        .map_err(|()| "cannot be a base".to_string())?
        .pop_if_empty()
        .extend(path.split('/').filter(|segment| !segment.is_empty()));
    url.set_query(None);
    url.set_fragment(None);
    url.query_pairs_mut().append_pair("t", &token.to_string());
    Ok(url)
}

/// Convert Windows separators to `/` and drop leading slashes so the path
/// joins cleanly onto the backend origin.
pub fn normalize_result_path(raw: &str) -> String {
    raw.replace('\\', "/").trim_start_matches('/').to_string()
}

/// Severity of a user-facing advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// Blocking message shown to the user (the desktop equivalent of an alert box).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub severity: Severity,
    pub message: String,
}

impl Advisory {
    pub fn warning(message: impl Into<String>) -> Self {
        Advisory {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Advisory {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}
