//! Request Builder: snapshots parameters and both assets into one outbound
//! analysis request.
//!
//! `build` is a pure function. It takes both files by reference, so a request
//! with a missing asset cannot be built; the controller checks that before
//! calling in.

use reqwest::multipart::{Form, Part};

use crate::models::{AnalysisParameters, ParamField};
use crate::session::asset::SelectedFile;

/// Multipart field name for the model weights.
pub const MODEL_FIELD: &str = "model_file";
/// Multipart field name for the target image.
pub const IMAGE_FIELD: &str = "image_file";

/// Binary part of the request.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: &'static str,
    pub file: SelectedFile,
}

/// Fully built `/api/analyze` payload.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub model: FilePart,
    pub image: FilePart,
    /// `(form name, stringified integer)` in wire order
    pub scalars: Vec<(&'static str, String)>,
}

/// Snapshot the current state into a request.
pub fn build(
    params: &AnalysisParameters,
    model: &SelectedFile,
    image: &SelectedFile,
) -> AnalysisRequest {
    let scalars = ParamField::ALL
        .iter()
        .map(|field| (field.form_name(), params.value(*field).to_string()))
        .collect();

    AnalysisRequest {
        model: FilePart {
            field: MODEL_FIELD,
            file: model.clone(),
        },
        image: FilePart {
            field: IMAGE_FIELD,
            file: image.clone(),
        },
        scalars,
    }
}

impl AnalysisRequest {
    /// Look up a scalar by form name.
    pub fn scalar(&self, name: &str) -> Option<&str> {
        self.scalars
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Convert into a reqwest multipart form.
    pub fn into_form(self) -> Form {
        let mut form = Form::new()
            .part(self.model.field, file_part(&self.model.file))
            .part(self.image.field, file_part(&self.image.file));
        for (name, value) in self.scalars {
            form = form.text(name, value);
        }
        form
    }
}

fn file_part(file: &SelectedFile) -> Part {
    Part::bytes(file.bytes.to_vec()).file_name(file.name.clone())
}
