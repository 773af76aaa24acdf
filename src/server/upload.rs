//! Upload validation and drawing parameters
//!
//! Everything here runs before the SVG reaches a [`PolylineSource`], so a
//! rejected upload never costs a parse.
//!
//! [`PolylineSource`]: crate::parser::PolylineSource

use axum::body::Bytes;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::BytesRejection;
use axum::extract::Multipart;
use log::{debug, trace};
use serde::Deserialize;

use crate::error::ValidationError;
use crate::renderer::DrawRequest;

/// The only file extension accepted for uploads
pub const ALLOWED_EXTENSION: &str = "svg";

/// Whether `filename` has an accepted extension (case-insensitive)
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.to_lowercase() == ALLOWED_EXTENSION)
}

/// Raw drawing parameters as they arrive in a form or query string.
///
/// Blank or absent values fall back to the defaults of [`DrawRequest`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DrawParams {
    pub scale: Option<String>,
    pub offset_x: Option<String>,
    pub offset_y: Option<String>,
    pub fit: Option<String>,
}

impl DrawParams {
    /// Store a form field; returns false for unknown names
    fn set(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "scale" => &mut self.scale,
            "offset_x" => &mut self.offset_x,
            "offset_y" => &mut self.offset_y,
            "fit" => &mut self.fit,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    /// Validate and convert into a [`DrawRequest`]
    pub fn to_request(&self) -> Result<DrawRequest, ValidationError> {
        let defaults = DrawRequest::default();
        let scale = number("scale", self.scale.as_deref(), defaults.scale)?;
        let x = number("offset_x", self.offset_x.as_deref(), defaults.translate.0)?;
        let y = number("offset_y", self.offset_y.as_deref(), defaults.translate.1)?;
        let fit = flag("fit", self.fit.as_deref())?;
        Ok(DrawRequest::new()
            .with_scale(scale)
            .with_translate(x, y)
            .with_fit(fit))
    }
}

fn number(name: &str, value: Option<&str>, default: f64) -> Result<f64, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(default),
        Some(raw) => match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(ValidationError::invalid_parameter(name, raw)),
        },
    }
}

fn flag(name: &str, value: Option<&str>) -> Result<bool, ValidationError> {
    let Some(raw) = value else {
        return Ok(false);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "off" | "no" => Ok(false),
        "1" | "true" | "on" | "yes" => Ok(true),
        _ => Err(ValidationError::invalid_parameter(name, raw)),
    }
}

/// An upload that passed validation
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub svg: Bytes,
    pub request: DrawRequest,
}

/// Fields collected from a multipart body, not yet validated
#[derive(Debug, Default)]
pub struct UploadForm {
    /// Filename and content of the `file` part
    pub file: Option<(String, Bytes)>,
    pub params: DrawParams,
}

impl UploadForm {
    /// Drain all parts of a multipart body
    pub async fn read(mut multipart: Multipart) -> Result<Self, ValidationError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                trace!("upload: file part '{}' ({} bytes)", filename, data.len());
                form.file = Some((filename, data));
            } else {
                let value = field.text().await.map_err(multipart_error)?;
                if !form.params.set(&name, value) {
                    debug!("Ignoring unknown form field '{}'", name);
                }
            }
        }

        Ok(form)
    }

    /// Check the file part and parameters
    pub fn validate(self) -> Result<Upload, ValidationError> {
        let (filename, svg) = self.file.ok_or(ValidationError::MissingFile)?;
        if filename.is_empty() {
            return Err(ValidationError::EmptyFilename);
        }
        if !allowed_file(&filename) {
            return Err(ValidationError::UnsupportedExtension { filename });
        }
        let request = self.params.to_request()?;
        Ok(Upload {
            filename,
            svg,
            request,
        })
    }
}

pub(crate) fn multipart_error(err: MultipartError) -> ValidationError {
    ValidationError::Rejected {
        status: err.status().as_u16(),
        message: err.body_text(),
    }
}

pub(crate) fn multipart_rejection(rejection: MultipartRejection) -> ValidationError {
    ValidationError::Rejected {
        status: rejection.status().as_u16(),
        message: rejection.body_text(),
    }
}

pub(crate) fn body_rejection(rejection: BytesRejection) -> ValidationError {
    ValidationError::Rejected {
        status: rejection.status().as_u16(),
        message: rejection.body_text(),
    }
}
