//! Error types for parsing, validation, rendering and configuration

use thiserror::Error;

/// Errors produced while turning an SVG document into polylines
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("SVG data is not valid UTF-8")]
    Encoding,

    #[error("error when parsing XML: {0}")]
    Xml(String),

    #[error("document does not contain an <svg> element")]
    NotSvg,

    #[error("invalid value '{value}' for attribute '{attribute}' on <{element}>")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
    },

    #[error("could not parse path segment: {0}")]
    PathData(String),

    #[error("invalid path state: {0}")]
    InvalidState(String),

    /// The C ABI reported a failure; the payload is the returned status code
    #[error("{} (native status {})", describe_native_status(.0), .0)]
    Native(u8),
}

fn describe_native_status(status: &u8) -> &'static str {
    use crate::ffi::{STATUS_INVALID_UTF8, STATUS_NULL_ARGUMENT, STATUS_PARSE_ERROR};
    match *status {
        STATUS_NULL_ARGUMENT => "native parser was called without input",
        STATUS_INVALID_UTF8 => "SVG data is not valid UTF-8",
        STATUS_PARSE_ERROR => {
            "SVG document could not be parsed (malformed XML, no <svg> root or invalid geometry)"
        }
        _ => "native parser failed",
    }
}

impl ParseError {
    /// Create an invalid attribute error
    pub fn invalid_attribute(
        element: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidAttribute {
            element: element.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }
}

impl From<quick_xml::Error> for ParseError {
    fn from(err: quick_xml::Error) -> Self {
        ParseError::Xml(err.to_string())
    }
}

/// Errors produced while drawing or encoding the preview image
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("could not allocate a {width}x{height} canvas")]
    Allocation { width: u32, height: u32 },

    #[error("could not encode PNG: {0}")]
    Encode(String),

    /// The blocking task running the pipeline panicked or was cancelled
    #[error("preview worker failed: {0}")]
    Worker(String),
}

/// User input rejected before any parsing happens
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Empty request data")]
    EmptyBody,

    #[error("No file part")]
    MissingFile,

    #[error("No selected file")]
    EmptyFilename,

    #[error("File '{filename}' is not an SVG file")]
    UnsupportedExtension { filename: String },

    #[error("Invalid value '{value}' for '{name}'")]
    InvalidParameter { name: String, value: String },

    /// The request body could not be read (malformed multipart, too large, ...)
    #[error("Request rejected: {message}")]
    Rejected { status: u16, message: String },
}

impl ValidationError {
    pub fn invalid_parameter(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            value: value.into(),
        }
    }

    /// HTTP status code that best describes the rejection
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Rejected { status, .. } => *status,
            _ => 400,
        }
    }
}

/// Errors from the upload to preview pipeline
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

impl Error {
    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(e) => e.status_code(),
            Error::Parse(_) => 400,
            Error::Render(_) => 500,
        }
    }
}

/// Errors that prevent the server from starting
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Please set SECRET_KEY env var!")]
    MissingSecretKey,

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("unknown parser backend '{0}' (expected 'builtin' or 'ffi')")]
    UnknownParser(String),

    #[error("flattening tolerance must be a positive number, got {0}")]
    InvalidTolerance(f64),
}
