//! Embedding rendered images in HTML

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Encode PNG bytes as a `data:` URL usable in an `<img src>`
pub fn png_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}
