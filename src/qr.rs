//! QR code links for sharing an install page across devices.
//!
//! No image is generated here: the result is a URL on a public QR rendering
//! service which returns a square PNG encoding `data`.

use crate::link::encode_component;
use thiserror::Error;

/// Rendering endpoint. `size=WxH` and `data=` are its only parameters we use.
pub const QR_ENDPOINT: &str = "https://api.qrserver.com/v1/create-qr-code/";

/// Edge length in pixels used when no size is given.
pub const DEFAULT_QR_SIZE: &str = "150";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum QrError {
    #[error("no URL given to encode")]
    MissingUrl,
}

/// Build the QR image URL for `url`.
///
/// `size` is used for both width and height. `None` or an empty string falls
/// back to [`DEFAULT_QR_SIZE`]. An empty `url` is a usage error.
pub fn qr(url: &str, size: Option<&str>) -> Result<String, QrError> {
    if url.is_empty() {
        return Err(QrError::MissingUrl);
    }
    let size = encode_component(size.filter(|s| !s.is_empty()).unwrap_or(DEFAULT_QR_SIZE));
    Ok(format!(
        "{QR_ENDPOINT}?size={size}x{size}&data={}",
        encode_component(url)
    ))
}
