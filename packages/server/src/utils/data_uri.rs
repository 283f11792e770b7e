use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// An image decoded from a `data:image/<type>;base64,<payload>` URI.
#[derive(Debug, PartialEq, Eq)]
pub struct DecodedImage {
    /// File extension derived from the declared subtype, lowercased (`png`, `jpeg`, ...).
    pub extension: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DataUriError {
    #[error("Image must be a base64 data URI (data:image/<type>;base64,...)")]
    NotDataUri,
    #[error("Unsupported image type '{0}'")]
    UnsupportedType(String),
    #[error("Image payload is not valid base64")]
    InvalidBase64,
    #[error("Image payload is empty")]
    Empty,
}

/// Decode an inline base64 image.
pub fn decode_image(input: &str) -> Result<DecodedImage, DataUriError> {
    let rest = input
        .trim()
        .strip_prefix("data:image/")
        .ok_or(DataUriError::NotDataUri)?;
    let (subtype, payload) = rest
        .split_once(";base64,")
        .ok_or(DataUriError::NotDataUri)?;

    let extension = subtype.trim().to_ascii_lowercase();
    if extension.is_empty()
        || extension.len() > 10
        || !extension.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(DataUriError::UnsupportedType(subtype.to_string()));
    }

    let payload: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(payload.as_bytes())
        .map_err(|_| DataUriError::InvalidBase64)?;
    if bytes.is_empty() {
        return Err(DataUriError::Empty);
    }

    Ok(DecodedImage { extension, bytes })
}
