use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;

/// MIME type assumed when the metadata section carries none
pub const DEFAULT_MIME: &str = "image/png";

/// An image lifted out of a `data:<mime>;base64,<payload>` URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub content_type: String,
    pub extension: String,
    pub bytes: Bytes,
}

#[derive(Debug, thiserror::Error)]
pub enum DataUriError {
    #[error("data URI has no payload section")]
    MissingPayload,

    #[error("data URI payload is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// Split a data-URI on the first comma, read the MIME type out of the
/// metadata section, and decode the base64 payload.
///
/// The MIME type is whatever sits between `data:` and the first
/// `;base64` marker; anything else falls back to [`DEFAULT_MIME`]. The
/// file extension is the MIME subtype, taken verbatim.
pub fn parse_data_uri(input: &str) -> Result<DecodedImage, DataUriError> {
    let (metadata, payload) = input.split_once(',').ok_or(DataUriError::MissingPayload)?;

    let content_type = mime_from_metadata(metadata).unwrap_or(DEFAULT_MIME);
    let extension = content_type
        .split_once('/')
        .map(|(_, subtype)| subtype)
        .unwrap_or("png");

    let bytes = Bytes::from(STANDARD.decode(payload)?);

    Ok(DecodedImage {
        content_type: content_type.to_string(),
        extension: extension.to_string(),
        bytes,
    })
}

fn mime_from_metadata(metadata: &str) -> Option<&str> {
    let after_scheme = metadata.split_once("data:")?.1;
    let (mime, _) = after_scheme.split_once(";base64")?;
    Some(mime)
}
