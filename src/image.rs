use std::{fs, io, path::Path};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use tracing::warn;

/// Stated guidance for inline images; larger files are warned about
/// but not rejected, matching the admin form's behavior.
pub const INLINE_IMAGE_GUIDANCE_BYTES: u64 = 10 * 1024 * 1024;

/// Reads a local image file and encodes it as a `data:` URI, ready to
/// be stored directly in an item's image field. No external object
/// storage is involved; the whole collection grows with every embedded
/// image, an accepted trade-off at personal-portfolio scale.
pub fn inline_data_uri(path: impl AsRef<Path>) -> io::Result<String> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;

    if bytes.len() as u64 > INLINE_IMAGE_GUIDANCE_BYTES {
        warn!(
            "{} is {} bytes, above the {} byte guidance for inline images",
            path.display(),
            bytes.len(),
            INLINE_IMAGE_GUIDANCE_BYTES
        );
    }

    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Ok(format!(
        "data:{};base64,{}",
        mime.essence_str(),
        STANDARD.encode(&bytes)
    ))
}
