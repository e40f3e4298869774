//! Image MIME sniffing from magic bytes.

/// MIME type assumed when the bytes are not recognized.
pub const DEFAULT_MIME: &str = "image/jpeg";

/// Guess an image MIME type from its leading bytes.
#[must_use]
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => "image/png",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        _ => DEFAULT_MIME,
    }
}
