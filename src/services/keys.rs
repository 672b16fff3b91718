// src/services/keys.rs
use crate::services::aspect_ratio::Classification;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;

const TOKEN_BYTES: usize = 32;

fn random_bytes() -> [u8; TOKEN_BYTES] {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    bytes
}

/// Object key for an uploaded video: `{classification}/{64 hex chars}.mp4`.
pub fn video_key(classification: Classification) -> String {
    format!("{}/{}.mp4", classification, hex::encode(random_bytes()))
}

/// File name for an uploaded thumbnail: unpadded base64url token plus extension.
pub fn thumbnail_file_name(extension: &str) -> String {
    format!("{}{}", URL_SAFE_NO_PAD.encode(random_bytes()), extension)
}
