//! Text-safe transport encoding for binary payloads.
//!
//! Theme uploads and finished decks cross the request boundary as standard
//! base64. Decoding is lenient about what browsers hand over: a
//! `data:<mime>;base64,` prefix and embedded line breaks are accepted.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::Result;

/// Encode bytes as standard base64
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard base64, ignoring a data-URL prefix and whitespace
pub fn decode(text: &str) -> Result<Vec<u8>> {
    let payload = strip_data_url(text.trim());

    let compact: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    Ok(STANDARD.decode(compact)?)
}

/// `data:application/vnd.ms-officetheme;base64,UEsDB...` → `UEsDB...`
fn strip_data_url(text: &str) -> &str {
    if !text.starts_with("data:") {
        return text;
    }
    match text.split_once(',') {
        Some((header, payload)) if header.ends_with(";base64") => payload,
        _ => text,
    }
}
