//! Gzip framing for queued render payloads.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Gzip a rendered HTML payload for storage.
pub fn compress(html: &str) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(html.as_bytes())?;
    encoder.finish()
}

/// Inflate a stored payload back to HTML.
pub fn decompress(bytes: &[u8]) -> std::io::Result<String> {
    let mut decoder = GzDecoder::new(bytes);
    let mut html = String::new();
    decoder.read_to_string(&mut html)?;
    Ok(html)
}
