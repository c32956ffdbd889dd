//! Raw byte access for loader sources: local files or HTTP URLs, optionally gzipped.

use std::io::Read;

use flate2::read::MultiGzDecoder;
use tracing::debug;

use crate::error::Result;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

pub fn fetch_bytes(url: &str) -> Result<Vec<u8>> {
    let resp = reqwest::blocking::get(url)?.error_for_status()?;
    Ok(resp.bytes()?.to_vec())
}

/// Returns true if `source` should be fetched over HTTP rather than read from disk.
pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Loads the bytes behind `source`, transparently decompressing gzip payloads.
#[tracing::instrument(fields(source = %source))]
pub fn read_source(source: &str) -> Result<Vec<u8>> {
    let raw = if is_url(source) {
        fetch_bytes(source)?
    } else {
        std::fs::read(source)?
    };
    debug!(bytes = raw.len(), "Source bytes read");

    if raw.starts_with(&GZIP_MAGIC) {
        let mut decoded = Vec::with_capacity(raw.len() * 4);
        MultiGzDecoder::new(raw.as_slice()).read_to_end(&mut decoded)?;
        debug!(bytes = decoded.len(), "Gzip payload decoded");
        Ok(decoded)
    } else {
        Ok(raw)
    }
}
