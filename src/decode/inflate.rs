//! Zlib inflate with a strict destination-size contract.
//!
//! Array properties with `encoding == 1` store zlib streams. The declared
//! element count fixes the decoded size exactly, so the stream must fill
//! the destination and then end; anything shorter or longer is treated as
//! corrupt input, never as a partial success.

use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::util::{Error, Result};

/// Inflate `src` into `dest`, requiring the stream to decode to exactly
/// `dest.len()` bytes.
pub fn inflate_into(src: &[u8], dest: &mut [u8]) -> Result<()> {
    let mut decoder = ZlibDecoder::new(src);
    decoder
        .read_exact(dest)
        .map_err(|e| Error::decode(format!("inflate: {e}")))?;

    let mut probe = [0u8; 1];
    match decoder.read(&mut probe) {
        Ok(0) => Ok(()),
        Ok(_) => Err(Error::decode("inflate produced more bytes than declared")),
        Err(e) => Err(Error::decode(format!("inflate: {e}"))),
    }
}
