//! Compressed envelope around a framed block.
//!
//! ```text
//! [uncompressed_len: u32 LE] [codec payload]
//! ```

use crate::codec::Codec;
use crate::cursor::ByteWriter;
use crate::error::{Error, Result};
use crate::format::ENVELOPE_HEADER_SIZE;

/// Compress `framed` into `out`, replacing its contents.
///
/// # Panics
/// If `framed` does not fit a u32 length header, or the codec fails or
/// produces no output for non-empty input. Both mean a broken codec or
/// caller, not bad data.
pub fn compress(codec: &dyn Codec, framed: &[u8], out: &mut Vec<u8>) {
    let raw_len = u32::try_from(framed.len())
        .unwrap_or_else(|_| panic!("framed block of {} bytes exceeds u32 header", framed.len()));

    out.clear();
    ByteWriter::new(out).put_u32(raw_len);
    out.resize(ENVELOPE_HEADER_SIZE + codec.max_compressed_len(framed.len()), 0);

    let written = match codec.compress_into(framed, &mut out[ENVELOPE_HEADER_SIZE..]) {
        Ok(n) => n,
        Err(e) => panic!("{} failed to compress {} bytes: {e:#}", codec.name(), framed.len()),
    };
    assert!(
        written > 0 || framed.is_empty(),
        "{} produced no output for {} bytes",
        codec.name(),
        framed.len()
    );

    out.truncate(ENVELOPE_HEADER_SIZE + written);
    log::debug!("{}: {} framed bytes -> {} envelope bytes", codec.name(), framed.len(), out.len());
}

/// Decompress `envelope` into `out`, replacing its contents.
///
/// The declared length must not exceed `max_len`; this is checked before
/// anything is allocated.
pub fn decompress(codec: &dyn Codec, envelope: &[u8], max_len: usize, out: &mut Vec<u8>) -> Result<()> {
    let Some((header, payload)) = envelope.split_first_chunk::<ENVELOPE_HEADER_SIZE>() else {
        return Err(Error::EnvelopeTooShort { len: envelope.len() });
    };
    let expected = u32::from_le_bytes(*header) as usize;
    if expected > max_len {
        return Err(Error::FrameTooLarge {
            declared: expected,
            max: max_len,
        });
    }

    out.clear();
    out.resize(expected, 0);

    let actual = codec
        .decompress_into(payload, out)
        .map_err(|e| Error::Decompression {
            codec: codec.name(),
            msg: format!("{e:#}"),
        })?;
    if actual != expected {
        return Err(Error::LengthMismatch { expected, actual });
    }
    Ok(())
}
