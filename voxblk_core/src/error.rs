use thiserror::Error;

/// Why a stored block could not be read back.
///
/// Every variant is caused by the input bytes (or the source they came from),
/// never by a bug in this crate; callers should treat the block as unusable.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown compression mode {tag} at offset 0x{offset:x}")]
    UnknownCompression { tag: u8, offset: usize },

    #[error("unexpected end of block at offset 0x{offset:x}: needed {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("trailing marker mismatch at offset 0x{offset:x}: found 0x{found:08x}")]
    BadMagic { offset: usize, found: u32 },

    #[error("envelope of {len} bytes is shorter than its header")]
    EnvelopeTooShort { len: usize },

    #[error("envelope declares {declared} uncompressed bytes, at most {max} possible")]
    FrameTooLarge { declared: usize, max: usize },

    #[error("{codec} decompression error: {msg}")]
    Decompression { codec: &'static str, msg: String },

    #[error("expected {expected} decompressed bytes, obtained {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("short read from byte source: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
