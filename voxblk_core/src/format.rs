/// Number of channels in every framed block.
///
/// The block does not store this; reader and writer must agree on it.
pub const CHANNEL_COUNT: usize = 8;

/// Trailing marker written after the last channel record (u32 LE).
pub const BLOCK_TRAILING_MAGIC: u32 = 0x900d_f00d;

/// Size of the trailing marker in bytes.
pub const BLOCK_TRAILING_MAGIC_SIZE: usize = 4;

/// Size of the envelope header (uncompressed frame length, u32 LE).
pub const ENVELOPE_HEADER_SIZE: usize = 4;

/// Size of the per-channel compression tag.
pub const CHANNEL_TAG_SIZE: usize = 1;

// ── Codec IDs ──────────────────────────────────────────────────────────────
//
// Not written into envelopes. Used to name codecs on the command line and in
// logs; both ends of a stream must be configured with the same codec.

pub const CODEC_PASSTHROUGH: u16 = 0;
pub const CODEC_ZSTD: u16 = 1;
pub const CODEC_LZ4: u16 = 2;

// ── Channel compression ────────────────────────────────────────────────────

/// How a channel's content is stored, and the tag it is framed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ChannelCompression {
    /// One byte per cell.
    Raw = 0,
    /// Every cell holds the same value, stored once.
    Uniform = 1,
}

impl ChannelCompression {
    #[inline]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Raw),
            1 => Some(Self::Uniform),
            _ => None,
        }
    }

    #[inline]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Uniform => "uniform",
        }
    }
}

// ── Depth ──────────────────────────────────────────────────────────────────

/// Bit width of a channel's logical value.
///
/// Only affects how a uniform channel's value is framed: raw channels always
/// store one byte per cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Depth {
    #[default]
    Bits8,
    Bits16,
    Bits32,
    Bits64,
}

impl Depth {
    pub const ALL: [Depth; 4] = [Depth::Bits8, Depth::Bits16, Depth::Bits32, Depth::Bits64];

    /// Map a bit count to a depth. `None` for anything but 8, 16, 32 or 64.
    pub const fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            8 => Some(Self::Bits8),
            16 => Some(Self::Bits16),
            32 => Some(Self::Bits32),
            64 => Some(Self::Bits64),
            _ => None,
        }
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Bits8 => 8,
            Self::Bits16 => 16,
            Self::Bits32 => 32,
            Self::Bits64 => 64,
        }
    }

    /// Width of a framed uniform value.
    #[inline]
    pub const fn byte_width(self) -> usize {
        self.bits() as usize / 8
    }

    /// Truncate `value` to this depth.
    #[inline]
    pub const fn mask(self, value: u64) -> u64 {
        match self {
            Self::Bits8 => value & 0xff,
            Self::Bits16 => value & 0xffff,
            Self::Bits32 => value & 0xffff_ffff,
            Self::Bits64 => value,
        }
    }
}
