//! Framed block: one channel record per channel index, then the trailing magic.
//!
//! ```text
//! for channel in 0..CHANNEL_COUNT:
//!     [tag: u8] [raw: cells bytes | uniform: depth bytes]
//! [BLOCK_TRAILING_MAGIC: u32 LE]
//! ```

use crate::channel;
use crate::cursor::{ByteReader, ByteWriter};
use crate::error::{Error, Result};
use crate::format::{BLOCK_TRAILING_MAGIC, BLOCK_TRAILING_MAGIC_SIZE, CHANNEL_COUNT, CHANNEL_TAG_SIZE};
use crate::volume::VoxelVolume;

/// Exact number of bytes [`write_frame`] produces for `volume`.
pub fn frame_size<V: VoxelVolume + ?Sized>(volume: &V) -> usize {
    (0..CHANNEL_COUNT)
        .map(|channel| channel::encoded_size(volume, channel))
        .sum::<usize>()
        + BLOCK_TRAILING_MAGIC_SIZE
}

/// Largest frame that can decode into `volume`: every channel stored the
/// wider of its raw grid and its uniform value.
pub fn max_frame_size<V: VoxelVolume + ?Sized>(volume: &V) -> usize {
    let cells = volume.size().volume();
    (0..CHANNEL_COUNT)
        .map(|channel| CHANNEL_TAG_SIZE + cells.max(volume.channel_depth(channel).byte_width()))
        .sum::<usize>()
        + BLOCK_TRAILING_MAGIC_SIZE
}

pub fn write_frame<V: VoxelVolume + ?Sized>(volume: &V, w: &mut ByteWriter<'_>) {
    for channel in 0..CHANNEL_COUNT {
        channel::encode(volume, channel, w);
    }
    w.put_u32(BLOCK_TRAILING_MAGIC);
}

/// Decode a framed block into `volume`.
///
/// Channels are applied in place as they are decoded; on failure the channels
/// before the bad record have already been overwritten. Bytes after the
/// trailing marker are ignored.
pub fn read_frame<V: VoxelVolume + ?Sized>(data: &[u8], volume: &mut V) -> Result<()> {
    let mut r = ByteReader::new(data);
    for channel in 0..CHANNEL_COUNT {
        channel::decode(&mut r, volume, channel)?;
    }

    // Failure here means the block is truncated or misaligned.
    let offset = r.position();
    let found = r.get_u32()?;
    if found != BLOCK_TRAILING_MAGIC {
        return Err(Error::BadMagic { offset, found });
    }
    if r.remaining() > 0 {
        log::debug!("ignoring {} bytes after trailing marker", r.remaining());
    }
    Ok(())
}
