//! Per-channel record: a one-byte [`ChannelCompression`] tag followed by
//! either the raw byte grid or the uniform value at the channel's depth.

use crate::cursor::{ByteReader, ByteWriter};
use crate::error::{Error, Result};
use crate::format::{ChannelCompression, Depth, CHANNEL_TAG_SIZE};
use crate::volume::VoxelVolume;

/// Exact number of bytes [`encode`] writes for `channel`.
pub fn encoded_size<V: VoxelVolume + ?Sized>(volume: &V, channel: usize) -> usize {
    let payload = match volume.raw_channel_bytes(channel) {
        Some(bytes) => bytes.len(),
        None => volume.channel_depth(channel).byte_width(),
    };
    CHANNEL_TAG_SIZE + payload
}

/// Write the record for `channel`.
pub fn encode<V: VoxelVolume + ?Sized>(volume: &V, channel: usize, w: &mut ByteWriter<'_>) {
    match volume.raw_channel_bytes(channel) {
        Some(bytes) => {
            w.put_u8(ChannelCompression::Raw.tag());
            w.put_bytes(bytes);
        }
        None => {
            w.put_u8(ChannelCompression::Uniform.tag());
            let value = volume.cell_value_at_origin(channel);
            put_uniform(w, volume.channel_depth(channel), value);
        }
    }
}

/// Read the record for `channel` into `volume`.
///
/// A raw record must carry exactly `size().volume()` bytes. The channel is
/// only touched once its payload is known to be fully present.
pub fn decode<V: VoxelVolume + ?Sized>(r: &mut ByteReader<'_>, volume: &mut V, channel: usize) -> Result<()> {
    let offset = r.position();
    let tag = r.get_u8()?;
    let compression = ChannelCompression::from_tag(tag).ok_or(Error::UnknownCompression { tag, offset })?;

    match compression {
        ChannelCompression::Raw => {
            let cells = volume.size().volume();
            let bytes = r.take(cells)?;
            volume.ensure_channel_materialized(channel).copy_from_slice(bytes);
        }
        ChannelCompression::Uniform => {
            let value = get_uniform(r, volume.channel_depth(channel))?;
            volume.set_channel_uniform(channel, value);
        }
    }
    Ok(())
}

fn put_uniform(w: &mut ByteWriter<'_>, depth: Depth, value: u64) {
    match depth {
        Depth::Bits8 => w.put_u8(value as u8),
        Depth::Bits16 => w.put_u16(value as u16),
        Depth::Bits32 => w.put_u32(value as u32),
        Depth::Bits64 => w.put_u64(value),
    }
}

fn get_uniform(r: &mut ByteReader<'_>, depth: Depth) -> Result<u64> {
    Ok(match depth {
        Depth::Bits8 => r.get_u8()? as u64,
        Depth::Bits16 => r.get_u16()? as u64,
        Depth::Bits32 => r.get_u32()? as u64,
        Depth::Bits64 => r.get_u64()?,
    })
}
