//! The [`VoxelBlockSerializer`] facade: framing plus compression over two
//! reused scratch buffers.

use std::io::Read;

use crate::codec::Codec;
use crate::cursor::ByteWriter;
use crate::envelope;
use crate::error::{Error, Result};
use crate::format::ENVELOPE_HEADER_SIZE;
use crate::frame::{self, frame_size, max_frame_size};
use crate::volume::VoxelVolume;

/// Turns voxel volumes into framed or compressed blocks and back.
///
/// # Scratch buffers
/// The serializer owns two buffers, one for the framed block and one for the
/// compressed envelope, reused across calls so steady-state use does not
/// allocate. Slices returned by the `serialize*` methods borrow those buffers
/// and are overwritten by the next call.
///
/// One instance serves one logical operation at a time: keep one per worker
/// thread rather than sharing it.
///
/// # Failure
/// Deserializing mutates the output volume in place, channel by channel. When
/// an error is returned, channels decoded before the failure point have
/// already been overwritten; do not pass a volume that must stay valid.
pub struct VoxelBlockSerializer {
    codec: Box<dyn Codec>,
    data: Vec<u8>,
    compressed_data: Vec<u8>,
}

impl VoxelBlockSerializer {
    pub fn new(codec: Box<dyn Codec>) -> Self {
        Self {
            codec,
            data: Vec::new(),
            compressed_data: Vec::new(),
        }
    }

    pub fn codec(&self) -> &dyn Codec {
        self.codec.as_ref()
    }

    /// The framed block produced by the last `serialize*` or
    /// `decompress_and_deserialize*` call.
    pub fn framed(&self) -> &[u8] {
        &self.data
    }

    /// Frame `volume` into the internal scratch buffer.
    pub fn serialize<V: VoxelVolume + ?Sized>(&mut self, volume: &V) -> &[u8] {
        serialize_into(volume, &mut self.data);
        &self.data
    }

    /// Decode a framed block into `out`.
    pub fn deserialize<V: VoxelVolume + ?Sized>(&self, data: &[u8], out: &mut V) -> Result<()> {
        frame::read_frame(data, out).inspect_err(|e| log::warn!("rejected framed block: {e}"))
    }

    /// Frame and compress `volume`.
    pub fn serialize_and_compress<V: VoxelVolume + ?Sized>(&mut self, volume: &V) -> &[u8] {
        serialize_into(volume, &mut self.data);
        envelope::compress(self.codec.as_ref(), &self.data, &mut self.compressed_data);
        &self.compressed_data
    }

    /// Decompress an envelope and decode it into `out`.
    pub fn decompress_and_deserialize<V: VoxelVolume + ?Sized>(&mut self, envelope: &[u8], out: &mut V) -> Result<()> {
        decompress_into(self.codec.as_ref(), envelope, &mut self.data, out)
            .inspect_err(|e| log::warn!("rejected compressed block: {e}"))
    }

    /// Read exactly `size_to_read` bytes from `src`, then decompress and decode
    /// them into `out`.
    ///
    /// Lets callers walk consecutive blocks of one file without slicing it.
    /// Fewer than `size_to_read` bytes available is an [`Error::ShortRead`].
    /// A count larger than any envelope `out` could come from is an
    /// [`Error::FrameTooLarge`], returned before anything is read.
    pub fn decompress_and_deserialize_from<R, V>(&mut self, src: &mut R, size_to_read: usize, out: &mut V) -> Result<()>
    where
        R: Read + ?Sized,
        V: VoxelVolume + ?Sized,
    {
        let max = ENVELOPE_HEADER_SIZE + self.codec.max_compressed_len(max_frame_size(out));
        if size_to_read > max {
            let err = Error::FrameTooLarge {
                declared: size_to_read,
                max,
            };
            log::warn!("rejected compressed block: {err}");
            return Err(err);
        }

        self.compressed_data.clear();
        self.compressed_data.reserve(size_to_read);
        let read = src.take(size_to_read as u64).read_to_end(&mut self.compressed_data)?;
        if read != size_to_read {
            let err = Error::ShortRead {
                expected: size_to_read,
                actual: read,
            };
            log::warn!("rejected compressed block: {err}");
            return Err(err);
        }

        decompress_into(self.codec.as_ref(), &self.compressed_data, &mut self.data, out)
            .inspect_err(|e| log::warn!("rejected compressed block: {e}"))
    }
}

fn serialize_into<V: VoxelVolume + ?Sized>(volume: &V, data: &mut Vec<u8>) {
    let size = frame_size(volume);
    data.clear();
    data.reserve(size);

    let mut w = ByteWriter::new(data);
    frame::write_frame(volume, &mut w);
    assert_eq!(w.written(), size, "frame size mismatch");
    log::debug!("framed volume {:?} into {} bytes", volume.size(), size);
}

fn decompress_into<V: VoxelVolume + ?Sized>(codec: &dyn Codec, envelope: &[u8], data: &mut Vec<u8>, out: &mut V) -> Result<()> {
    envelope::decompress(codec, envelope, max_frame_size(out), data)?;
    frame::read_frame(data, out)
}
