use voxblk_core::codec::Codec;
use voxblk_core::format::CODEC_PASSTHROUGH;

/// No-op codec: the envelope payload is the framed block, verbatim.
///
/// Useful for:
/// - Reading the frame layout in a hex dump.
/// - Separating frame bugs from compressor bugs.
pub struct PassThroughCodec;

impl Codec for PassThroughCodec {
    fn id(&self) -> u16 {
        CODEC_PASSTHROUGH
    }

    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn max_compressed_len(&self, raw_len: usize) -> usize {
        raw_len
    }

    fn compress_into(&self, raw: &[u8], out: &mut [u8]) -> anyhow::Result<usize> {
        if raw.len() > out.len() {
            anyhow::bail!("output of {} bytes too small for {}", out.len(), raw.len());
        }
        out[..raw.len()].copy_from_slice(raw);
        Ok(raw.len())
    }

    fn decompress_into(&self, compressed: &[u8], out: &mut [u8]) -> anyhow::Result<usize> {
        if compressed.len() > out.len() {
            anyhow::bail!("payload of {} bytes overflows {} byte output", compressed.len(), out.len());
        }
        out[..compressed.len()].copy_from_slice(compressed);
        Ok(compressed.len())
    }
}
