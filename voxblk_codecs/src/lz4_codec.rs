use lz4_flex::block;
use voxblk_core::codec::Codec;
use voxblk_core::format::CODEC_LZ4;

/// LZ4 block codec, the default for voxel envelopes.
///
/// Single-shot block mode with no size prefix of its own: the envelope header
/// already carries the uncompressed length. Decoding is bounds-checked and
/// fails on corrupted input instead of overrunning the output.
///
/// Best for: streaming terrain blocks, where decode latency matters more
/// than the last few percent of size.
pub struct Lz4Codec;

impl Codec for Lz4Codec {
    fn id(&self) -> u16 {
        CODEC_LZ4
    }

    fn name(&self) -> &'static str {
        "lz4"
    }

    fn max_compressed_len(&self, raw_len: usize) -> usize {
        block::get_maximum_output_size(raw_len)
    }

    fn compress_into(&self, raw: &[u8], out: &mut [u8]) -> anyhow::Result<usize> {
        block::compress_into(raw, out).map_err(|e| anyhow::anyhow!("lz4 compress error: {}", e))
    }

    fn decompress_into(&self, compressed: &[u8], out: &mut [u8]) -> anyhow::Result<usize> {
        block::decompress_into(compressed, out).map_err(|e| anyhow::anyhow!("lz4 decompress error: {}", e))
    }
}
