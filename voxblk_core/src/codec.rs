/// Whole-block byte compressor used by the envelope.
///
/// Each `Codec` implementation:
/// - Is identified by a stable numeric `id()`. The id is not stored in the
///   envelope, so writer and reader must be configured with the same codec.
/// - Works in single-shot block mode: no dictionary or state survives between
///   calls, and every envelope decompresses on its own.
/// - Knows its worst-case output size up front, so the envelope can size its
///   scratch buffer once and shrink it after compressing.
pub trait Codec: Send + Sync {
    /// Stable codec ID, used for lookup and display.
    fn id(&self) -> u16;

    /// Human-readable codec name for CLI display and logs.
    fn name(&self) -> &'static str;

    /// Upper bound on the output of [`compress_into`](Self::compress_into)
    /// for `raw_len` input bytes.
    fn max_compressed_len(&self, raw_len: usize) -> usize;

    /// Compress `raw` into `out`, returning the number of bytes written.
    ///
    /// `out` is at least `max_compressed_len(raw.len())` bytes long.
    fn compress_into(&self, raw: &[u8], out: &mut [u8]) -> anyhow::Result<usize>;

    /// Decompress `compressed` into `out`, returning the number of bytes written.
    ///
    /// Must fail rather than write past `out` when the input is corrupted.
    fn decompress_into(&self, compressed: &[u8], out: &mut [u8]) -> anyhow::Result<usize>;
}
