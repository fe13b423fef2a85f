mod lz4_codec;
mod passthrough;
mod zstd_codec;

pub use lz4_codec::Lz4Codec;
pub use passthrough::PassThroughCodec;
pub use zstd_codec::ZstdCodec;

use voxblk_core::format::{CODEC_LZ4, CODEC_PASSTHROUGH, CODEC_ZSTD};
use voxblk_core::{Codec, VoxelBlockSerializer};

/// Resolve a codec from its numeric id.
pub fn codec_by_id(id: u16) -> anyhow::Result<Box<dyn Codec>> {
    match id {
        CODEC_PASSTHROUGH => Ok(Box::new(PassThroughCodec)),
        CODEC_ZSTD => Ok(Box::new(ZstdCodec::default())),
        CODEC_LZ4 => Ok(Box::new(Lz4Codec)),
        _ => anyhow::bail!("unknown codec id {}; supported: 0 (passthrough), 1 (zstd), 2 (lz4)", id),
    }
}

/// Resolve a codec from a command-line name. `zstd_level` only applies to zstd.
pub fn codec_by_name(name: &str, zstd_level: i32) -> anyhow::Result<Box<dyn Codec>> {
    match name {
        "passthrough" | "pass" | "none" => Ok(Box::new(PassThroughCodec)),
        "zstd" | "z" => Ok(Box::new(ZstdCodec::new(zstd_level))),
        "lz4" | "l" => Ok(Box::new(Lz4Codec)),
        other => anyhow::bail!("unknown codec '{}'. Valid options: passthrough, zstd, lz4", other),
    }
}

/// A serializer using the default LZ4 codec.
pub fn default_serializer() -> VoxelBlockSerializer {
    VoxelBlockSerializer::new(Box::new(Lz4Codec))
}
