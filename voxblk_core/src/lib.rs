pub mod channel;
pub mod codec;
pub mod cursor;
pub mod envelope;
pub mod error;
pub mod format;
pub mod frame;
pub mod serializer;
pub mod volume;

pub use codec::Codec;
pub use error::{Error, Result};
pub use format::{ChannelCompression, Depth, CHANNEL_COUNT};
pub use serializer::VoxelBlockSerializer;
pub use volume::{Vec3i, VoxelBuffer, VoxelVolume};
