//! Voxel storage as the serializer sees it: the [`VoxelVolume`] trait and an
//! in-memory [`VoxelBuffer`] implementing it.

use crate::format::{ChannelCompression, Depth, CHANNEL_COUNT};

/// Integer 3-vector used for volume sizes and cell positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Vec3i {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Vec3i {
    pub const ZERO: Vec3i = Vec3i { x: 0, y: 0, z: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn splat(v: i32) -> Self {
        Self { x: v, y: v, z: v }
    }

    /// Number of cells in a box of this size. Zero if any axis is non-positive.
    pub fn volume(&self) -> usize {
        if self.x <= 0 || self.y <= 0 || self.z <= 0 {
            return 0;
        }
        self.x as usize * self.y as usize * self.z as usize
    }

    /// True when `pos` lies in `[0, self)` on every axis.
    pub fn is_inside(&self, pos: Vec3i) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.z >= 0 && pos.x < self.x && pos.y < self.y && pos.z < self.z
    }
}

/// Multi-channel voxel storage, as seen by the serializer.
///
/// Channel indices run from `0` to [`CHANNEL_COUNT`]. Implementations own the
/// cell storage; the serializer only reads it through this trait and mutates
/// it through the last two methods while deserializing.
pub trait VoxelVolume {
    /// Size of every channel, in cells.
    fn size(&self) -> Vec3i;

    /// Storage state of channel `channel`.
    fn channel_compression(&self, channel: usize) -> ChannelCompression;

    fn channel_depth(&self, channel: usize) -> Depth;

    /// The byte grid of a raw channel, `size().volume()` bytes long.
    ///
    /// Must be `Some` exactly when `channel_compression` is [`ChannelCompression::Raw`].
    fn raw_channel_bytes(&self, channel: usize) -> Option<&[u8]>;

    /// Value of the cell at the volume's origin.
    fn cell_value_at_origin(&self, channel: usize) -> u64;

    /// Make every cell of `channel` hold `value`, releasing any per-cell storage.
    fn set_channel_uniform(&mut self, channel: usize, value: u64);

    /// Expand `channel` to a full byte grid if it is uniform, and return the grid.
    fn ensure_channel_materialized(&mut self, channel: usize) -> &mut [u8];
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ChannelData {
    Uniform(u64),
    Raw(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Channel {
    depth: Depth,
    data: ChannelData,
}

impl Default for Channel {
    fn default() -> Self {
        Self {
            depth: Depth::Bits8,
            data: ChannelData::Uniform(0),
        }
    }
}

/// In-memory [`VoxelVolume`] with [`CHANNEL_COUNT`] channels.
///
/// Raw channels hold one byte per cell, laid out `y + size.y * (x + size.x * z)`
/// so that columns along Y are contiguous. Uniform channels hold a single
/// value of up to 64 bits.
#[derive(Debug, Clone)]
pub struct VoxelBuffer {
    size: Vec3i,
    channels: [Channel; CHANNEL_COUNT],
}

impl VoxelBuffer {
    /// A volume of `size` with every channel uniform 0 at 8-bit depth.
    pub fn new(size: Vec3i) -> Self {
        Self {
            size,
            channels: Default::default(),
        }
    }

    /// Like [`new`](Self::new), with a depth per channel.
    pub fn with_depths(size: Vec3i, depths: [Depth; CHANNEL_COUNT]) -> Self {
        let mut buffer = Self::new(size);
        for (channel, depth) in buffer.channels.iter_mut().zip(depths) {
            channel.depth = depth;
        }
        buffer
    }

    /// Change the depth of `channel`. A uniform value is truncated to the new depth.
    pub fn set_channel_depth(&mut self, channel: usize, depth: Depth) {
        let channel = &mut self.channels[channel];
        channel.depth = depth;
        if let ChannelData::Uniform(value) = &mut channel.data {
            *value = depth.mask(*value);
        }
    }

    #[inline]
    fn index(&self, pos: Vec3i) -> usize {
        pos.y as usize + self.size.y as usize * (pos.x as usize + self.size.x as usize * pos.z as usize)
    }

    /// Value at `pos` in `channel`. Positions outside the volume read as 0.
    pub fn get_voxel(&self, pos: Vec3i, channel: usize) -> u64 {
        if !self.size.is_inside(pos) {
            return 0;
        }
        match &self.channels[channel].data {
            ChannelData::Uniform(value) => *value,
            ChannelData::Raw(bytes) => bytes[self.index(pos)] as u64,
        }
    }

    /// Write `value` at `pos`. Raw cells keep the low 8 bits of `value`.
    ///
    /// Writing a value different from a uniform channel's fill expands it.
    /// Writes outside the volume are ignored.
    pub fn set_voxel(&mut self, pos: Vec3i, channel: usize, value: u64) {
        if !self.size.is_inside(pos) {
            return;
        }
        let Channel { depth, data } = &self.channels[channel];
        if let ChannelData::Uniform(current) = *data {
            if current == depth.mask(value) {
                return;
            }
        }
        let index = self.index(pos);
        self.ensure_channel_materialized(channel)[index] = value as u8;
    }

    /// Set every cell of `channel` to `value`, truncated to the channel's depth.
    pub fn fill_channel(&mut self, channel: usize, value: u64) {
        let channel = &mut self.channels[channel];
        channel.data = ChannelData::Uniform(channel.depth.mask(value));
    }

    /// Collapse raw channels whose cells all hold the same byte.
    ///
    /// Returns the number of channels collapsed.
    pub fn compress_uniform_channels(&mut self) -> usize {
        let mut collapsed = 0;
        for channel in self.channels.iter_mut() {
            let fill = match &channel.data {
                ChannelData::Raw(bytes) => match bytes.split_first() {
                    Some((first, rest)) if rest.iter().all(|b| b == first) => *first as u64,
                    _ => continue,
                },
                ChannelData::Uniform(_) => continue,
            };
            channel.data = ChannelData::Uniform(fill);
            collapsed += 1;
        }
        collapsed
    }

    /// True if both volumes have the same size and depths, and every cell of
    /// every channel reads back the same value, whatever the storage state.
    pub fn same_voxels(&self, other: &VoxelBuffer) -> bool {
        if self.size != other.size {
            return false;
        }
        let cells = self.size.volume();
        self.channels.iter().zip(other.channels.iter()).all(|(a, b)| {
            if a.depth != b.depth {
                return false;
            }
            match (&a.data, &b.data) {
                (ChannelData::Uniform(x), ChannelData::Uniform(y)) => x == y || cells == 0,
                (ChannelData::Raw(x), ChannelData::Raw(y)) => x == y,
                (ChannelData::Uniform(v), ChannelData::Raw(bytes))
                | (ChannelData::Raw(bytes), ChannelData::Uniform(v)) => {
                    *v <= u8::MAX as u64 && bytes.iter().all(|&b| b as u64 == *v)
                }
            }
        })
    }
}

impl VoxelVolume for VoxelBuffer {
    fn size(&self) -> Vec3i {
        self.size
    }

    fn channel_compression(&self, channel: usize) -> ChannelCompression {
        match self.channels[channel].data {
            ChannelData::Uniform(_) => ChannelCompression::Uniform,
            ChannelData::Raw(_) => ChannelCompression::Raw,
        }
    }

    fn channel_depth(&self, channel: usize) -> Depth {
        self.channels[channel].depth
    }

    fn raw_channel_bytes(&self, channel: usize) -> Option<&[u8]> {
        match &self.channels[channel].data {
            ChannelData::Raw(bytes) => Some(bytes.as_slice()),
            ChannelData::Uniform(_) => None,
        }
    }

    fn cell_value_at_origin(&self, channel: usize) -> u64 {
        self.get_voxel(Vec3i::ZERO, channel)
    }

    fn set_channel_uniform(&mut self, channel: usize, value: u64) {
        self.fill_channel(channel, value);
    }

    fn ensure_channel_materialized(&mut self, channel: usize) -> &mut [u8] {
        let cells = self.size.volume();
        let data = &mut self.channels[channel].data;
        if let ChannelData::Uniform(value) = *data {
            *data = ChannelData::Raw(vec![value as u8; cells]);
        }
        match data {
            ChannelData::Raw(bytes) => bytes.as_mut_slice(),
            ChannelData::Uniform(_) => unreachable!("channel was just materialized"),
        }
    }
}
