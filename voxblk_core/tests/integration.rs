/// Integration tests: volumes survive framing and compression with every
/// bundled codec, frame sizes are exact, and damaged blocks are rejected.
use voxblk_codecs::{default_serializer, Lz4Codec, PassThroughCodec, ZstdCodec};
use voxblk_core::format::{BLOCK_TRAILING_MAGIC_SIZE, CHANNEL_COUNT};
use voxblk_core::frame::{frame_size, read_frame};
use voxblk_core::{ChannelCompression, Codec, Depth, Error, Vec3i, VoxelBlockSerializer, VoxelBuffer, VoxelVolume};

// ── helpers ───────────────────────────────────────────────────────────────

/// Fill `buffer`'s channel with deterministic bytes using a simple LCG.
fn pseudo_random_channel(buffer: &mut VoxelBuffer, channel: usize, seed: u64) {
    let mut rng = seed;
    for b in buffer.ensure_channel_materialized(channel) {
        rng = rng
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        *b = (rng >> 56) as u8;
    }
}

/// Terrain-like channel: cells below a sloped surface are 1, above are 0.
fn terrain_channel(buffer: &mut VoxelBuffer, channel: usize) {
    let size = buffer.size();
    for z in 0..size.z {
        for x in 0..size.x {
            let height = (x + z) / 2;
            for y in 0..size.y.min(height) {
                buffer.set_voxel(Vec3i::new(x, y, z), channel, 1);
            }
        }
    }
}

fn depths(cycle: usize) -> [Depth; CHANNEL_COUNT] {
    std::array::from_fn(|i| Depth::ALL[(i + cycle) % Depth::ALL.len()])
}

/// Empty volume with the same size and depths as `v`, as a reader would build it.
fn blank_like(v: &VoxelBuffer) -> VoxelBuffer {
    let depths = std::array::from_fn(|i| v.channel_depth(i));
    VoxelBuffer::with_depths(v.size(), depths)
}

fn mixed_volume(size: Vec3i) -> VoxelBuffer {
    let mut v = VoxelBuffer::with_depths(size, depths(1));
    terrain_channel(&mut v, 0);
    pseudo_random_channel(&mut v, 1, 0xDEAD_BEEF);
    v.fill_channel(2, 0xffff);
    v.fill_channel(3, 0x1234_5678);
    v.fill_channel(4, 0x0102_0304_0506_0708);
    pseudo_random_channel(&mut v, 6, 7);
    v
}

fn codecs() -> Vec<Box<dyn Codec>> {
    vec![Box::new(PassThroughCodec), Box::new(ZstdCodec::default()), Box::new(Lz4Codec)]
}

// ── round trips ───────────────────────────────────────────────────────────

#[test]
fn test_roundtrip_framed_mixed() {
    let v = mixed_volume(Vec3i::new(16, 16, 16));
    let mut s = default_serializer();
    let data = s.serialize(&v).to_vec();

    let mut out = blank_like(&v);
    s.deserialize(&data, &mut out).unwrap();
    assert!(out.same_voxels(&v));
    for channel in 0..CHANNEL_COUNT {
        assert_eq!(out.channel_compression(channel), v.channel_compression(channel));
    }
}

#[test]
fn test_roundtrip_compressed_every_codec() {
    let size = Vec3i::new(16, 16, 16);
    let all_raw = {
        let mut v = VoxelBuffer::new(size);
        for channel in 0..CHANNEL_COUNT {
            pseudo_random_channel(&mut v, channel, channel as u64);
        }
        v
    };
    let all_uniform = {
        let mut v = VoxelBuffer::with_depths(size, depths(0));
        for channel in 0..CHANNEL_COUNT {
            v.fill_channel(channel, 0x1111_1111_1111_1111 * channel as u64);
        }
        v
    };
    let volumes = [all_raw, all_uniform, mixed_volume(size)];

    for codec in codecs() {
        let name = codec.name();
        let mut s = VoxelBlockSerializer::new(codec);
        for v in &volumes {
            let env = s.serialize_and_compress(v).to_vec();
            let mut out = blank_like(v);
            s.decompress_and_deserialize(&env, &mut out).unwrap();
            assert!(out.same_voxels(v), "{name} round trip changed the volume");
        }
    }
}

#[test]
fn test_roundtrip_overwrites_previous_contents() {
    let v = mixed_volume(Vec3i::new(8, 8, 8));
    let mut s = default_serializer();
    let env = s.serialize_and_compress(&v).to_vec();

    // Destination starts with the opposite storage state on every channel.
    let mut out = blank_like(&v);
    for channel in 0..CHANNEL_COUNT {
        if v.channel_compression(channel) == ChannelCompression::Uniform {
            pseudo_random_channel(&mut out, channel, 99);
        } else {
            out.fill_channel(channel, 200);
        }
    }
    s.decompress_and_deserialize(&env, &mut out).unwrap();
    assert!(out.same_voxels(&v));
}

#[test]
fn test_roundtrip_uniform_wider_than_depth() {
    let mut v = VoxelBuffer::new(Vec3i::new(4, 4, 4));
    v.fill_channel(0, 300);
    v.set_channel_depth(1, Depth::Bits16);
    v.fill_channel(1, 0x1_0000);

    for codec in codecs() {
        let name = codec.name();
        let mut s = VoxelBlockSerializer::new(codec);
        let env = s.serialize_and_compress(&v).to_vec();
        let mut out = blank_like(&v);
        s.decompress_and_deserialize(&env, &mut out).unwrap();
        assert!(out.same_voxels(&v), "{name} round trip changed the volume");
        assert_eq!(out.cell_value_at_origin(0), 44);
        assert_eq!(out.cell_value_at_origin(1), 0);
    }
}

#[test]
fn test_lz4_compresses_uniform_heavy_volume() {
    let mut v = VoxelBuffer::new(Vec3i::new(32, 32, 32));
    terrain_channel(&mut v, 0);
    let mut s = default_serializer();
    let framed = s.serialize(&v).len();
    let compressed = s.serialize_and_compress(&v).len();
    assert!(
        compressed * 4 < framed,
        "lz4 should shrink a terrain block: compressed={compressed} framed={framed}"
    );
}

// ── size determinism ──────────────────────────────────────────────────────

#[test]
fn test_frame_size_matches_written_bytes() {
    let size = Vec3i::new(3, 5, 2);
    let mut s = VoxelBlockSerializer::new(Box::new(PassThroughCodec));

    // Every raw/uniform mask over the channels, with depths rotating per mask.
    for mask in 0u32..(1 << CHANNEL_COUNT) {
        let mut v = VoxelBuffer::with_depths(size, depths(mask as usize));
        for channel in 0..CHANNEL_COUNT {
            if mask & (1 << channel) != 0 {
                pseudo_random_channel(&mut v, channel, mask as u64);
            } else {
                v.fill_channel(channel, u64::MAX - channel as u64);
            }
        }
        let expected = frame_size(&v);
        assert_eq!(s.serialize(&v).len(), expected, "mask {mask:08b}");
    }
}

// ── concrete layout ───────────────────────────────────────────────────────

#[test]
fn test_two_cube_block_layout() {
    let mut v = VoxelBuffer::new(Vec3i::new(2, 2, 2));
    v.ensure_channel_materialized(0)
        .copy_from_slice(&[1, 1, 1, 1, 1, 1, 1, 2]);

    let mut s = default_serializer();
    let data = s.serialize(&v).to_vec();

    let mut expected = vec![0u8, 1, 1, 1, 1, 1, 1, 1, 2];
    for _ in 1..CHANNEL_COUNT {
        expected.extend_from_slice(&[1, 0]);
    }
    expected.extend_from_slice(&0x900d_f00du32.to_le_bytes());
    assert_eq!(data, expected);

    let mut out = VoxelBuffer::new(Vec3i::new(2, 2, 2));
    s.deserialize(&data, &mut out).unwrap();
    assert_eq!(out.raw_channel_bytes(0).unwrap(), &[1, 1, 1, 1, 1, 1, 1, 2]);
    for channel in 1..CHANNEL_COUNT {
        assert_eq!(out.channel_compression(channel), ChannelCompression::Uniform);
        assert_eq!(out.cell_value_at_origin(channel), 0);
    }
}

#[test]
fn test_uniform_value_widths() {
    let mut v = VoxelBuffer::new(Vec3i::new(2, 2, 2));
    v.fill_channel(0, 250);
    v.set_channel_depth(1, Depth::Bits64);
    v.fill_channel(1, 0x0102_0304_0506_0708);

    let mut s = default_serializer();
    let data = s.serialize(&v);
    assert_eq!(&data[..2], &[1, 250]);
    assert_eq!(&data[2..12], &[1, 8, 7, 6, 5, 4, 3, 2, 1, 1]);
}

// ── corruption ────────────────────────────────────────────────────────────

#[test]
fn test_any_marker_byte_flip_is_detected() {
    let v = mixed_volume(Vec3i::new(4, 4, 4));
    let mut s = default_serializer();
    let data = s.serialize(&v).to_vec();
    let marker = data.len() - BLOCK_TRAILING_MAGIC_SIZE;

    for i in marker..data.len() {
        for bit in 0..8 {
            let mut bad = data.clone();
            bad[i] ^= 1 << bit;
            let mut out = blank_like(&v);
            assert!(
                matches!(read_frame(&bad, &mut out), Err(Error::BadMagic { .. })),
                "flip of bit {bit} in byte {i} went unnoticed"
            );
        }
    }
}

#[test]
fn test_every_truncation_is_detected() {
    let v = mixed_volume(Vec3i::new(4, 4, 4));
    let mut s = default_serializer();
    let data = s.serialize(&v).to_vec();

    for len in 0..data.len() {
        let mut out = blank_like(&v);
        assert!(
            s.deserialize(&data[..len], &mut out).is_err(),
            "block truncated to {len} of {} bytes was accepted",
            data.len()
        );
    }
}

#[test]
fn test_unknown_tag_is_rejected() {
    let v = VoxelBuffer::new(Vec3i::new(2, 2, 2));
    let mut s = default_serializer();
    let mut data = s.serialize(&v).to_vec();
    // Channel 3's tag sits after three uniform records of two bytes each.
    data[6] = 2;

    let mut out = VoxelBuffer::new(Vec3i::new(2, 2, 2));
    match s.deserialize(&data, &mut out) {
        Err(Error::UnknownCompression { tag: 2, offset: 6 }) => {}
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn test_truncated_envelope_is_rejected_every_codec() {
    let v = mixed_volume(Vec3i::new(8, 8, 8));
    for codec in codecs() {
        let name = codec.name();
        let mut s = VoxelBlockSerializer::new(codec);
        let env = s.serialize_and_compress(&v).to_vec();

        for cut in [1, 2, env.len() / 2, env.len() - 4] {
            let mut out = blank_like(&v);
            assert!(
                s.decompress_and_deserialize(&env[..env.len() - cut], &mut out).is_err(),
                "{name}: envelope missing {cut} bytes was accepted"
            );
        }
    }
}

#[test]
fn test_header_length_mismatch_is_rejected() {
    let v = mixed_volume(Vec3i::new(8, 8, 8));
    let mut s = default_serializer();
    let mut env = s.serialize_and_compress(&v).to_vec();

    let declared = u32::from_le_bytes(env[..4].try_into().unwrap());
    env[..4].copy_from_slice(&(declared + 1).to_le_bytes());

    let mut out = blank_like(&v);
    let err = s.decompress_and_deserialize(&env, &mut out).unwrap_err();
    assert!(
        matches!(err, Error::LengthMismatch { .. } | Error::Decompression { .. }),
        "unexpected error {err:?}"
    );
}

#[test]
fn test_huge_declared_length_is_rejected() {
    let mut out = VoxelBuffer::new(Vec3i::new(4, 4, 4));
    let mut s = default_serializer();
    let env = [0xff, 0xff, 0xff, 0xff, 0x00];
    assert!(matches!(
        s.decompress_and_deserialize(&env, &mut out),
        Err(Error::FrameTooLarge { .. })
    ));
}

// ── streaming overload ────────────────────────────────────────────────────

#[test]
fn test_consecutive_blocks_from_one_stream() {
    let volumes: Vec<VoxelBuffer> = (0..5)
        .map(|i| {
            let mut v = mixed_volume(Vec3i::new(8, 8, 8));
            pseudo_random_channel(&mut v, 5, i);
            v
        })
        .collect();

    let mut s = default_serializer();
    let mut file = Vec::new();
    let mut lens = Vec::new();
    for v in &volumes {
        let env = s.serialize_and_compress(v);
        lens.push(env.len());
        file.extend_from_slice(env);
    }

    let mut src = std::io::Cursor::new(file);
    for (v, len) in volumes.iter().zip(lens) {
        let mut out = blank_like(v);
        s.decompress_and_deserialize_from(&mut src, len, &mut out).unwrap();
        assert!(out.same_voxels(v));
    }
    assert_eq!(src.position() as usize, src.get_ref().len());
}

#[test]
fn test_stream_short_read_fails() {
    let v = mixed_volume(Vec3i::new(8, 8, 8));
    let mut s = default_serializer();
    let env = s.serialize_and_compress(&v).to_vec();

    let mut src = std::io::Cursor::new(env[..env.len() - 10].to_vec());
    let mut out = blank_like(&v);
    assert!(matches!(
        s.decompress_and_deserialize_from(&mut src, env.len(), &mut out),
        Err(Error::ShortRead { .. })
    ));
}

#[test]
fn test_stream_oversized_count_is_rejected_before_reading() {
    let mut out = VoxelBuffer::new(Vec3i::new(4, 4, 4));
    let mut s = default_serializer();
    let mut src: &[u8] = &[1, 2, 3];
    match s.decompress_and_deserialize_from(&mut src, usize::MAX, &mut out) {
        Err(Error::FrameTooLarge { declared, .. }) => assert_eq!(declared, usize::MAX),
        other => panic!("unexpected result {other:?}"),
    }
    assert_eq!(src.len(), 3, "nothing should be consumed");
}
