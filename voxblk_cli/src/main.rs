use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;
use xxhash_rust::xxh3::xxh3_64;

use voxblk_codecs::codec_by_name;
use voxblk_core::format::CHANNEL_COUNT;
use voxblk_core::{Depth, Vec3i, VoxelBlockSerializer, VoxelBuffer, VoxelVolume};

// ── CLI definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "voxblk",
    about = "Voxel block serializer — generate, inspect, and benchmark compressed voxel blocks",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write deterministic sample volumes as length-prefixed compressed blocks
    Generate {
        /// Destination file
        output: PathBuf,
        /// Edge length of each cubic volume, in cells
        #[arg(short, long, default_value_t = 16)]
        size: i32,
        /// Number of volumes to write
        #[arg(short = 'n', long, default_value_t = 16)]
        count: u64,
        /// Seed for the pseudo-random channels
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Codec to use: passthrough | zstd | lz4
        #[arg(short, long, default_value = "lz4")]
        codec: String,
        /// Zstd compression level (1–22, only used with --codec zstd)
        #[arg(long, default_value_t = 3)]
        zstd_level: i32,
        /// Bit depth of each channel, comma-separated (8, 16, 32 or 64)
        #[arg(long, default_value = DEFAULT_DEPTHS, value_parser = parse_depths)]
        depths: [Depth; CHANNEL_COUNT],
    },
    /// Read every block of a generated file and print what it holds
    Inspect {
        /// File written by `generate`
        input: PathBuf,
        /// Edge length the volumes were generated with
        #[arg(short, long, default_value_t = 16)]
        size: i32,
        /// Codec the file was written with
        #[arg(short, long, default_value = "lz4")]
        codec: String,
        /// Print per-channel details for each block
        #[arg(long)]
        channels: bool,
        /// Channel depths the file was generated with
        #[arg(long, default_value = DEFAULT_DEPTHS, value_parser = parse_depths)]
        depths: [Depth; CHANNEL_COUNT],
    },
    /// Time serialize+compress and decompress+deserialize round trips
    Bench {
        /// Edge length of each cubic volume, in cells
        #[arg(short, long, default_value_t = 16)]
        size: i32,
        /// Number of round trips
        #[arg(short = 'n', long, default_value_t = 1000)]
        count: u64,
        /// Seed for the pseudo-random channels
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Codec to use: passthrough | zstd | lz4
        #[arg(short, long, default_value = "lz4")]
        codec: String,
        /// Zstd compression level (1–22, only used with --codec zstd)
        #[arg(long, default_value_t = 3)]
        zstd_level: i32,
        /// Bit depth of each channel, comma-separated (8, 16, 32 or 64)
        #[arg(long, default_value = DEFAULT_DEPTHS, value_parser = parse_depths)]
        depths: [Depth; CHANNEL_COUNT],
    },
}

// ── Sample volumes ─────────────────────────────────────────────────────────

/// Default channel depths. The block format does not record depths, so
/// `inspect` has to be given the ones `generate` used.
const DEFAULT_DEPTHS: &str = "8,8,16,32,64,8,8,8";

/// Parse one bit depth per channel, e.g. `8,8,16,32,64,8,8,8`.
fn parse_depths(s: &str) -> Result<[Depth; CHANNEL_COUNT], String> {
    let mut depths = [Depth::default(); CHANNEL_COUNT];
    let mut parts = s.split(',');
    for (channel, depth) in depths.iter_mut().enumerate() {
        let part = parts
            .next()
            .ok_or_else(|| format!("expected {} depths, got {}", CHANNEL_COUNT, channel))?
            .trim();
        let bits: u32 = part.parse().map_err(|_| format!("channel {}: '{}' is not a number", channel, part))?;
        *depth = Depth::from_bits(bits)
            .ok_or_else(|| format!("channel {}: unsupported depth {} (use 8, 16, 32 or 64)", channel, bits))?;
    }
    if parts.next().is_some() {
        return Err(format!("expected {} depths, got more", CHANNEL_COUNT));
    }
    Ok(depths)
}

fn blank_volume(size: i32, depths: [Depth; CHANNEL_COUNT]) -> VoxelBuffer {
    VoxelBuffer::with_depths(Vec3i::splat(size), depths)
}

/// Terrain in channel 0, sparse noise in channel 1, uniform channels elsewhere.
fn sample_volume(size: i32, seed: u64, depths: [Depth; CHANNEL_COUNT]) -> VoxelBuffer {
    let mut v = blank_volume(size, depths);
    let mut rng = seed;
    let mut next = move || {
        rng = rng.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        rng >> 33
    };

    let base = (next() % size.max(1) as u64) as i32 / 2;
    for z in 0..size {
        for x in 0..size {
            let height = base + ((x * 3 + z * 5) % 7) / 2;
            for y in 0..height.min(size) {
                v.set_voxel(Vec3i::new(x, y, z), 0, 1 + (y == height - 1) as u64);
            }
            if next() % 8 == 0 {
                let y = (next() % size as u64) as i32;
                v.set_voxel(Vec3i::new(x, y, z), 1, next() & 0xff);
            }
        }
    }

    v.fill_channel(2, next());
    v.fill_channel(3, next());
    v.fill_channel(4, next() << 31 | next());
    v.compress_uniform_channels();
    v
}

// ── Helpers ────────────────────────────────────────────────────────────────

fn human_bytes(n: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut v = n as f64;
    let mut unit = 0;
    while v >= 1024.0 && unit < UNITS.len() - 1 {
        v /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", n)
    } else {
        format!("{:.2} {}", v, UNITS[unit])
    }
}

fn check_size(size: i32) -> anyhow::Result<()> {
    if !(1..=256).contains(&size) {
        anyhow::bail!("volume size {} out of range 1..=256", size);
    }
    Ok(())
}

/// Read the next record's u32 length prefix; `None` at a clean end of file.
fn read_record_len(src: &mut impl Read) -> anyhow::Result<Option<usize>> {
    let mut buf = [0u8; 4];
    match src.read_exact(&mut buf) {
        Ok(()) => Ok(Some(u32::from_le_bytes(buf) as usize)),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ── Subcommand implementations ─────────────────────────────────────────────

fn run_generate(
    output: PathBuf,
    size: i32,
    count: u64,
    seed: u64,
    codec: &str,
    zstd_level: i32,
    depths: [Depth; CHANNEL_COUNT],
) -> anyhow::Result<()> {
    check_size(size)?;
    let mut serializer = VoxelBlockSerializer::new(codec_by_name(codec, zstd_level)?);
    let mut dst = BufWriter::new(
        File::create(&output).with_context(|| format!("creating output file {:?}", output))?,
    );

    let t0 = Instant::now();
    let mut framed_total = 0u64;
    let mut written = 0u64;
    for i in 0..count {
        let volume = sample_volume(size, seed.wrapping_add(i), depths);
        let envelope = serializer.serialize_and_compress(&volume);
        dst.write_all(&(envelope.len() as u32).to_le_bytes())?;
        dst.write_all(envelope)?;
        written += 4 + envelope.len() as u64;
        framed_total += serializer.framed().len() as u64;
    }
    dst.flush()?;

    info!("wrote {} blocks to {:?}", count, output);
    eprintln!("  codec       : {}", serializer.codec().name());
    eprintln!("  volume      : {0}x{0}x{0}", size);
    eprintln!("  blocks      : {}", count);
    eprintln!("  framed      : {}", human_bytes(framed_total));
    eprintln!("  on disk     : {}", human_bytes(written));
    eprintln!("  ratio       : {:.2}x", framed_total as f64 / written.max(1) as f64);
    eprintln!("  elapsed     : {:.3}s", t0.elapsed().as_secs_f64());
    Ok(())
}

fn run_inspect(
    input: PathBuf,
    size: i32,
    codec: &str,
    show_channels: bool,
    depths: [Depth; CHANNEL_COUNT],
) -> anyhow::Result<()> {
    check_size(size)?;
    let mut serializer = VoxelBlockSerializer::new(codec_by_name(codec, 3)?);
    let mut src = BufReader::new(
        File::open(&input).with_context(|| format!("opening input file {:?}", input))?,
    );

    println!("=== Voxel blocks: {:?} ({}) ===", input, serializer.codec().name());
    println!();
    println!(
        "  {:>6}  {:>12}  {:>12}  {:>8}  {:>16}",
        "block", "envelope", "framed", "ratio", "xxh3"
    );
    println!("  {}", "-".repeat(62));

    let mut volume = blank_volume(size, depths);
    let mut index = 0u64;
    while let Some(len) = read_record_len(&mut src)? {
        serializer
            .decompress_and_deserialize_from(&mut src, len, &mut volume)
            .with_context(|| format!("block {} is unusable", index))?;
        let framed = serializer.framed();
        println!(
            "  {:>6}  {:>12}  {:>12}  {:>7.2}x  {:016x}",
            index,
            human_bytes(len as u64),
            human_bytes(framed.len() as u64),
            framed.len() as f64 / len.max(1) as f64,
            xxh3_64(framed)
        );
        if show_channels {
            for channel in 0..CHANNEL_COUNT {
                println!(
                    "          ch{}  {:<8} {:>2}-bit  origin={}",
                    channel,
                    volume.channel_compression(channel).name(),
                    volume.channel_depth(channel).bits(),
                    volume.cell_value_at_origin(channel)
                );
            }
        }
        index += 1;
    }

    println!();
    println!("  blocks         : {}", index);
    Ok(())
}

fn run_bench(
    size: i32,
    count: u64,
    seed: u64,
    codec: &str,
    zstd_level: i32,
    depths: [Depth; CHANNEL_COUNT],
) -> anyhow::Result<()> {
    check_size(size)?;
    if count == 0 {
        anyhow::bail!("nothing to benchmark with --count 0");
    }
    let mut serializer = VoxelBlockSerializer::new(codec_by_name(codec, zstd_level)?);
    let volumes: Vec<VoxelBuffer> = (0..count.min(64)).map(|i| sample_volume(size, seed.wrapping_add(i), depths)).collect();

    eprintln!(
        "benchmarking {} round trips of {}^3 volumes with {}...",
        count,
        size,
        serializer.codec().name()
    );

    let mut out = blank_volume(size, depths);
    let mut envelope = Vec::new();
    let mut framed_total = 0u64;
    let mut compressed_total = 0u64;
    let mut encode_us = 0u128;
    let mut decode_us = 0u128;

    for i in 0..count as usize {
        let volume = &volumes[i % volumes.len()];

        let t = Instant::now();
        envelope.clear();
        envelope.extend_from_slice(serializer.serialize_and_compress(volume));
        encode_us += t.elapsed().as_micros();
        let fingerprint = xxh3_64(serializer.framed());
        framed_total += serializer.framed().len() as u64;
        compressed_total += envelope.len() as u64;

        let t = Instant::now();
        serializer.decompress_and_deserialize(&envelope, &mut out)?;
        decode_us += t.elapsed().as_micros();

        if !out.same_voxels(volume) || xxh3_64(serializer.framed()) != fingerprint {
            anyhow::bail!("round trip {} did not reproduce the volume", i);
        }
    }

    let per_sec = |us: u128| framed_total as f64 / (us.max(1) as f64 / 1e6);
    println!();
    println!("=== Round-trip benchmark ===");
    println!("  round trips : {}", count);
    println!("  framed      : {}", human_bytes(framed_total));
    println!("  compressed  : {}", human_bytes(compressed_total));
    println!("  ratio       : {:.2}x", framed_total as f64 / compressed_total.max(1) as f64);
    println!("  encode      : {}/s", human_bytes(per_sec(encode_us) as u64));
    println!("  decode      : {}/s", human_bytes(per_sec(decode_us) as u64));
    println!("  per block   : {:.1} µs encode, {:.1} µs decode", encode_us as f64 / count as f64, decode_us as f64 / count as f64);
    Ok(())
}

// ── Entry point ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate {
            output,
            size,
            count,
            seed,
            codec,
            zstd_level,
            depths,
        } => run_generate(output, size, count, seed, &codec, zstd_level, depths),
        Commands::Inspect {
            input,
            size,
            codec,
            channels,
            depths,
        } => run_inspect(input, size, &codec, channels, depths),
        Commands::Bench {
            size,
            count,
            seed,
            codec,
            zstd_level,
            depths,
        } => run_bench(size, count, seed, &codec, zstd_level, depths),
    }
}
