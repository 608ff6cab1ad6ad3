use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use mian_blocks::{BlockTable, DEFAULT_BLOCK_TYPES};
use mian_region::{BlockExtractor, MarkerFraming};
use mian_stats::{BlockSet, Scanner};

mod output;
mod world;

use output::{AreaDocument, LayerDocument};
use world::World;

/// How the block array is located inside a decompressed chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Framing {
    /// Walk the NBT tree to Level.Blocks
    Nbt,
    /// Scan for the "Blocks" marker, skip the 4-byte length
    LengthPrefixed,
    /// Scan for the "Blocks" marker, array follows immediately
    Bare,
}

impl From<Framing> for BlockExtractor {
    fn from(framing: Framing) -> Self {
        match framing {
            Framing::Nbt => BlockExtractor::TagWalk,
            Framing::LengthPrefixed => BlockExtractor::MarkerScan(MarkerFraming::LengthPrefixed),
            Framing::Bare => BlockExtractor::MarkerScan(MarkerFraming::Bare),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "mian", version, about = "Graph block types to altitude in a Minecraft save game")]
pub struct Args {
    /// Save game directory
    #[arg(required_unless_present = "list")]
    pub world: Option<PathBuf>,

    /// Block types to graph: names, name fragments or two hex digits
    #[arg(short, long, env = "MIAN_BLOCKS", value_delimiter = ',')]
    pub blocks: Vec<String>,

    /// List the known block types and exit
    #[arg(short, long)]
    pub list: bool,

    /// Graph The Nether instead of the overworld
    #[arg(short, long)]
    pub nether: bool,

    /// Map per-chunk counts of the first block type instead of altitudes
    #[arg(long)]
    pub area: bool,

    /// Ask for a logarithmic Y axis
    #[arg(long)]
    pub log: bool,

    /// Write the JSON document here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, env = "MIAN_FRAMING", default_value = "nbt")]
    pub framing: Framing,

    /// Worker threads (defaults to one per core)
    #[arg(short, long, env = "MIAN_JOBS")]
    pub jobs: Option<usize>,

    /// JSON block table replacing the built-in one
    #[arg(long, env = "MIAN_TABLE")]
    pub table: Option<PathBuf>,

    /// Print scan statistics to stderr when done
    #[arg(long)]
    pub stats: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        log::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let table = match &args.table {
        Some(path) => BlockTable::load(path)?,
        None => BlockTable::builtin(),
    };

    if args.list {
        for line in table.listing() {
            println!("{}", line);
        }
        return Ok(());
    }

    let Some(dir) = &args.world else {
        bail!("No save game directory given");
    };

    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .context("configuring worker pool")?;
    }

    let ids = if args.blocks.is_empty() {
        table.resolve(DEFAULT_BLOCK_TYPES)
    } else {
        table.resolve(&args.blocks)
    };
    if ids.is_empty() {
        bail!("No block types to graph");
    }

    let world = World::new(dir, args.nether);
    let paths = world.region_files()?;
    if paths.is_empty() {
        bail!("Invalid savegame path {}", dir.display());
    }

    let title = format!("{} - mian {}", world.title(), env!("CARGO_PKG_VERSION"));
    let scanner = Scanner::new(args.framing.into());
    scan(&scanner, args, &table, &ids, &paths, title)?;

    if args.stats {
        eprintln!("{}", scanner.metrics().generate_report());
    }
    Ok(())
}

fn scan(
    scanner: &Scanner,
    args: &Args,
    table: &BlockTable,
    ids: &[u8],
    paths: &[PathBuf],
    title: String,
) -> Result<()> {
    let output = args.output.as_deref();
    if args.area {
        let block = ids[0];
        if ids.len() > 1 {
            log::warn!("Area map shows only the first block type, {}", table.label(block));
        }
        let map = scanner.area(paths, block)?;
        log::info!("{} chunks contain {}", map.filled(), table.label(block));
        let doc = AreaDocument::new(title, table, &map, scanner.summary());
        output::write(&doc, output)
    } else {
        let histogram = scanner.layers(paths, &BlockSet::new(ids.iter().copied()))?;
        log::info!("Counted {} chunks", histogram.chunks());
        let doc = LayerDocument::new(title, table, &histogram, args.log, scanner.summary());
        output::write(&doc, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mian_region::fixture::RegionBuilder;
    use mian_region::{BLOCKS_PER_CHUNK, Compression, RegionPos};
    use std::path::Path;

    fn world_with_gold(dir: &Path) -> PathBuf {
        let world = dir.join("World1");
        let region = world.join("region");
        std::fs::create_dir_all(&region).unwrap();

        let mut blocks = vec![1u8; BLOCKS_PER_CHUNK];
        blocks[5] = 0x0E;
        blocks[5 + 128] = 0x0E;
        RegionBuilder::new()
            .chunk(0, 0, &blocks, Compression::Zlib)
            .chunk(1, 2, &vec![1u8; BLOCKS_PER_CHUNK], Compression::Gzip)
            .write_to(&region, RegionPos::new(0, 0));
        world
    }

    #[test]
    fn test_args() {
        let args =
            Args::try_parse_from(["mian", "World1", "-b", "gold,0e", "--area", "-j", "2"]).unwrap();
        assert_eq!(args.world, Some(PathBuf::from("World1")));
        assert_eq!(args.blocks, vec!["gold", "0e"]);
        assert!(args.area);
        assert_eq!(args.jobs, Some(2));
        assert_eq!(args.framing, Framing::Nbt);

        let args = Args::try_parse_from(["mian", "--list"]).unwrap();
        assert!(args.list);
        assert!(args.world.is_none());

        assert!(Args::try_parse_from(["mian"]).is_err());
        assert!(Args::try_parse_from(["mian", "w", "--framing", "weird"]).is_err());
    }

    #[test]
    fn test_framing() {
        assert_eq!(BlockExtractor::from(Framing::Nbt), BlockExtractor::TagWalk);
        assert_eq!(
            BlockExtractor::from(Framing::Bare),
            BlockExtractor::MarkerScan(MarkerFraming::Bare)
        );
    }

    #[test]
    fn test_layers_run() {
        let dir = tempfile::tempdir().unwrap();
        let world = world_with_gold(dir.path());
        let out = dir.path().join("layers.json");
        let args = Args::try_parse_from([
            "mian",
            world.to_str().unwrap(),
            "-b",
            "gold ore",
            "-o",
            out.to_str().unwrap(),
        ])
        .unwrap();
        run(&args).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert!(json["title"].as_str().unwrap().starts_with("World1 - mian "));
        assert_eq!(json["series"][0]["label"], "Gold ore");
        assert_eq!(json["series"][0]["counts"][5], 2);
        assert_eq!(json["summary"]["chunks_decoded"], 2);
    }

    #[test]
    fn test_area_run() {
        let dir = tempfile::tempdir().unwrap();
        let world = world_with_gold(dir.path());
        let out = dir.path().join("area.json");
        let args = Args::try_parse_from([
            "mian",
            world.to_str().unwrap(),
            "-b",
            "0e",
            "--area",
            "-o",
            out.to_str().unwrap(),
        ])
        .unwrap();
        run(&args).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(json["id"], "0E");
        assert_eq!(json["grid"][0][0], 2);
        assert_eq!(json["grid"][2][1], 0);
        assert_eq!(json["grid"][5][5], -10);
    }

    #[test]
    fn test_invalid_world() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args::try_parse_from(["mian", dir.path().to_str().unwrap()]).unwrap();
        let err = run(&args).unwrap_err();
        assert!(err.to_string().contains("Invalid savegame path"));
    }

    #[test]
    fn test_unknown_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let world = world_with_gold(dir.path());
        let args =
            Args::try_parse_from(["mian", world.to_str().unwrap(), "-b", "foobar"]).unwrap();
        assert!(run(&args).is_err());
    }
}
