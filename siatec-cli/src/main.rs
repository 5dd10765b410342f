//! SIATEC command-line tool
//!
//! Discovers translational patterns in a CSV point set and compresses it.
//!
//! Usage:
//!   siatec mtps points.csv [--hashed] [--siar R | --compactness T --cardinality N]
//!   siatec tecs points.csv [--hashed] [--min-cr X [--prefilter]]
//!   siatec compress points.csv [--config run.yaml] [--algorithm forth] [--discovery hashed]
//!
//! Input has one point per row, one numeric component per column.
//! Set RUST_LOG (e.g. `RUST_LOG=siatec_core=trace`) for detailed logs.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;

use siatec_core::report::{EncodingReport, MtpReport, TecReport};
use siatec_core::{
    compress, discover_mtps, discover_tecs, io, siact, siar, siatec, siatech_pf, siatechf,
    Algorithm, CompressionConfig, DiscoveryStrategy, LoaderConfig, PointSet,
};

/// Translational pattern discovery and compression for point sets
#[derive(Parser, Debug)]
#[command(name = "siatec", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Skip malformed CSV rows instead of failing
    #[arg(long, global = true)]
    skip_malformed: bool,

    /// Log progress to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List maximal translatable patterns
    Mtps(MtpsArgs),
    /// List translational equivalence classes
    Tecs(TecsArgs),
    /// Cover the point set with TECs
    Compress(CompressArgs),
}

#[derive(Args, Debug)]
struct MtpsArgs {
    /// CSV file of points
    input: PathBuf,

    /// Use the hashed difference index
    #[arg(long)]
    hashed: bool,

    /// Only use vectors from the first R sub-diagonals (SIAR)
    #[arg(long, value_name = "R", conflicts_with = "compactness")]
    siar: Option<usize>,

    /// Split MTPs into runs at least this compact (SIACT)
    #[arg(long, value_name = "T", requires = "cardinality")]
    compactness: Option<f64>,

    /// Minimum run size when splitting by compactness
    #[arg(long, value_name = "N", requires = "compactness")]
    cardinality: Option<usize>,
}

#[derive(Args, Debug)]
struct TecsArgs {
    /// CSV file of points
    input: PathBuf,

    /// Use the hashed difference index
    #[arg(long)]
    hashed: bool,

    /// Drop TECs below this compression ratio
    #[arg(long, value_name = "X")]
    min_cr: Option<f64>,

    /// Skip patterns whose ratio bound is already too low (hashed only)
    #[arg(long, requires = "min_cr")]
    prefilter: bool,
}

#[derive(Args, Debug)]
struct CompressArgs {
    /// CSV file of points
    input: PathBuf,

    /// YAML run configuration; flags override it
    #[arg(long, short = 'c', env = "SIATEC_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, short = 'a', value_enum)]
    algorithm: Option<AlgorithmArg>,

    #[arg(long, short = 'd', value_enum)]
    discovery: Option<DiscoveryArg>,

    /// Forth: minimum new points per TEC
    #[arg(long)]
    c_min: Option<usize>,

    /// Forth: overlap fraction for secondaries
    #[arg(long)]
    sigma_min: Option<f64>,

    /// Drop candidate TECs below this compression ratio
    #[arg(long, value_name = "X")]
    min_cr: Option<f64>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum AlgorithmArg {
    Cosiatec,
    SiatecCompress,
    Forth,
}

impl From<AlgorithmArg> for Algorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Cosiatec => Algorithm::Cosiatec,
            AlgorithmArg::SiatecCompress => Algorithm::SiatecCompress,
            AlgorithmArg::Forth => Algorithm::Forth,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DiscoveryArg {
    Table,
    Hashed,
}

impl From<DiscoveryArg> for DiscoveryStrategy {
    fn from(arg: DiscoveryArg) -> Self {
        match arg {
            DiscoveryArg::Table => DiscoveryStrategy::VectorTable,
            DiscoveryArg::Hashed => DiscoveryStrategy::Hashed,
        }
    }
}

fn strategy(hashed: bool) -> DiscoveryStrategy {
    if hashed {
        DiscoveryStrategy::Hashed
    } else {
        DiscoveryStrategy::VectorTable
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "info,siatec_core=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let loader = if cli.skip_malformed {
        LoaderConfig::lenient()
    } else {
        LoaderConfig::default()
    };

    match &cli.command {
        Command::Mtps(args) => run_mtps(args, &loader, cli.json),
        Command::Tecs(args) => run_tecs(args, &loader, cli.json),
        Command::Compress(args) => run_compress(args, &loader, cli.json),
    }
}

fn load(input: &Path, loader: &LoaderConfig) -> Result<PointSet> {
    let points = io::load_csv(input, loader)
        .with_context(|| format!("Failed to load points from {}", input.display()))?;
    info!(points = points.len(), dimensions = ?points.dimensionality(), "loaded");
    Ok(points)
}

fn run_mtps(args: &MtpsArgs, loader: &LoaderConfig, json: bool) -> Result<()> {
    let points = load(&args.input, loader)?;
    let strategy = strategy(args.hashed);

    let mtps = match (args.siar, args.compactness, args.cardinality) {
        (Some(0), _, _) => bail!("--siar needs at least one sub-diagonal"),
        (Some(r), _, _) => siar(&points, r),
        (None, Some(threshold), Some(cardinality)) => {
            siact(&points, strategy, threshold, cardinality)
        }
        _ => discover_mtps(&points, strategy),
    };

    let reports: Vec<MtpReport> = mtps.iter().map(MtpReport::from).collect();
    print_all(&reports, json)
}

fn run_tecs(args: &TecsArgs, loader: &LoaderConfig, json: bool) -> Result<()> {
    let points = load(&args.input, loader)?;

    let tecs = match (args.min_cr, args.hashed, args.prefilter) {
        (None, hashed, _) => discover_tecs(&points, strategy(hashed)),
        (Some(min_cr), true, true) => siatechf(&points, min_cr),
        (Some(min_cr), true, false) => siatech_pf(&points, min_cr),
        (Some(_), false, true) => bail!("--prefilter only applies with --hashed"),
        (Some(min_cr), false, false) => siatec(&points)
            .into_iter()
            .filter(|tec| siatec_core::heuristics::compression_ratio(tec) >= min_cr)
            .collect(),
    };

    let reports: Vec<TecReport> = tecs.iter().map(TecReport::from).collect();
    print_all(&reports, json)
}

fn run_compress(args: &CompressArgs, loader: &LoaderConfig, json: bool) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => CompressionConfig::from_path(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => CompressionConfig::default(),
    };
    if let Some(algorithm) = args.algorithm {
        config.algorithm = algorithm.into();
    }
    if let Some(discovery) = args.discovery {
        config.discovery = discovery.into();
    }
    if let Some(c_min) = args.c_min {
        config.forth.c_min = c_min;
    }
    if let Some(sigma_min) = args.sigma_min {
        config.forth.sigma_min = sigma_min;
    }
    if args.min_cr.is_some() {
        config.min_compression_ratio = args.min_cr;
    }

    let points = load(&args.input, loader)?;
    let encoding = compress(&points, &config).context("Compression failed")?;
    let report = EncodingReport::new(&encoding, points.len());

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report);
    }
    Ok(())
}

fn print_all<T: Serialize + std::fmt::Display>(items: &[T], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
    } else {
        for item in items {
            println!("{}", item);
        }
    }
    Ok(())
}
