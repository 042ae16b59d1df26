//! Command-line front end: cluster a CSV file or generate synthetic data.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use kselect::cluster::DEFAULT_MAX_ITER;
use kselect::generate;
use kselect::io::{read_point_set, write_points, write_result_to_path};
use kselect::{
    denormalize_result, normalize, AutoKSelector, ClusteringResult, CostModel, EmptyClusterPolicy,
    ExecutionMode, KEvaluation, Kmeans, PointSet, Summary,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "kselect", version, about = "K-means with cost-driven choice of k")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Cluster the points in a CSV file.
    Cluster(ClusterArgs),
    /// Write a synthetic point set.
    Generate(GenerateArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Sequential,
    Parallel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EmptyCluster {
    Farthest,
    Zero,
}

impl From<EmptyCluster> for EmptyClusterPolicy {
    fn from(e: EmptyCluster) -> Self {
        match e {
            EmptyCluster::Farthest => EmptyClusterPolicy::FarthestPoint,
            EmptyCluster::Zero => EmptyClusterPolicy::Zero,
        }
    }
}

#[derive(Debug, Args)]
struct ClusterArgs {
    /// Input CSV (`,` or `;` separated, header row required).
    #[arg(short, long)]
    input: PathBuf,

    /// Cluster with exactly this many centroids.
    #[arg(short, long, conflicts_with = "max_k", required_unless_present = "max_k")]
    k: Option<usize>,

    /// Search k = 1..=MAX_K for the cheapest clustering.
    #[arg(long)]
    max_k: Option<usize>,

    /// Cost of establishing one centroid.
    #[arg(long, default_value_t = 1.0)]
    build_cost: f64,

    /// Cost per unit of distance from a point to its centroid.
    #[arg(long, default_value_t = 1.0)]
    transport_cost: f64,

    #[arg(long, value_enum, default_value_t = Mode::Parallel)]
    mode: Mode,

    /// Chunks for parallel assignment (defaults to the thread count).
    #[arg(long)]
    workers: Option<usize>,

    #[arg(long, default_value_t = DEFAULT_MAX_ITER)]
    max_iter: usize,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = EmptyCluster::Farthest)]
    empty_cluster: EmptyCluster,

    /// Write the labelled points here.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report points and centroids in the input's units instead of [0, 1].
    #[arg(long)]
    original_scale: bool,

    /// Print the summary (and the search trace) as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    cost_model: CostModel,
    #[serde(flatten)]
    summary: Summary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    search: Vec<KEvaluation>,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    #[arg(short = 'n', long)]
    points: usize,

    #[arg(short, long, default_value_t = 2)]
    dim: usize,

    /// Number of blobs.
    #[arg(short, long, default_value_t = 4, conflicts_with = "statistical")]
    clusters: usize,

    /// Structureless uniform/normal mix instead of blobs.
    #[arg(long)]
    statistical: bool,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(short, long)]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Cluster(args) => cluster(args),
        Command::Generate(args) => generate(args),
    }
}

fn execution_mode(args: &ClusterArgs) -> Result<ExecutionMode> {
    Ok(match (args.mode, args.workers) {
        (Mode::Sequential, None) => ExecutionMode::Sequential,
        (Mode::Sequential, Some(_)) => bail!("--workers only applies to --mode parallel"),
        (Mode::Parallel, None) => ExecutionMode::parallel(),
        (Mode::Parallel, Some(workers)) => ExecutionMode::Parallel { workers },
    })
}

fn cluster(args: ClusterArgs) -> Result<()> {
    let mut points = read_point_set(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    info!(n = points.len(), dim = points.dimension(), "loaded points");
    if points.is_empty() {
        bail!("{} contains no usable points", args.input.display());
    }
    let bounds = normalize(&mut points);

    let cost_model = CostModel::new(args.build_cost, args.transport_cost)?;
    let mode = execution_mode(&args)?;

    let (mut result, search) = match (args.k, args.max_k) {
        (Some(k), _) => (run_fixed(&args, k, mode, &cost_model, &mut points)?, Vec::new()),
        (None, Some(max_k)) => run_search(&args, max_k, mode, cost_model, &points)?,
        (None, None) => bail!("one of --k or --max-k is required"),
    };
    if args.original_scale {
        denormalize_result(&mut result, &bounds);
    }

    let summary = result.summary();
    if args.json {
        let report = Report {
            cost_model,
            summary,
            search,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "k={} cost={:.4} time={}ms sizes={:?}",
            summary.k, summary.total_cost, summary.time_ms, summary.cluster_sizes
        );
    }

    if let Some(path) = &args.output {
        write_result_to_path(path, &result)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "wrote labelled points");
    }
    Ok(())
}

fn run_fixed(
    args: &ClusterArgs,
    k: usize,
    mode: ExecutionMode,
    cost_model: &CostModel,
    points: &mut PointSet,
) -> Result<ClusteringResult> {
    if k == 0 || k > points.len() {
        bail!("k must be between 1 and {}", points.len());
    }
    let mut engine = Kmeans::new(k)
        .with_max_iter(args.max_iter)
        .with_mode(mode)
        .with_empty_cluster_policy(args.empty_cluster.into());
    if let Some(seed) = args.seed {
        engine = engine.with_seed(seed);
    }

    let mut result = engine.run(points)?;
    result.total_cost = kselect::total_cost(&result.points, &result.centroids, cost_model)?;
    Ok(result)
}

fn run_search(
    args: &ClusterArgs,
    max_k: usize,
    mode: ExecutionMode,
    cost_model: CostModel,
    points: &PointSet,
) -> Result<(ClusteringResult, Vec<KEvaluation>)> {
    let mut selector = AutoKSelector::new(max_k, cost_model)
        .with_max_iter(args.max_iter)
        .with_mode(mode)
        .with_empty_cluster_policy(args.empty_cluster.into());
    if let Some(seed) = args.seed {
        selector = selector.with_seed(seed);
    }

    let selection = selector.select_with_trace(points)?;
    for eval in &selection.evaluated {
        info!(k = eval.k, cost = eval.cost, "search step");
    }
    Ok((selection.best, selection.evaluated))
}

fn generate(args: GenerateArgs) -> Result<()> {
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let points = if args.statistical {
        generate::statistical(args.points, args.dim, 0.0, 100.0, &mut rng)?
    } else {
        generate::blobs(args.points, args.dim, args.clusters, &mut rng)?
    };
    let points = PointSet::from_points(points)?;

    let file = File::create(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    write_points(BufWriter::new(file), &points)?;
    info!(
        n = points.len(),
        dim = points.dimension(),
        path = %args.output.display(),
        "wrote synthetic points"
    );
    Ok(())
}
