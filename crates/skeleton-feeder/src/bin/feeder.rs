//! `feeder` binary: inspect a skeleton archive and smoke-test the pipeline.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin feeder -- --data-path data/ntu/NTU60_CS.npz --split test
//! cargo run --bin feeder -- --config feeder.json --scores scores.npy --top-k 1 --top-k 5
//! cargo run --bin feeder -- --dry-run --bone --vel
//! ```

use clap::Parser;
use ndarray::Array2;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

use skeleton_feeder::config::FeederConfig;
use skeleton_feeder::dataset::{
    DataLoader, NtuFeeder, SkeletonDataset, SyntheticConfig, SyntheticSkeletonDataset,
};
use skeleton_feeder::error::{DatasetError, FeederResult};
use skeleton_feeder::metrics::top_k_many;

/// Command-line arguments for the feeder binary.
#[derive(Parser, Debug)]
#[command(
    name = "feeder",
    version,
    about = "Skeleton-sequence feeder: archive summary and pipeline smoke test",
    long_about = None
)]
struct Args {
    /// Path to a JSON configuration file.
    ///
    /// If not provided, the default `FeederConfig` is used.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the archive path from the config.
    #[arg(long, value_name = "FILE")]
    data_path: Option<PathBuf>,

    /// Override the split (`train` or `test`).
    #[arg(long)]
    split: Option<String>,

    /// Override the output window size (`<= 0` disables resizing).
    #[arg(long, allow_hyphen_values = true)]
    window_size: Option<i64>,

    /// Override the crop interval: one value for a fixed crop, two for a
    /// random one.
    #[arg(long, num_args = 1..=2, value_name = "P")]
    p_interval: Option<Vec<f64>>,

    /// Enable random rotation.
    #[arg(long, default_value_t = false)]
    random_rot: bool,

    /// Use the bone modality.
    #[arg(long, default_value_t = false)]
    bone: bool,

    /// Emit frame-to-frame motion.
    #[arg(long, default_value_t = false)]
    vel: bool,

    /// Keep only the first 100 samples.
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// Override the augmentation seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Batch size for the smoke-test epoch.
    #[arg(long, default_value_t = 32)]
    batch_size: usize,

    /// Shuffle the smoke-test epoch.
    #[arg(long, default_value_t = false)]
    shuffle: bool,

    /// `[N, num_classes]` score matrix (`.npy`) to evaluate against the
    /// split's labels.
    #[arg(long, value_name = "FILE")]
    scores: Option<PathBuf>,

    /// k values for top-k accuracy.
    #[arg(long = "top-k", default_values_t = vec![1usize, 5])]
    top_k: Vec<usize>,

    /// Use the deterministic synthetic dataset instead of an archive.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Number of synthetic samples when `--dry-run` is active.
    #[arg(long, default_value_t = 64)]
    dry_run_samples: usize,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let args = Args::parse();

    let log_level_filter = args
        .log_level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .unwrap_or(tracing_subscriber::filter::LevelFilter::INFO);

    tracing_subscriber::fmt()
        .with_max_level(log_level_filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    info!("Skeleton feeder v{}", skeleton_feeder::VERSION);

    if let Err(e) = run(args) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> FeederResult<()> {
    let config = build_config(&args)?;

    info!("Configuration validated successfully");
    info!("  split        : {}", config.split);
    info!("  window size  : {}", config.window_size);
    info!("  p_interval   : {:?}", config.p_interval);
    info!("  modality     : {:?}", config.modality());
    info!("  velocity     : {}", config.vel);
    info!("  random rot   : {} (theta={})", config.random_rot, config.rot_theta);

    let scores = args.scores.as_deref().map(read_scores).transpose()?;

    if args.dry_run {
        info!("DRY RUN: using synthetic dataset ({} samples)", args.dry_run_samples);
        let dataset = SyntheticSkeletonDataset::new(
            args.dry_run_samples,
            SyntheticConfig { feeder: config.clone(), ..SyntheticConfig::default() },
        )?;
        let valid: Vec<usize> = (0..dataset.len()).map(|i| dataset.valid_frames(i)).collect();
        let labels: Vec<usize> = (0..dataset.len()).map(|i| dataset.label(i)).collect();
        summarize(&dataset, &valid);
        run_epoch(&dataset, args.batch_size, args.shuffle, config.seed)?;
        if let Some(scores) = scores {
            report_top_k(&scores, &labels, &args.top_k)?;
        }
    } else {
        info!("Loading {} split from {}", config.split, config.data_path.display());
        let feeder = NtuFeeder::load(&config)?;
        if feeder.is_empty() {
            warn!("Split `{}` holds no samples", feeder.split());
            return Ok(());
        }
        info!("  classes      : {}", feeder.num_classes());
        info!("  raw frames   : {}", feeder.num_frames());
        if let Some(mean) = feeder.mean_map() {
            info!("  mean map     : {:?}", mean.shape());
        }
        summarize(&feeder, &feeder.valid_frame_counts());
        run_epoch(&feeder, args.batch_size, args.shuffle, config.seed)?;
        if let Some(scores) = scores {
            report_top_k(&scores, feeder.labels(), &args.top_k)?;
        }
    }

    Ok(())
}

/// Load the config file (or defaults) and apply CLI overrides.
fn build_config(args: &Args) -> FeederResult<FeederConfig> {
    let mut config = match args.config.as_deref() {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            FeederConfig::from_json(path)?
        }
        None => {
            info!("No configuration file provided, using defaults");
            FeederConfig::default()
        }
    };

    if let Some(path) = &args.data_path {
        config.data_path = path.clone();
    }
    if let Some(split) = &args.split {
        config.split = split.clone();
    }
    if let Some(window) = args.window_size {
        config.window_size = window;
    }
    if let Some(p) = &args.p_interval {
        config.p_interval = p.clone();
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.random_rot |= args.random_rot;
    config.bone |= args.bone;
    config.vel |= args.vel;
    config.debug |= args.debug;

    config.validate()?;
    Ok(config)
}

fn summarize(dataset: &dyn SkeletonDataset, valid: &[usize]) {
    info!("Dataset: {} ({} samples)", dataset.name(), dataset.len());
    if let (Some(min), Some(max)) = (valid.iter().min(), valid.iter().max()) {
        let mean = valid.iter().sum::<usize>() as f64 / valid.len() as f64;
        info!("  valid frames : min={min} mean={mean:.1} max={max}");
    }
    match dataset.get(0) {
        Ok(sample) => info!("  sample shape : {:?}", sample.data.shape()),
        Err(e) => warn!("Cannot assemble sample 0: {e}"),
    }
}

/// Iterate one epoch through the loader and report throughput.
fn run_epoch(
    dataset: &dyn SkeletonDataset,
    batch_size: usize,
    shuffle: bool,
    seed: u64,
) -> FeederResult<()> {
    let loader = DataLoader::new(dataset, batch_size.max(1), shuffle, seed);
    let start = Instant::now();
    let mut samples = 0usize;
    for batch in loader.iter() {
        samples += batch?.len();
    }
    let elapsed = start.elapsed().as_secs_f64();
    info!(
        "Epoch: {} batches, {samples} samples in {elapsed:.3}s ({:.1} samples/s)",
        loader.num_batches(),
        samples as f64 / elapsed.max(1e-9)
    );
    Ok(())
}

fn report_top_k(scores: &Array2<f32>, labels: &[usize], ks: &[usize]) -> FeederResult<()> {
    for (k, acc) in top_k_many(scores.view(), labels, ks)? {
        info!("  top-{k:<3}     : {:.2}%", acc * 100.0);
    }
    Ok(())
}

/// Read a 2-D `f32` or `f64` score matrix from a `.npy` file.
fn read_scores(path: &Path) -> FeederResult<Array2<f32>> {
    if !path.exists() {
        return Err(DatasetError::not_found(path, "score file does not exist").into());
    }
    let as_f32: Result<Array2<f32>, _> = ndarray_npy::read_npy(path);
    match as_f32 {
        Ok(scores) => Ok(scores),
        Err(first) => {
            let as_f64: Result<Array2<f64>, _> = ndarray_npy::read_npy(path);
            as_f64
                .map(|s| s.mapv(|v| v as f32))
                .map_err(|_| DatasetError::npz_read(path, first.to_string()).into())
        }
    }
}
