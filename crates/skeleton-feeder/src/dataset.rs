//! Dataset abstractions and concrete implementations for skeleton sequences.
//!
//! This module defines the [`SkeletonDataset`] trait plus two concrete
//! implementations:
//!
//! - [`NtuFeeder`]: loads one split of an NTU RGB+D style `.npz` archive.
//! - [`SyntheticSkeletonDataset`]: generates deterministic skeletons from an
//!   analytic model; useful for unit tests, integration tests, benchmarks and
//!   dry runs.
//!
//! A [`DataLoader`] wraps any [`SkeletonDataset`] and provides batched
//! iteration with optional deterministic shuffle (seeded).
//!
//! # Archive layout expected by `NtuFeeder`
//!
//! ```text
//! archive.npz
//!   x_train.npy   # [N, T, 150]  float32/float64, 150 = 2 persons × 25 joints × 3
//!   y_train.npy   # [N, num_classes] one-hot
//!   x_test.npy
//!   y_test.npy
//! ```
//!
//! Each frame row is person-major, then joint, then coordinate. Frames after
//! the end of a sequence are zero.
//!
//! # Example – synthetic dataset
//!
//! ```rust
//! use skeleton_feeder::dataset::{SkeletonDataset, SyntheticConfig, SyntheticSkeletonDataset};
//!
//! let ds = SyntheticSkeletonDataset::new(16, SyntheticConfig::default()).unwrap();
//! assert_eq!(ds.len(), 16);
//! let sample = ds.get(0).unwrap();
//! assert_eq!(sample.data.shape(), &[3, 64, 25, 2]);
//! ```

use ndarray::{
    s, stack, Array2, Array3, Array4, Array5, ArrayD, ArrayView2, ArrayView3, ArrayView4, Axis,
    Ix2, Ix3,
};
use ndarray_npy::NpzReader;
use rand::{rngs::StdRng, SeedableRng};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::assembler::SampleAssembler;
use crate::config::{FeederConfig, Split};
use crate::error::{ConfigError, DatasetError, FeederError, FeederResult};
use crate::geometry::valid_frame_count;
use crate::metrics::top_k;
use crate::skeleton::{FRAME_WIDTH, NUM_COORDS, NUM_JOINTS, NUM_PERSONS};

/// Number of samples kept when `debug` is set.
pub const DEBUG_SAMPLES: usize = 100;

// ---------------------------------------------------------------------------
// SkeletonSample
// ---------------------------------------------------------------------------

/// One assembled training example.
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonSample {
    /// Transformed skeleton tensor.
    ///
    /// Shape: `[C, T', V, P]` = `[3, window, 25, 2]`.
    pub data: Array4<f32>,

    /// Action class id.
    pub label: usize,

    /// Position of the sample in its dataset.
    pub index: usize,
}

// ---------------------------------------------------------------------------
// SkeletonDataset trait
// ---------------------------------------------------------------------------

/// Common interface for all skeleton datasets.
///
/// Implementations must be `Send + Sync` so they can be shared across
/// data-loading threads without additional synchronisation.
pub trait SkeletonDataset: Send + Sync {
    /// Total number of samples in this dataset.
    fn len(&self) -> usize;

    /// Assemble the sample at position `idx`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::IndexOutOfBounds`] when `idx >= self.len()`.
    fn get(&self, idx: usize) -> Result<SkeletonSample, DatasetError>;

    /// Returns `true` when the dataset contains no samples.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// Seed of the augmentation RNG for sample `idx` in `epoch`.
fn sample_seed(seed: u64, epoch: u64, idx: usize) -> u64 {
    seed ^ epoch.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (idx as u64).wrapping_add(1).wrapping_mul(0xBF58_476D_1CE4_E5B9)
}

// ---------------------------------------------------------------------------
// DataLoader
// ---------------------------------------------------------------------------

/// A stacked mini-batch.
#[derive(Debug, Clone)]
pub struct Batch {
    /// Samples stacked along a new leading axis: `[B, C, T', V, P]`.
    pub data: Array5<f32>,
    /// Label per sample.
    pub labels: Vec<usize>,
    /// Dataset index per sample.
    pub indices: Vec<usize>,
}

impl Batch {
    /// Number of samples in the batch.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` for a batch without samples.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Batched, optionally-shuffled iterator over a [`SkeletonDataset`].
///
/// The shuffle order is fully deterministic: given the same `seed` and dataset
/// length the iteration order is always identical.
pub struct DataLoader<'a> {
    dataset: &'a dyn SkeletonDataset,
    batch_size: usize,
    shuffle: bool,
    seed: u64,
}

impl<'a> DataLoader<'a> {
    /// Create a new `DataLoader`.
    ///
    /// # Parameters
    ///
    /// - `dataset`    – the underlying dataset.
    /// - `batch_size` – samples per batch; the last batch may be smaller.
    /// - `shuffle`    – shuffle indices deterministically using `seed`.
    /// - `seed`       – fixed seed for the shuffle.
    ///
    /// # Panics
    ///
    /// Panics if `batch_size == 0`.
    pub fn new(dataset: &'a dyn SkeletonDataset, batch_size: usize, shuffle: bool, seed: u64) -> Self {
        assert!(batch_size > 0, "batch_size must be > 0");
        DataLoader { dataset, batch_size, shuffle, seed }
    }

    /// Number of complete (or partial) batches yielded per epoch.
    pub fn num_batches(&self) -> usize {
        (self.dataset.len() + self.batch_size - 1) / self.batch_size
    }

    /// Return an iterator over stacked batches.
    ///
    /// Samples that fail to load are skipped with a `warn!`. A batch whose
    /// samples have different shapes yields [`FeederError::ShapeMismatch`].
    pub fn iter(&self) -> DataLoaderIter<'_> {
        let n = self.dataset.len();
        let mut indices: Vec<usize> = (0..n).collect();
        if self.shuffle {
            xorshift_shuffle(&mut indices, self.seed);
        }
        DataLoaderIter { dataset: self.dataset, indices, batch_size: self.batch_size, cursor: 0 }
    }
}

/// Iterator returned by [`DataLoader::iter`].
pub struct DataLoaderIter<'a> {
    dataset: &'a dyn SkeletonDataset,
    indices: Vec<usize>,
    batch_size: usize,
    cursor: usize,
}

impl<'a> Iterator for DataLoaderIter<'a> {
    type Item = FeederResult<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.cursor >= self.indices.len() {
                return None;
            }
            let end = (self.cursor + self.batch_size).min(self.indices.len());
            let batch_indices = &self.indices[self.cursor..end];
            self.cursor = end;

            let mut samples = Vec::with_capacity(batch_indices.len());
            for &idx in batch_indices {
                match self.dataset.get(idx) {
                    Ok(sample) => samples.push(sample),
                    Err(e) => warn!("Skipping sample {idx}: {e}"),
                }
            }
            if !samples.is_empty() {
                return Some(stack_samples(&samples));
            }
        }
    }
}

/// Stack samples of identical shape into a [`Batch`].
fn stack_samples(samples: &[SkeletonSample]) -> FeederResult<Batch> {
    let views: Vec<ArrayView4<'_, f32>> = samples.iter().map(|s| s.data.view()).collect();
    let data = stack(Axis(0), &views).map_err(|_| {
        let first = samples[0].data.shape().to_vec();
        let other = samples
            .iter()
            .map(|s| s.data.shape().to_vec())
            .find(|shape| *shape != first)
            .unwrap_or_else(|| first.clone());
        FeederError::shape_mismatch(first, other)
    })?;
    Ok(Batch {
        data,
        labels: samples.iter().map(|s| s.label).collect(),
        indices: samples.iter().map(|s| s.index).collect(),
    })
}

// ---------------------------------------------------------------------------
// Xorshift shuffle (deterministic, no external RNG state)
// ---------------------------------------------------------------------------

/// In-place Fisher-Yates shuffle driven by a 64-bit Xorshift PRNG seeded with
/// `seed`. Reproducible across platforms.
fn xorshift_shuffle(indices: &mut [usize], seed: u64) {
    let n = indices.len();
    if n <= 1 {
        return;
    }
    let mut state = if seed == 0 { 0x853c49e6748fea9b } else { seed };
    for i in (1..n).rev() {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let j = (state as usize) % (i + 1);
        indices.swap(i, j);
    }
}

// ---------------------------------------------------------------------------
// Normalisation statistics
// ---------------------------------------------------------------------------

/// Per-channel, per-joint statistics over a whole split.
///
/// Both maps have shape `[C, 1, V, 1]` so they broadcast against a
/// `[C, T, V, P]` sample.
#[derive(Debug, Clone, PartialEq)]
pub struct NormStats {
    /// Mean over samples, frames and persons.
    pub mean_map: Array4<f32>,
    /// Population standard deviation over samples, frames and persons.
    pub std_map: Array4<f32>,
}

impl NormStats {
    /// Compute statistics over `[N, T, P·V·C]` archive rows.
    pub fn compute(x: ArrayView3<'_, f32>) -> Self {
        let (n, n_t, _) = x.dim();
        let count = (n * n_t * NUM_PERSONS) as f64;
        let mut mean_map = Array4::zeros((NUM_COORDS, 1, NUM_JOINTS, 1));
        let mut std_map = Array4::zeros((NUM_COORDS, 1, NUM_JOINTS, 1));
        if count == 0.0 {
            return NormStats { mean_map, std_map };
        }

        // column k of a frame row holds (p, v, c) = (k / 75, k / 3 % 25, k % 3)
        let cell = |k: usize| ((k / NUM_COORDS) % NUM_JOINTS, k % NUM_COORDS);

        let mut sum = [[0.0f64; NUM_JOINTS]; NUM_COORDS];
        for row in x.rows() {
            for (k, &value) in row.iter().enumerate() {
                let (v, c) = cell(k);
                sum[c][v] += value as f64;
            }
        }
        let mean = sum.map(|per_joint| per_joint.map(|s| s / count));

        let mut sq = [[0.0f64; NUM_JOINTS]; NUM_COORDS];
        for row in x.rows() {
            for (k, &value) in row.iter().enumerate() {
                let (v, c) = cell(k);
                sq[c][v] += (value as f64 - mean[c][v]).powi(2);
            }
        }

        for c in 0..NUM_COORDS {
            for v in 0..NUM_JOINTS {
                mean_map[[c, 0, v, 0]] = mean[c][v] as f32;
                std_map[[c, 0, v, 0]] = (sq[c][v] / count).sqrt() as f32;
            }
        }
        NormStats { mean_map, std_map }
    }
}

// ---------------------------------------------------------------------------
// NtuFeeder
// ---------------------------------------------------------------------------

/// One split of a packed skeleton archive, assembled sample by sample.
///
/// The whole split is held in memory once, in archive layout `[N, T, 150]`.
/// [`NtuFeeder::raw_sample`] reinterprets one sample as a `[C, T, V, P]`
/// view without copying. [`SkeletonDataset::get`] only reads the data, so a
/// feeder can be shared between
/// threads. Augmentation randomness is derived from `(seed, epoch, index)`;
/// call [`NtuFeeder::set_epoch`] between epochs to draw new augmentations.
pub struct NtuFeeder {
    data: Array3<f32>,
    labels: Vec<usize>,
    num_classes: usize,
    split: Split,
    assembler: SampleAssembler,
    norm: Option<NormStats>,
    seed: u64,
    epoch: u64,
    source: PathBuf,
}

impl NtuFeeder {
    /// Load the configured split from the archive at `config.data_path`.
    ///
    /// # Errors
    ///
    /// - [`FeederError::Config`] for an invalid split or other bad settings.
    /// - [`FeederError::Dataset`] when the archive is missing, lacks the
    ///   split's arrays, or holds arrays of the wrong shape.
    pub fn load(config: &FeederConfig) -> FeederResult<Self> {
        config.validate()?;
        let split = config.split()?;
        let path = config.data_path.as_path();

        if !path.exists() {
            return Err(DatasetError::not_found(path, "archive does not exist").into());
        }
        let file = File::open(path).map_err(|e| DatasetError::io_error(path, e))?;
        let mut npz = NpzReader::new(file)
            .map_err(|e| DatasetError::npz_read(path, e.to_string()))?;
        let names = npz.names().map_err(|e| DatasetError::npz_read(path, e.to_string()))?;
        debug!("Archive {} holds {:?}", path.display(), names);

        let x = read_member(&mut npz, &names, &split.data_key(), path)?;
        let y = read_member(&mut npz, &names, &split.label_key(), path)?;

        let x = x.into_dimensionality::<Ix3>().map_err(|_| {
            DatasetError::invalid_format(path, format!("`{}` must be 3-D [N, T, {FRAME_WIDTH}]", split.data_key()))
        })?;
        let y = y.into_dimensionality::<Ix2>().map_err(|_| {
            DatasetError::invalid_format(path, format!("`{}` must be 2-D [N, num_classes]", split.label_key()))
        })?;

        Self::from_arrays(x, y, config)
    }

    /// Build a feeder from arrays already in memory.
    ///
    /// `x` is `[N, T, 150]` in archive layout and `y` is `[N, num_classes]`
    /// one-hot. `config.data_path` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Same as [`NtuFeeder::load`], minus file access.
    pub fn from_arrays(mut x: Array3<f32>, y: Array2<f32>, config: &FeederConfig) -> FeederResult<Self> {
        config.validate()?;
        let split = config.split()?;
        let source = config.data_path.clone();

        for flag in config.ignored_flags() {
            warn!("`{flag}` is set but has no effect on the feeder");
        }

        let (n, n_t, width) = x.dim();
        if width != FRAME_WIDTH {
            return Err(DatasetError::invalid_format(
                &source,
                format!("frames must hold {FRAME_WIDTH} values, got {width}"),
            )
            .into());
        }
        if y.nrows() != n {
            return Err(DatasetError::invalid_format(
                &source,
                format!("{} label rows for {n} samples", y.nrows()),
            )
            .into());
        }

        let keep = if config.debug { n.min(DEBUG_SAMPLES) } else { n };
        let labels = labels_from_one_hot(y.slice(s![..keep, ..]), &source)?;

        // a debug prefix is small; copying it releases the full split
        if keep < n {
            x = x.slice(s![..keep, .., ..]).to_owned();
        }
        if !x.is_standard_layout() {
            x = x.as_standard_layout().into_owned();
        }
        let norm = config.normalization.then(|| NormStats::compute(x.view()));

        info!(
            "NtuFeeder: {} split, {} samples, {} frames, {} classes (source={})",
            split,
            keep,
            n_t,
            y.ncols(),
            source.display()
        );

        Ok(NtuFeeder {
            data: x,
            labels,
            num_classes: y.ncols(),
            split,
            assembler: SampleAssembler::from_config(config)?,
            norm,
            seed: config.seed,
            epoch: 0,
            source,
        })
    }

    /// Re-key augmentation randomness for a new epoch.
    pub fn set_epoch(&mut self, epoch: u64) {
        self.epoch = epoch;
    }

    /// Current epoch.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Loaded split.
    pub fn split(&self) -> Split {
        self.split
    }

    /// Archive the data came from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Width of the one-hot label matrix.
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Raw frame count `T` of every sample.
    pub fn num_frames(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    /// Labels in sample order.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// `"{split}_{idx}"`, or `None` when out of range.
    pub fn sample_name(&self, idx: usize) -> Option<String> {
        (idx < self.len()).then(|| format!("{}_{idx}", self.split))
    }

    /// Untransformed `[C, T, V, P]` sequence at `idx`, as a strided view
    /// into the loaded split.
    pub fn raw_sample(&self, idx: usize) -> Option<ArrayView4<'_, f32>> {
        if idx >= self.len() {
            return None;
        }
        canonical_view(self.data.index_axis(Axis(0), idx))
    }

    /// Valid frame count of every sample.
    pub fn valid_frame_counts(&self) -> Vec<usize> {
        (0..self.len())
            .filter_map(|idx| self.raw_sample(idx))
            .map(valid_frame_count)
            .collect()
    }

    /// The per-sample pipeline.
    pub fn assembler(&self) -> &SampleAssembler {
        &self.assembler
    }

    /// Normalisation statistics, present when `normalization` was set.
    pub fn norm_stats(&self) -> Option<&NormStats> {
        self.norm.as_ref()
    }

    /// `[C, 1, V, 1]` mean map, present when `normalization` was set.
    pub fn mean_map(&self) -> Option<&Array4<f32>> {
        self.norm.as_ref().map(|n| &n.mean_map)
    }

    /// `[C, 1, V, 1]` std map, present when `normalization` was set.
    pub fn std_map(&self) -> Option<&Array4<f32>> {
        self.norm.as_ref().map(|n| &n.std_map)
    }

    /// Top-k accuracy of `scores` (`[N, num_classes]`) against this split's
    /// labels. See [`crate::metrics`] for tie handling.
    ///
    /// # Errors
    ///
    /// Returns [`FeederError::ShapeMismatch`] when the row count differs from
    /// [`SkeletonDataset::len`].
    pub fn top_k(&self, scores: &Array2<f32>, k: usize) -> FeederResult<f64> {
        top_k(scores.view(), &self.labels, k)
    }

    /// Assemble sample `idx` with an explicit RNG.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::IndexOutOfBounds`] when `idx >= len()`.
    pub fn get_with_rng<R: rand::Rng + ?Sized>(
        &self,
        idx: usize,
        rng: &mut R,
    ) -> Result<SkeletonSample, DatasetError> {
        let raw = self
            .raw_sample(idx)
            .ok_or(DatasetError::IndexOutOfBounds { idx, len: self.len() })?;
        Ok(SkeletonSample { data: self.assembler.assemble(raw, rng), label: self.labels[idx], index: idx })
    }
}

impl SkeletonDataset for NtuFeeder {
    fn len(&self) -> usize {
        self.labels.len()
    }

    fn get(&self, idx: usize) -> Result<SkeletonSample, DatasetError> {
        let mut rng = StdRng::seed_from_u64(sample_seed(self.seed, self.epoch, idx));
        self.get_with_rng(idx, &mut rng)
    }

    fn name(&self) -> &str {
        "NtuFeeder"
    }
}

// ---------------------------------------------------------------------------
// Archive helpers
// ---------------------------------------------------------------------------

/// Read archive member `key` (with or without `.npy`) as `f32`, accepting
/// `f32`, `f64` and `i64` storage.
fn read_member(
    npz: &mut NpzReader<File>,
    names: &[String],
    key: &str,
    path: &Path,
) -> Result<ArrayD<f32>, DatasetError> {
    let with_ext = format!("{key}.npy");
    let name = names
        .iter()
        .find(|n| n.as_str() == key || n.as_str() == with_ext)
        .ok_or_else(|| DatasetError::MissingArray {
            path: path.to_path_buf(),
            key: key.to_string(),
            available: names.to_vec(),
        })?;

    let as_f32: Result<ArrayD<f32>, _> = npz.by_name(name);
    let first_err = match as_f32 {
        Ok(arr) => return Ok(arr),
        Err(e) => e,
    };
    let as_f64: Result<ArrayD<f64>, _> = npz.by_name(name);
    if let Ok(arr) = as_f64 {
        return Ok(arr.mapv(|v| v as f32));
    }
    let as_i64: Result<ArrayD<i64>, _> = npz.by_name(name);
    if let Ok(arr) = as_i64 {
        return Ok(arr.mapv(|v| v as f32));
    }
    Err(DatasetError::npz_read(path, format!("`{name}`: {first_err}")))
}

/// Class index of the single positive entry in each one-hot row.
fn labels_from_one_hot(y: ArrayView2<'_, f32>, path: &Path) -> Result<Vec<usize>, DatasetError> {
    y.outer_iter()
        .enumerate()
        .map(|(row_idx, row)| {
            let mut hot = row.iter().enumerate().filter(|(_, v)| **v > 0.0).map(|(i, _)| i);
            match (hot.next(), hot.next()) {
                (Some(class), None) => Ok(class),
                (None, _) => Err(DatasetError::invalid_format(
                    path,
                    format!("label row {row_idx} has no positive entry"),
                )),
                (Some(_), Some(_)) => Err(DatasetError::invalid_format(
                    path,
                    format!("label row {row_idx} has more than one positive entry"),
                )),
            }
        })
        .collect()
}

/// View `[T, P·V·C]` archive rows as `[C, T, V, P]` without copying.
///
/// Returns `None` when `rows` is not contiguous in standard layout.
fn canonical_view(rows: ArrayView2<'_, f32>) -> Option<ArrayView4<'_, f32>> {
    let n_t = rows.nrows();
    rows.into_shape((n_t, NUM_PERSONS, NUM_JOINTS, NUM_COORDS))
        .ok()
        .map(|v| v.permuted_axes([3, 0, 2, 1]))
}

/// Pack one `[C, T, V, P]` sequence back into `[T, P·V·C]` archive rows.
pub fn pack_frames(sample: ArrayView4<'_, f32>) -> Array2<f32> {
    let (n_c, n_t, n_v, n_p) = sample.dim();
    Array2::from_shape_fn((n_t, n_p * n_v * n_c), |(t, k)| {
        let p = k / (n_v * n_c);
        let v = (k / n_c) % n_v;
        let c = k % n_c;
        sample[[c, t, v, p]]
    })
}

// ---------------------------------------------------------------------------
// SyntheticSkeletonDataset
// ---------------------------------------------------------------------------

/// Configuration for [`SyntheticSkeletonDataset`].
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    /// Raw frames per sequence, including zero padding. Default: **100**.
    pub num_frames: usize,
    /// Shortest valid range. Default: **20**.
    pub min_valid_frames: usize,
    /// Number of action classes. Default: **60**.
    pub num_classes: usize,
    /// Pipeline settings; data fields are ignored.
    pub feeder: FeederConfig,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        SyntheticConfig {
            num_frames: 100,
            min_valid_frames: 20,
            num_classes: 60,
            feeder: FeederConfig::default(),
        }
    }
}

/// Deterministic skeleton dataset generated from an analytic motion model.
///
/// Sample `idx` has `min_valid + (idx · 37) mod (T − min_valid + 1)` valid
/// frames followed by zero padding. Joint `v` of person `p` at frame `t`:
///
/// ```text
/// x = 0.1 · (v mod 5) + 0.05 · sin(0.2 · t + idx) + 0.8 · p
/// y = 0.08 · v + 0.02 · cos(0.15 · t + v)
/// z = 3.0 + 0.01 · t + 0.005 · v
/// ```
///
/// Every third sample has a second actor; the others leave person 1 zero.
/// The label is `idx mod num_classes`.
pub struct SyntheticSkeletonDataset {
    num_samples: usize,
    config: SyntheticConfig,
    assembler: SampleAssembler,
}

impl SyntheticSkeletonDataset {
    /// Create a dataset with `num_samples` entries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `config.feeder` fails validation.
    pub fn new(num_samples: usize, config: SyntheticConfig) -> Result<Self, ConfigError> {
        let assembler = SampleAssembler::from_config(&config.feeder)?;
        Ok(SyntheticSkeletonDataset { num_samples, config, assembler })
    }

    /// Valid frame count of sample `idx`.
    pub fn valid_frames(&self, idx: usize) -> usize {
        let n_t = self.config.num_frames;
        let min = self.config.min_valid_frames.clamp(1, n_t.max(1));
        (min + (idx * 37) % (n_t.saturating_sub(min) + 1)).min(n_t)
    }

    /// Label of sample `idx`.
    pub fn label(&self, idx: usize) -> usize {
        idx % self.config.num_classes.max(1)
    }

    /// Untransformed `[C, T, V, P]` sequence for `idx`.
    pub fn raw_sample(&self, idx: usize) -> Array4<f32> {
        let valid = self.valid_frames(idx);
        let persons = if idx % 3 == 0 { 2 } else { 1 };
        let phase = idx as f32;
        Array4::from_shape_fn(
            (NUM_COORDS, self.config.num_frames, NUM_JOINTS, NUM_PERSONS),
            |(c, t, v, p)| {
                if t >= valid || p >= persons {
                    return 0.0;
                }
                let (tf, vf, pf) = (t as f32, v as f32, p as f32);
                match c {
                    0 => 0.1 * (v % 5) as f32 + 0.05 * (0.2 * tf + phase).sin() + 0.8 * pf,
                    1 => 0.08 * vf + 0.02 * (0.15 * tf + vf).cos(),
                    _ => 3.0 + 0.01 * tf + 0.005 * vf,
                }
            },
        )
    }

    /// The dataset in archive layout: `x` `[N, T, 150]` and one-hot `y`
    /// `[N, num_classes]`.
    pub fn packed(&self) -> (Array3<f32>, Array2<f32>) {
        let n_t = self.config.num_frames;
        let mut x = Array3::zeros((self.num_samples, n_t, FRAME_WIDTH));
        let mut y = Array2::zeros((self.num_samples, self.config.num_classes.max(1)));
        for idx in 0..self.num_samples {
            x.index_axis_mut(Axis(0), idx).assign(&pack_frames(self.raw_sample(idx).view()));
            y[[idx, self.label(idx)]] = 1.0;
        }
        (x, y)
    }
}

impl SkeletonDataset for SyntheticSkeletonDataset {
    fn len(&self) -> usize {
        self.num_samples
    }

    fn get(&self, idx: usize) -> Result<SkeletonSample, DatasetError> {
        if idx >= self.num_samples {
            return Err(DatasetError::IndexOutOfBounds { idx, len: self.num_samples });
        }
        let mut rng = StdRng::seed_from_u64(sample_seed(self.config.feeder.seed, 0, idx));
        let raw = self.raw_sample(idx);
        Ok(SkeletonSample {
            data: self.assembler.assemble(raw.view(), &mut rng),
            label: self.label(idx),
            index: idx,
        })
    }

    fn name(&self) -> &str {
        "SyntheticSkeletonDataset"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
