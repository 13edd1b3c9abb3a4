//! Feeder configuration.
//!
//! [`FeederConfig`] carries every construction parameter of the skeleton
//! feeder. It is serializable via [`serde`] so it can be stored to / restored
//! from JSON files next to a training run.
//!
//! # Legacy flags
//!
//! `label_path`, `random_choose`, `random_shift`, `random_move` and
//! `use_mmap` are accepted for compatibility with existing configs but are
//! not wired into the pipeline. [`FeederConfig::ignored_flags`] lists the
//! ones that are set so the loader can warn about them.
//!
//! # Example
//!
//! ```rust
//! use skeleton_feeder::config::{FeederConfig, Split};
//!
//! let cfg = FeederConfig::default();
//! cfg.validate().expect("default config is valid");
//!
//! assert_eq!(cfg.split().unwrap(), Split::Train);
//! assert_eq!(cfg.window_size, 64);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::assembler::Modality;
use crate::error::ConfigError;
use crate::geometry::{CropResize, IntervalPolicy};

// ---------------------------------------------------------------------------
// Split
// ---------------------------------------------------------------------------

/// Which half of the archive to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    /// `x_train` / `y_train`.
    Train,
    /// `x_test` / `y_test`.
    Test,
}

impl Split {
    /// Lowercase split name as used in archive keys and sample names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Test => "test",
        }
    }

    /// Archive key of the skeleton array.
    pub fn data_key(&self) -> String {
        format!("x_{}", self.as_str())
    }

    /// Archive key of the one-hot label matrix.
    pub fn label_key(&self) -> String {
        format!("y_{}", self.as_str())
    }
}

impl FromStr for Split {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "train" => Ok(Split::Train),
            "test" => Ok(Split::Test),
            other => Err(ConfigError::UnknownSplit(other.to_string())),
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FeederConfig
// ---------------------------------------------------------------------------

/// Complete configuration for one feeder instance.
///
/// Use [`FeederConfig::default()`] as a starting point and override fields as
/// needed. Unknown JSON fields are rejected; missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeederConfig {
    // -----------------------------------------------------------------------
    // Data
    // -----------------------------------------------------------------------
    /// Path to the `.npz` archive holding `x_train`, `y_train`, `x_test`,
    /// `y_test`.
    pub data_path: PathBuf,

    /// Legacy separate label file. Labels are always read from the archive.
    pub label_path: Option<PathBuf>,

    /// `"train"` or `"test"`. Anything else fails at load time.
    pub split: String,

    /// Keep only the first 100 samples. Default: **false**.
    pub debug: bool,

    /// Legacy memory-map request. Archive members cannot be mapped, so the
    /// archive is always read into memory.
    pub use_mmap: bool,

    /// Compute per-channel/joint mean and std over the loaded split.
    /// Default: **false**.
    pub normalization: bool,

    // -----------------------------------------------------------------------
    // Temporal cropping
    // -----------------------------------------------------------------------
    /// Output frame count. `<= 0` keeps each sample's cropped length.
    /// Default: **64**.
    pub window_size: i64,

    /// `[p]` for a fixed centre crop keeping fraction `p`, or `[low, high]`
    /// for a random crop with fraction drawn from `U(low, high)`.
    /// Default: **[1.0]**.
    pub p_interval: Vec<f64>,

    /// Lower bound on random crop lengths in frames. Default: **64**.
    pub min_crop_frames: usize,

    /// Without resizing, pad shorter crops to this many frames by repeating
    /// the last frame. Default: **0**.
    pub min_window_frames: usize,

    // -----------------------------------------------------------------------
    // Augmentation / modality
    // -----------------------------------------------------------------------
    /// Rotate each sample by a random rotation. Default: **false**.
    pub random_rot: bool,

    /// Per-axis rotation bound in radians. Default: **0.3**.
    pub rot_theta: f32,

    /// Bone modality instead of root-relative joints. Default: **false**.
    pub bone: bool,

    /// Replace frames with frame-to-frame motion. Default: **false**.
    pub vel: bool,

    /// Legacy flag, not wired into the pipeline.
    pub random_choose: bool,

    /// Legacy flag, not wired into the pipeline.
    pub random_shift: bool,

    /// Legacy flag, not wired into the pipeline.
    pub random_move: bool,

    // -----------------------------------------------------------------------
    // Reproducibility
    // -----------------------------------------------------------------------
    /// Base seed for per-sample augmentation RNGs. Default: **42**.
    pub seed: u64,
}

impl Default for FeederConfig {
    fn default() -> Self {
        FeederConfig {
            data_path: PathBuf::from("data/ntu/NTU60_CS.npz"),
            label_path: None,
            split: "train".to_string(),
            debug: false,
            use_mmap: false,
            normalization: false,
            window_size: 64,
            p_interval: vec![1.0],
            min_crop_frames: 64,
            min_window_frames: 0,
            random_rot: false,
            rot_theta: 0.3,
            bone: false,
            vel: false,
            random_choose: false,
            random_shift: false,
            random_move: false,
            seed: 42,
        }
    }
}

impl FeederConfig {
    /// Load a [`FeederConfig`] from a JSON file at `path` and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FileRead`] if the file cannot be opened,
    /// [`ConfigError::ParseError`] if the JSON is malformed, and any
    /// validation error.
    pub fn from_json(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: FeederConfig = serde_json::from_str(&contents).map_err(|source| {
            ConfigError::ParseError { path: path.to_path_buf(), source }
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Serialize this configuration to pretty-printed JSON at `path`, creating
    /// parent directories if necessary.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FileRead`] if the directory cannot be created or
    /// the file cannot be written.
    pub fn to_json(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::FileRead {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::invalid_value("(serialization)", e.to_string()))?;
        std::fs::write(path, json).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    /// Parsed split.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownSplit`] for anything but `train` / `test`.
    pub fn split(&self) -> Result<Split, ConfigError> {
        self.split.parse()
    }

    /// Interval policy described by `p_interval`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when `p_interval` does not hold
    /// one value in `(0, 1]` or an increasing pair in `(0, 1]`.
    pub fn interval_policy(&self) -> Result<IntervalPolicy, ConfigError> {
        let in_range = |p: f64| p > 0.0 && p <= 1.0;
        match self.p_interval.as_slice() {
            [p] if in_range(*p) => Ok(IntervalPolicy::Fixed(*p)),
            [low, high] if in_range(*low) && in_range(*high) && low <= high => {
                Ok(IntervalPolicy::Random { low: *low, high: *high })
            }
            [_] | [_, _] => Err(ConfigError::invalid_value(
                "p_interval",
                format!("values must lie in (0, 1] with low <= high, got {:?}", self.p_interval),
            )),
            other => Err(ConfigError::invalid_value(
                "p_interval",
                format!("expected 1 or 2 values, got {}", other.len()),
            )),
        }
    }

    /// Crop/resize parameters for [`crate::geometry::valid_crop_resize`].
    ///
    /// # Errors
    ///
    /// Propagates [`FeederConfig::interval_policy`] errors.
    pub fn crop_resize(&self) -> Result<CropResize, ConfigError> {
        Ok(CropResize {
            interval: self.interval_policy()?,
            window_size: self.window_size,
            min_crop_frames: self.min_crop_frames,
            min_window_frames: self.min_window_frames,
        })
    }

    /// Modality selected by the `bone` flag.
    pub fn modality(&self) -> Modality {
        if self.bone {
            Modality::Bone
        } else {
            Modality::Joint
        }
    }

    /// Names of legacy flags that are set but have no effect.
    pub fn ignored_flags(&self) -> Vec<&'static str> {
        [
            ("label_path", self.label_path.is_some()),
            ("random_choose", self.random_choose),
            ("random_shift", self.random_shift),
            ("random_move", self.random_move),
            ("use_mmap", self.use_mmap),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }

    /// Validate all fields and return the first problem found.
    ///
    /// # Validated invariants
    ///
    /// - `split` is `train` or `test`.
    /// - `p_interval` is a valid fixed or random policy.
    /// - `rot_theta` is finite and non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.split()?;
        self.interval_policy()?;

        if !self.rot_theta.is_finite() || self.rot_theta < 0.0 {
            return Err(ConfigError::invalid_value("rot_theta", "must be finite and >= 0.0"));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
