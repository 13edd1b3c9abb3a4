//! # Skeleton Feeder
//!
//! This crate turns packed NTU RGB+D style skeleton sequences into fixed-shape
//! training tensors. It includes configuration management, archive loading,
//! temporal crop/resize, rotation augmentation, bone and joint modalities,
//! motion features and top-k evaluation.
//!
//! ## Architecture
//!
//! ```text
//! FeederConfig ──► NtuFeeder ──► DataLoader ──► Batch [B, C, T', V, P]
//!       │              │
//!       │        SampleAssembler
//!       │              │
//!       │        geometry::{valid_crop_resize, random_rot,
//!       │                   bone_difference, center_on_root, motion}
//!       │              │
//!       │        skeleton::BoneTree
//!       │
//!       └──► metrics::top_k
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use skeleton_feeder::config::FeederConfig;
//! use skeleton_feeder::dataset::{NtuFeeder, SkeletonDataset};
//!
//! let mut config = FeederConfig::default();
//! config.data_path = "data/ntu/NTU60_CS.npz".into();
//! config.p_interval = vec![0.5, 1.0];
//! config.random_rot = true;
//!
//! let feeder = NtuFeeder::load(&config).expect("archive loads");
//! let sample = feeder.get(0).unwrap();
//! println!("{} -> {:?}", feeder.sample_name(0).unwrap(), sample.data.shape());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod assembler;
pub mod config;
pub mod dataset;
pub mod error;
pub mod geometry;
pub mod metrics;
pub mod skeleton;

// Convenient re-exports at the crate root.
pub use assembler::{Modality, SampleAssembler};
pub use config::{FeederConfig, Split};
pub use dataset::{
    Batch, DataLoader, NtuFeeder, SkeletonDataset, SkeletonSample, SyntheticConfig,
    SyntheticSkeletonDataset,
};
pub use error::{ConfigError, DatasetError, FeederError, FeederResult, SkeletonError};
pub use geometry::{valid_crop_resize, valid_frame_count, CropResize, IntervalPolicy};
pub use metrics::{top_k, top_k_many};
pub use skeleton::BoneTree;

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
