//! Per-sample transform pipeline.
//!
//! ```text
//! raw [C, T, V, P]
//!   │ valid_frame_count
//!   │ valid_crop_resize      (interval policy, window size)
//!   │ random_rot             (optional)
//!   │ bone_difference  |  center_on_root
//!   │ motion                 (optional)
//!   ▼
//! sample [C, T', V, P]
//! ```
//!
//! The assembler owns no mutable state. Randomness is drawn from the [`Rng`]
//! handed to [`SampleAssembler::assemble`], so two calls with equally seeded
//! generators produce identical tensors.

use ndarray::{Array4, ArrayView4};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::FeederConfig;
use crate::error::ConfigError;
use crate::geometry::{
    bone_difference, center_on_root, motion, random_rot, valid_crop_resize, valid_frame_count,
    CropResize,
};
use crate::skeleton::BoneTree;

/// Coordinate representation of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    /// Joints relative to the root, root keeps its absolute trajectory.
    Joint,
    /// Bone vectors `child − parent`, root keeps its absolute trajectory.
    Bone,
}

/// Builds fixed-shape training tensors from raw skeleton sequences.
#[derive(Debug, Clone)]
pub struct SampleAssembler {
    crop: CropResize,
    random_rot: bool,
    rot_theta: f32,
    modality: Modality,
    velocity: bool,
    tree: BoneTree,
}

impl SampleAssembler {
    /// Create an assembler from explicit parts.
    pub fn new(
        crop: CropResize,
        random_rot: bool,
        rot_theta: f32,
        modality: Modality,
        velocity: bool,
        tree: BoneTree,
    ) -> Self {
        SampleAssembler { crop, random_rot, rot_theta, modality, velocity, tree }
    }

    /// Create an assembler for the NTU skeleton from a validated config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the config fails validation.
    pub fn from_config(config: &FeederConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(SampleAssembler::new(
            config.crop_resize()?,
            config.random_rot,
            config.rot_theta,
            config.modality(),
            config.vel,
            BoneTree::ntu(),
        ))
    }

    /// Frame count of every assembled sample, or `None` when resizing is
    /// disabled and the length follows each sample's valid range.
    pub fn output_frames(&self) -> Option<usize> {
        usize::try_from(self.crop.window_size).ok().filter(|&n| n > 0)
    }

    /// Selected modality.
    pub fn modality(&self) -> Modality {
        self.modality
    }

    /// Bone tree used for the bone modality and for locating the root.
    pub fn tree(&self) -> &BoneTree {
        &self.tree
    }

    /// Run the full pipeline on one raw `[C, T, V, P]` sequence.
    pub fn assemble<R: Rng + ?Sized>(&self, raw: ArrayView4<'_, f32>, rng: &mut R) -> Array4<f32> {
        let valid = valid_frame_count(raw);
        let mut data = valid_crop_resize(raw, valid, &self.crop, rng);

        if self.random_rot {
            data = random_rot(&data, self.rot_theta, rng);
        }

        data = match self.modality {
            Modality::Bone => bone_difference(&data, &self.tree),
            Modality::Joint => center_on_root(&data, self.tree.root()),
        };

        if self.velocity {
            data = motion(&data);
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{reconstruct_joints, IntervalPolicy};
    use crate::skeleton::{NTU_ROOT_JOINT, NUM_JOINTS, NUM_PERSONS};
    use approx::assert_abs_diff_eq;
    use ndarray::{s, Axis};
    use rand::{rngs::StdRng, SeedableRng};

    fn raw(n_valid: usize, n_t: usize) -> Array4<f32> {
        let mut data = Array4::zeros((3, n_t, NUM_JOINTS, NUM_PERSONS));
        data.slice_mut(s![.., ..n_valid, .., ..]).assign(&Array4::from_shape_fn(
            (3, n_valid, NUM_JOINTS, NUM_PERSONS),
            |(c, t, v, p)| 0.2 + c as f32 + (t as f32 * 0.3).sin() + v as f32 * 0.05 - p as f32,
        ));
        data
    }

    fn assembler(window: i64, modality: Modality, vel: bool) -> SampleAssembler {
        let crop = CropResize {
            interval: IntervalPolicy::Fixed(1.0),
            window_size: window,
            ..CropResize::default()
        };
        SampleAssembler::new(crop, false, 0.3, modality, vel, BoneTree::ntu())
    }

    #[test]
    fn joint_mode_centres_and_keeps_root() {
        let asm = assembler(-1, Modality::Joint, false);
        let data = raw(6, 8);
        let out = asm.assemble(data.view(), &mut StdRng::seed_from_u64(0));
        assert_eq!(out.shape(), &[3, 6, NUM_JOINTS, NUM_PERSONS]);
        assert_eq!(
            out.index_axis(Axis(2), NTU_ROOT_JOINT),
            data.slice(s![.., ..6, NTU_ROOT_JOINT, ..])
        );
        let want = data[[0, 2, 4, 1]] - data[[0, 2, NTU_ROOT_JOINT, 1]];
        assert_abs_diff_eq!(out[[0, 2, 4, 1]], want, epsilon = 1e-6);
    }

    #[test]
    fn bone_mode_inverts_to_cropped_input() {
        let asm = assembler(-1, Modality::Bone, false);
        let data = raw(5, 5);
        let out = asm.assemble(data.view(), &mut StdRng::seed_from_u64(0));
        let back = reconstruct_joints(&out, asm.tree());
        for (a, b) in back.iter().zip(data.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-5);
        }
    }

    #[test]
    fn velocity_is_applied_after_modality() {
        let plain = assembler(16, Modality::Joint, false);
        let with_vel = assembler(16, Modality::Joint, true);
        let data = raw(12, 20);
        let base = plain.assemble(data.view(), &mut StdRng::seed_from_u64(0));
        let vel = with_vel.assemble(data.view(), &mut StdRng::seed_from_u64(0));
        assert_eq!(vel, motion(&base));
        assert!(vel.index_axis(Axis(1), 15).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn bone_velocity_is_motion_of_bones() {
        let asm = assembler(-1, Modality::Bone, true);
        let data = raw(9, 12);
        let out = asm.assemble(data.view(), &mut StdRng::seed_from_u64(0));
        let bones = bone_difference(&data.slice(s![.., ..9, .., ..]).to_owned(), asm.tree());
        assert_eq!(out, motion(&bones));
        assert!(out.index_axis(Axis(1), 8).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn random_crop_without_resize_is_a_valid_slice() {
        let crop = CropResize {
            interval: IntervalPolicy::Random { low: 0.5, high: 1.0 },
            window_size: 0,
            min_crop_frames: 4,
            min_window_frames: 0,
        };
        let asm = SampleAssembler::new(crop, false, 0.3, Modality::Joint, false, BoneTree::ntu());
        let data = raw(30, 40);
        for seed in 0..20 {
            let out = asm.assemble(data.view(), &mut StdRng::seed_from_u64(seed));
            let len = out.len_of(Axis(1));
            assert!((15..=30).contains(&len), "seed={seed} len={len}");

            // the root keeps its absolute trajectory, so it locates the crop
            let root = out.index_axis(Axis(2), NTU_ROOT_JOINT);
            let start = (0..=30 - len)
                .find(|&st| data.slice(s![.., st..st + len, NTU_ROOT_JOINT, ..]) == root);
            assert!(start.is_some(), "seed={seed}: output is not a slice of the valid frames");

            let again = asm.assemble(data.view(), &mut StdRng::seed_from_u64(seed));
            assert_eq!(out, again);
        }
    }

    #[test]
    fn equal_seeds_give_equal_samples() {
        let crop = CropResize {
            interval: IntervalPolicy::Random { low: 0.5, high: 1.0 },
            window_size: 32,
            min_crop_frames: 4,
            min_window_frames: 0,
        };
        let asm = SampleAssembler::new(crop, true, 0.3, Modality::Joint, false, BoneTree::ntu());
        let data = raw(30, 40);
        let a = asm.assemble(data.view(), &mut StdRng::seed_from_u64(5));
        let b = asm.assemble(data.view(), &mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }

    #[test]
    fn output_frames_reflects_window() {
        assert_eq!(assembler(64, Modality::Joint, false).output_frames(), Some(64));
        assert_eq!(assembler(0, Modality::Joint, false).output_frames(), None);
        assert_eq!(assembler(-1, Modality::Bone, false).output_frames(), None);
    }
}
