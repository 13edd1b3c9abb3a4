//! Stateless numeric transforms on canonical skeleton tensors.
//!
//! Every tensor here has shape `[C, T, V, P]` (channels, frames, joints,
//! persons). Nothing in this module keeps state; randomness is always drawn
//! from an [`Rng`] supplied by the caller.
//!
//! # Example
//!
//! ```rust
//! use ndarray::Array4;
//! use rand::{rngs::StdRng, SeedableRng};
//! use skeleton_feeder::geometry::{valid_crop_resize, valid_frame_count, CropResize, IntervalPolicy};
//!
//! // 40 valid frames followed by 10 frames of zero padding.
//! let mut data = Array4::<f32>::zeros((3, 50, 25, 2));
//! data.slice_mut(ndarray::s![.., ..40, .., ..]).fill(1.0);
//!
//! let valid = valid_frame_count(data.view());
//! assert_eq!(valid, 40);
//!
//! let crop = CropResize { interval: IntervalPolicy::Fixed(1.0), window_size: 64, ..CropResize::default() };
//! let mut rng = StdRng::seed_from_u64(0);
//! let out = valid_crop_resize(data.view(), valid, &crop, &mut rng);
//! assert_eq!(out.shape(), &[3, 64, 25, 2]);
//! ```

use ndarray::{s, Array4, ArrayView4, Axis};
use rand::Rng;

use crate::skeleton::BoneTree;

// ---------------------------------------------------------------------------
// Valid frames
// ---------------------------------------------------------------------------

/// Number of leading frames that contain at least one non-zero value.
///
/// Frames after the first all-zero frame are treated as padding even if
/// later frames carry data.
pub fn valid_frame_count(data: ArrayView4<'_, f32>) -> usize {
    let n_t = data.len_of(Axis(1));
    (0..n_t)
        .take_while(|&t| data.index_axis(Axis(1), t).iter().any(|&v| v != 0.0))
        .count()
}

// ---------------------------------------------------------------------------
// Interval cropping
// ---------------------------------------------------------------------------

/// How much of the valid range a crop keeps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntervalPolicy {
    /// Centre crop keeping fraction `p` of the valid frames. `1.0` keeps all.
    Fixed(f64),
    /// Random crop whose kept fraction is drawn from `U(low, high)` and whose
    /// start offset is drawn uniformly.
    Random {
        /// Lower bound on the kept fraction.
        low: f64,
        /// Upper bound on the kept fraction.
        high: f64,
    },
}

impl Default for IntervalPolicy {
    fn default() -> Self {
        IntervalPolicy::Fixed(1.0)
    }
}

/// Choose the `(start, len)` sub-window of `valid_count` frames.
///
/// `min_crop_frames` is a lower bound on the length of random crops (itself
/// capped at `valid_count`). The returned window always holds at least one
/// frame.
pub fn crop_window<R: Rng + ?Sized>(
    valid_count: usize,
    policy: IntervalPolicy,
    min_crop_frames: usize,
    rng: &mut R,
) -> (usize, usize) {
    let valid = valid_count.max(1);
    match policy {
        IntervalPolicy::Fixed(p) => {
            let bias = ((1.0 - p) * valid as f64 / 2.0).floor().max(0.0) as usize;
            let len = valid.saturating_sub(2 * bias).max(1);
            (bias.min(valid - 1), len)
        }
        IntervalPolicy::Random { low, high } => {
            let p = if high > low { rng.gen_range(low..high) } else { low };
            let cropped = ((valid as f64 * p).floor().max(0.0) as usize)
                .max(min_crop_frames)
                .min(valid)
                .max(1);
            let start = rng.gen_range(0..=valid - cropped);
            (start, cropped)
        }
    }
}

// ---------------------------------------------------------------------------
// Temporal resize
// ---------------------------------------------------------------------------

/// Linear interpolation indices and weights for resampling `src_len` frames
/// to `dst_len` frames.
///
/// Sampling uses pixel centres: output frame `k` reads source position
/// `(k + 0.5) · src_len / dst_len − 0.5`, clamped to `[0, src_len − 1]`.
/// Each entry `(i0, i1, frac)` yields `src[i0] · (1 − frac) + src[i1] · frac`.
///
/// # Panics
///
/// Panics if `src_len == 0` or `dst_len == 0`.
pub fn compute_resize_weights(src_len: usize, dst_len: usize) -> Vec<(usize, usize, f32)> {
    assert!(src_len > 0, "src_len must be > 0");
    assert!(dst_len > 0, "dst_len must be > 0");

    let scale = src_len as f32 / dst_len as f32;
    (0..dst_len)
        .map(|k| {
            let pos = ((k as f32 + 0.5) * scale - 0.5).max(0.0);
            let i0 = (pos.floor() as usize).min(src_len - 1);
            let i1 = (i0 + 1).min(src_len - 1);
            let frac = if i1 == i0 { 0.0 } else { pos - i0 as f32 };
            (i0, i1, frac)
        })
        .collect()
}

/// Resample `data` along the frame axis to exactly `target_len` frames.
///
/// # Panics
///
/// Panics if `data` has no frames or `target_len == 0`.
pub fn resize_temporal(data: ArrayView4<'_, f32>, target_len: usize) -> Array4<f32> {
    let (n_c, n_t, n_v, n_p) = data.dim();
    if n_t == target_len {
        return data.to_owned();
    }
    let weights = compute_resize_weights(n_t, target_len);
    Array4::from_shape_fn((n_c, target_len, n_v, n_p), |(c, k, v, p)| {
        let (i0, i1, w) = weights[k];
        data[[c, i0, v, p]] * (1.0 - w) + data[[c, i1, v, p]] * w
    })
}

/// Pad the frame axis up to `min_len` by repeating the last frame.
fn pad_repeat_last(data: Array4<f32>, min_len: usize) -> Array4<f32> {
    let (n_c, n_t, n_v, n_p) = data.dim();
    if n_t == 0 || n_t >= min_len {
        return data;
    }
    Array4::from_shape_fn((n_c, min_len, n_v, n_p), |(c, t, v, p)| {
        data[[c, t.min(n_t - 1), v, p]]
    })
}

/// Parameters for [`valid_crop_resize`].
#[derive(Debug, Clone, PartialEq)]
pub struct CropResize {
    /// Crop policy over the valid frames.
    pub interval: IntervalPolicy,
    /// Output length. `<= 0` disables resizing.
    pub window_size: i64,
    /// Lower bound on random crop lengths. Default: **64**.
    pub min_crop_frames: usize,
    /// Without resizing, shorter crops are padded up to this many frames by
    /// repeating the last frame. Default: **0** (never pad).
    pub min_window_frames: usize,
}

impl Default for CropResize {
    fn default() -> Self {
        CropResize {
            interval: IntervalPolicy::Fixed(1.0),
            window_size: 64,
            min_crop_frames: 64,
            min_window_frames: 0,
        }
    }
}

/// Crop the valid range of `data` and optionally resize it to a fixed length.
///
/// Frames at or after `valid_count` are never read. A `valid_count` of zero
/// (an all-zero sample) is treated as a single frame.
pub fn valid_crop_resize<R: Rng + ?Sized>(
    data: ArrayView4<'_, f32>,
    valid_count: usize,
    crop: &CropResize,
    rng: &mut R,
) -> Array4<f32> {
    let (n_c, n_t, n_v, n_p) = data.dim();
    let target = usize::try_from(crop.window_size).unwrap_or(0);

    if n_t == 0 {
        let out_t = if target > 0 { target } else { crop.min_window_frames };
        return Array4::zeros((n_c, out_t, n_v, n_p));
    }

    let valid = valid_count.clamp(1, n_t);
    let (start, len) = crop_window(valid, crop.interval, crop.min_crop_frames, rng);
    let window = data.slice(s![.., start..start + len, .., ..]);

    if target > 0 {
        resize_temporal(window, target)
    } else {
        pad_repeat_last(window.to_owned(), crop.min_window_frames)
    }
}

// ---------------------------------------------------------------------------
// Rotation
// ---------------------------------------------------------------------------

/// A 3 × 3 rotation matrix, row-major.
pub type Rotation = [[f32; 3]; 3];

fn matmul3(a: &Rotation, b: &Rotation) -> Rotation {
    let mut out = [[0.0f32; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

/// Build `Rz · Ry · Rx` from angles `[x, y, z]` in radians.
pub fn rotation_matrix(angles: [f32; 3]) -> Rotation {
    let [ax, ay, az] = angles;
    let (sx, cx) = ax.sin_cos();
    let (sy, cy) = ay.sin_cos();
    let (sz, cz) = az.sin_cos();

    let rx = [[1.0, 0.0, 0.0], [0.0, cx, sx], [0.0, -sx, cx]];
    let ry = [[cy, 0.0, -sy], [0.0, 1.0, 0.0], [sy, 0.0, cy]];
    let rz = [[cz, sz, 0.0], [-sz, cz, 0.0], [0.0, 0.0, 1.0]];

    matmul3(&matmul3(&rz, &ry), &rx)
}

/// Apply `rot` to every channel vector of `data`.
///
/// # Panics
///
/// Panics if `data` does not have exactly 3 channels.
pub fn rotate(data: &Array4<f32>, rot: &Rotation) -> Array4<f32> {
    assert_eq!(data.len_of(Axis(0)), 3, "rotation needs 3 channels");
    Array4::from_shape_fn(data.dim(), |(c, t, v, p)| {
        rot[c][0] * data[[0, t, v, p]] + rot[c][1] * data[[1, t, v, p]] + rot[c][2] * data[[2, t, v, p]]
    })
}

/// Draw independent x/y/z angles from `U(−theta, theta)`.
pub fn random_angles<R: Rng + ?Sized>(theta: f32, rng: &mut R) -> [f32; 3] {
    if theta <= 0.0 {
        return [0.0; 3];
    }
    [
        rng.gen_range(-theta..theta),
        rng.gen_range(-theta..theta),
        rng.gen_range(-theta..theta),
    ]
}

/// Rotate the whole sequence by one random rotation bounded by `theta`.
pub fn random_rot<R: Rng + ?Sized>(data: &Array4<f32>, theta: f32, rng: &mut R) -> Array4<f32> {
    let rot = rotation_matrix(random_angles(theta, rng));
    rotate(data, &rot)
}

// ---------------------------------------------------------------------------
// Modalities
// ---------------------------------------------------------------------------

/// Replace every non-root joint with its bone vector `child − parent`.
///
/// The root keeps its raw coordinates so the global trajectory survives.
pub fn bone_difference(data: &Array4<f32>, tree: &BoneTree) -> Array4<f32> {
    let mut out = data.clone();
    for (child, parent) in tree.bones() {
        let bone = &data.index_axis(Axis(2), child) - &data.index_axis(Axis(2), parent);
        out.index_axis_mut(Axis(2), child).assign(&bone);
    }
    out
}

/// Inverse of [`bone_difference`]: sum bone vectors from the root outwards.
pub fn reconstruct_joints(bones: &Array4<f32>, tree: &BoneTree) -> Array4<f32> {
    let mut out = bones.clone();
    for &joint in tree.root_first_order() {
        if joint == tree.root() {
            continue;
        }
        let parent = out.index_axis(Axis(2), tree.parent(joint)).to_owned();
        let mut slot = out.index_axis_mut(Axis(2), joint);
        slot += &parent;
    }
    out
}

/// Express every joint relative to `root` of the same frame and person,
/// keeping the root's absolute trajectory in its own slot.
pub fn center_on_root(data: &Array4<f32>, root: usize) -> Array4<f32> {
    let trajectory = data.index_axis(Axis(2), root).to_owned();
    let origin = data.slice(s![.., .., root..root + 1, ..]);
    let mut out = data - &origin;
    out.index_axis_mut(Axis(2), root).assign(&trajectory);
    out
}

/// Frame-to-frame differences: `out[t] = in[t + 1] − in[t]`, last frame zero.
pub fn motion(data: &Array4<f32>) -> Array4<f32> {
    let n_t = data.len_of(Axis(1));
    let mut out = Array4::zeros(data.dim());
    if n_t < 2 {
        return out;
    }
    let next = data.slice(s![.., 1.., .., ..]);
    let prev = data.slice(s![.., ..n_t - 1, .., ..]);
    out.slice_mut(s![.., ..n_t - 1, .., ..]).assign(&(&next - &prev));
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
