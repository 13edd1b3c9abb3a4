//! Classification accuracy for action-recognition scores.
//!
//! # Tie-breaking
//!
//! [`top_k`] ranks the classes of each row with a **stable ascending** sort on
//! score and keeps the last `k`. Among equal scores the class with the
//! higher index therefore ranks higher. NaN scores rank above every number
//! (as `numpy.argsort` places them), so a NaN class always counts as a
//! top-k hit. The order is total, so rows of any width sort without panics.

use ndarray::ArrayView2;
use std::cmp::Ordering;

use crate::error::FeederError;

/// Class indices of one score row, ordered from lowest to highest score.
pub fn rank_ascending(row: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..row.len()).collect();
    order.sort_by(|&a, &b| score_order(row[a], row[b]));
    order
}

/// Numeric order with every NaN above every number and equal to other NaNs.
fn score_order(a: f32, b: f32) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a.is_nan().cmp(&b.is_nan()))
}

/// Fraction of samples whose label is among the `k` highest-scoring classes.
///
/// `scores` is `[N, num_classes]`; `labels` has one entry per row. `k = 0`
/// gives `0.0` and `k >= num_classes` gives `1.0` for in-range labels.
///
/// # Errors
///
/// Returns [`FeederError::EmptyDataset`] for zero rows and
/// [`FeederError::ShapeMismatch`] when row and label counts differ.
pub fn top_k(scores: ArrayView2<'_, f32>, labels: &[usize], k: usize) -> Result<f64, FeederError> {
    let (n, n_classes) = scores.dim();
    if n != labels.len() {
        return Err(FeederError::shape_mismatch(vec![labels.len(), n_classes], vec![n, n_classes]));
    }
    if n == 0 {
        return Err(FeederError::EmptyDataset);
    }

    let hits = scores
        .outer_iter()
        .zip(labels)
        .filter(|(row, label)| {
            let row: Vec<f32> = row.iter().copied().collect();
            let rank = rank_ascending(&row);
            rank[rank.len().saturating_sub(k)..].contains(*label)
        })
        .count();

    Ok(hits as f64 / n as f64)
}

/// [`top_k`] for several `k` at once, in the order given.
///
/// # Errors
///
/// Same as [`top_k`].
pub fn top_k_many(
    scores: ArrayView2<'_, f32>,
    labels: &[usize],
    ks: &[usize],
) -> Result<Vec<(usize, f64)>, FeederError> {
    ks.iter().map(|&k| Ok((k, top_k(scores, labels, k)?))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn top1_counts_argmax_hits() {
        let scores = array![[0.1f32, 0.7, 0.2], [0.5, 0.3, 0.2], [0.0, 0.1, 0.9]];
        let acc = top_k(scores.view(), &[1, 1, 2], 1).unwrap();
        assert_abs_diff_eq!(acc, 2.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn top2_widens_the_window() {
        let scores = array![[0.1f32, 0.7, 0.2], [0.5, 0.3, 0.2]];
        assert_abs_diff_eq!(top_k(scores.view(), &[2, 1], 2).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn k_at_least_num_classes_is_perfect() {
        let scores = array![[0.3f32, 0.2, 0.1], [0.0, 0.0, 0.0]];
        for k in [3, 4, 100] {
            assert_eq!(top_k(scores.view(), &[2, 0], k).unwrap(), 1.0);
        }
    }

    #[test]
    fn k_zero_is_zero() {
        let scores = array![[0.3f32, 0.2]];
        assert_eq!(top_k(scores.view(), &[0], 0).unwrap(), 0.0);
    }

    #[test]
    fn nan_scores_rank_highest() {
        assert_eq!(rank_ascending(&[0.2, f32::NAN, -1.0, f32::NAN, 0.0]), vec![2, 4, 0, 1, 3]);
        assert_eq!(score_order(f32::NAN, f32::INFINITY), Ordering::Greater);
        assert_eq!(score_order(-f32::NAN, f32::NAN), Ordering::Equal);
        assert_eq!(score_order(-0.0, 0.0), Ordering::Equal);
    }

    #[test]
    fn ties_favour_higher_class_index() {
        let scores = array![[0.5f32, 0.5, 0.5]];
        assert_eq!(rank_ascending(&[0.5, 0.5, 0.5]), vec![0, 1, 2]);
        assert_eq!(top_k(scores.view(), &[2], 1).unwrap(), 1.0);
        assert_eq!(top_k(scores.view(), &[0], 1).unwrap(), 0.0);
    }

    #[test]
    fn label_count_mismatch_is_an_error() {
        let scores = array![[0.5f32, 0.5]];
        assert!(matches!(
            top_k(scores.view(), &[0, 1], 1),
            Err(FeederError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn empty_scores_are_an_error() {
        let scores = ndarray::Array2::<f32>::zeros((0, 4));
        assert!(matches!(top_k(scores.view(), &[], 1), Err(FeederError::EmptyDataset)));
    }

    #[test]
    fn many_keeps_order() {
        let scores = array![[0.1f32, 0.7, 0.2]];
        let res = top_k_many(scores.view(), &[2], &[1, 2]).unwrap();
        assert_eq!(res, vec![(1, 0.0), (2, 1.0)]);
    }
}
