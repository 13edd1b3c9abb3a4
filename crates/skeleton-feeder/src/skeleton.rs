//! Skeleton topology for NTU RGB+D style 25-joint, 2-person sequences.
//!
//! Joint indices in [`NTU_PAIRS`] are **1-based** to match the published NTU
//! RGB+D joint numbering. Everything else in the crate uses 0-based indices;
//! [`BoneTree`] converts once at construction.
//!
//! ```rust
//! use skeleton_feeder::skeleton::{BoneTree, NTU_ROOT_JOINT};
//!
//! let tree = BoneTree::ntu();
//! assert_eq!(tree.root(), NTU_ROOT_JOINT);
//! assert_eq!(tree.parent(0), 1); // spine base -> spine mid
//! ```

use crate::error::SkeletonError;

/// Spatial channels per joint (x, y, z).
pub const NUM_COORDS: usize = 3;

/// Tracked joints per actor.
pub const NUM_JOINTS: usize = 25;

/// Maximum actors per frame.
pub const NUM_PERSONS: usize = 2;

/// Flat values per frame in the packed archive layout (`P × V × C`).
pub const FRAME_WIDTH: usize = NUM_PERSONS * NUM_JOINTS * NUM_COORDS;

/// 0-based index of the spine-centre joint (joint 21 in NTU numbering).
pub const NTU_ROOT_JOINT: usize = 20;

/// `(child, parent)` pairs, 1-based. Joint 21 is its own parent (the root).
pub const NTU_PAIRS: [(usize, usize); NUM_JOINTS] = [
    (1, 2),
    (2, 21),
    (3, 21),
    (4, 3),
    (5, 21),
    (6, 5),
    (7, 6),
    (8, 7),
    (9, 21),
    (10, 9),
    (11, 10),
    (12, 11),
    (13, 1),
    (14, 13),
    (15, 14),
    (16, 15),
    (17, 1),
    (18, 17),
    (19, 18),
    (20, 19),
    (22, 23),
    (21, 21),
    (23, 8),
    (24, 25),
    (25, 12),
];

// ---------------------------------------------------------------------------
// BoneTree
// ---------------------------------------------------------------------------

/// A validated parent table: exactly one root, one parent per joint, no
/// cycles.
///
/// Holds a root-first traversal order so that bone vectors can be summed
/// back into joint positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoneTree {
    parents: Vec<usize>,
    root: usize,
    order: Vec<usize>,
}

impl BoneTree {
    /// Validate a 1-based `(child, parent)` table covering `num_joints` joints.
    ///
    /// # Errors
    ///
    /// Returns a [`SkeletonError`] describing the first structural problem.
    pub fn from_pairs(pairs: &[(usize, usize)], num_joints: usize) -> Result<Self, SkeletonError> {
        if pairs.len() != num_joints {
            return Err(SkeletonError::WrongLength { found: pairs.len(), expected: num_joints });
        }

        let mut parents: Vec<Option<usize>> = vec![None; num_joints];
        for &(child, parent) in pairs {
            for index in [child, parent] {
                if index == 0 || index > num_joints {
                    return Err(SkeletonError::JointOutOfRange { index, num_joints });
                }
            }
            let slot = &mut parents[child - 1];
            if slot.is_some() {
                return Err(SkeletonError::DuplicateChild { joint: child });
            }
            *slot = Some(parent - 1);
        }
        // Every slot is filled: num_joints distinct children, each in range.
        let parents: Vec<usize> = parents.into_iter().flatten().collect();

        let roots: Vec<usize> = (0..num_joints).filter(|&j| parents[j] == j).collect();
        if roots.len() != 1 {
            return Err(SkeletonError::RootCount { found: roots.len() });
        }
        let root = roots[0];

        // depth[j] = number of hops to the root; a walk longer than
        // num_joints means a cycle.
        let mut depth = vec![0usize; num_joints];
        for (joint, d) in depth.iter_mut().enumerate() {
            let mut cur = joint;
            let mut hops = 0usize;
            while cur != root {
                cur = parents[cur];
                hops += 1;
                if hops > num_joints {
                    return Err(SkeletonError::Cycle { joint: joint + 1 });
                }
            }
            *d = hops;
        }

        let mut order: Vec<usize> = (0..num_joints).collect();
        order.sort_by_key(|&j| depth[j]);

        Ok(BoneTree { parents, root, order })
    }

    /// The NTU RGB+D 25-joint tree rooted at the spine centre.
    pub fn ntu() -> Self {
        match Self::from_pairs(&NTU_PAIRS, NUM_JOINTS) {
            Ok(tree) => tree,
            Err(e) => unreachable!("built-in NTU bone table is invalid: {e}"),
        }
    }

    /// 0-based root joint.
    pub fn root(&self) -> usize {
        self.root
    }

    /// 0-based parent of `joint`. The root is its own parent.
    pub fn parent(&self, joint: usize) -> usize {
        self.parents[joint]
    }

    /// Number of joints in the tree.
    pub fn num_joints(&self) -> usize {
        self.parents.len()
    }

    /// Iterate over `(child, parent)` for every non-root joint, 0-based.
    pub fn bones(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.parents
            .iter()
            .enumerate()
            .filter(move |&(child, _)| child != self.root)
            .map(|(child, &parent)| (child, parent))
    }

    /// Joints ordered so that every parent precedes its children.
    pub fn root_first_order(&self) -> &[usize] {
        &self.order
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ntu_table_is_valid() {
        let tree = BoneTree::from_pairs(&NTU_PAIRS, NUM_JOINTS).unwrap();
        assert_eq!(tree.root(), NTU_ROOT_JOINT);
        assert_eq!(tree.num_joints(), NUM_JOINTS);
        assert_eq!(tree.bones().count(), NUM_JOINTS - 1);
    }

    #[test]
    fn hand_tips_hang_off_hands() {
        let tree = BoneTree::ntu();
        // 22 -> 23 -> 8 and 24 -> 25 -> 12 (1-based)
        assert_eq!(tree.parent(21), 22);
        assert_eq!(tree.parent(22), 7);
        assert_eq!(tree.parent(23), 24);
        assert_eq!(tree.parent(24), 11);
    }

    #[test]
    fn root_first_order_has_parents_before_children() {
        let tree = BoneTree::ntu();
        let order = tree.root_first_order();
        assert_eq!(order[0], NTU_ROOT_JOINT);
        let pos = |j: usize| order.iter().position(|&o| o == j).unwrap();
        for (child, parent) in tree.bones() {
            assert!(pos(parent) < pos(child), "parent {parent} after child {child}");
        }
    }

    #[test]
    fn wrong_length_is_rejected() {
        let err = BoneTree::from_pairs(&NTU_PAIRS[..24], NUM_JOINTS).unwrap_err();
        assert_eq!(err, SkeletonError::WrongLength { found: 24, expected: 25 });
    }

    #[test]
    fn two_roots_are_rejected() {
        let pairs = [(1, 1), (2, 2), (3, 1)];
        assert_eq!(
            BoneTree::from_pairs(&pairs, 3).unwrap_err(),
            SkeletonError::RootCount { found: 2 }
        );
    }

    #[test]
    fn no_root_is_rejected() {
        let pairs = [(1, 2), (2, 3), (3, 1)];
        assert_eq!(
            BoneTree::from_pairs(&pairs, 3).unwrap_err(),
            SkeletonError::RootCount { found: 0 }
        );
    }

    #[test]
    fn cycle_is_rejected() {
        // 1 is the root; 2 and 3 point at each other.
        let pairs = [(1, 1), (2, 3), (3, 2)];
        assert!(matches!(
            BoneTree::from_pairs(&pairs, 3).unwrap_err(),
            SkeletonError::Cycle { .. }
        ));
    }

    #[test]
    fn duplicate_child_is_rejected() {
        let pairs = [(1, 1), (2, 1), (2, 1)];
        assert_eq!(
            BoneTree::from_pairs(&pairs, 3).unwrap_err(),
            SkeletonError::DuplicateChild { joint: 2 }
        );
    }

    #[test]
    fn zero_index_is_rejected() {
        let pairs = [(1, 1), (0, 1), (3, 1)];
        assert_eq!(
            BoneTree::from_pairs(&pairs, 3).unwrap_err(),
            SkeletonError::JointOutOfRange { index: 0, num_joints: 3 }
        );
    }
}
