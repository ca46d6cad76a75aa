//! # decisiontree
//!
//! `decisiontree` is the runtime core of a single classification tree inside a
//! tree-ensemble library. A tree grower appends nodes one at a time with
//! [`Tree::add_node`](trees::Tree::add_node); the finished tree serves batched
//! class-probability inference and split-improvement feature importance.
//!
//! Missing feature values are encoded as NaN. Depending on the policy recorded
//! at a split, a sample with a missing value is sent left, sent right, or follows
//! both children with weights proportional to their training population.
//!
//! ## Example Usage
//!
//! ```rust
//! use decisiontree::trees::{Histogram, MissingValuePolicy, NodeIndex, SplitInfo, Tree, TreeParams};
//!
//! let mut tree: Tree = Tree::new(TreeParams::single_output(1, 2).unwrap());
//!
//! let root = tree
//!     .add_node(
//!         false,
//!         0,
//!         NodeIndex::ROOT,
//!         SplitInfo::new(0, MissingValuePolicy::Split, 0.5).with_improvement(0.125),
//!         Histogram::from(vec![vec![4.0, 4.0]]),
//!     )
//!     .unwrap();
//! tree.add_node(true, 1, root, SplitInfo::leaf(0.375), Histogram::from(vec![vec![3.0, 1.0]]))
//!     .unwrap();
//! tree.add_node(false, 1, root, SplitInfo::leaf(0.375), Histogram::from(vec![vec![1.0, 3.0]]))
//!     .unwrap();
//!
//! let proba = tree.predict_proba(&[0.2, 0.8, f64::NAN], 3).unwrap();
//! assert_eq!(proba, vec![0.75, 0.25, 0.25, 0.75, 0.5, 0.5]);
//!
//! let importances = tree.compute_feature_importance();
//! assert_eq!(importances[0], 1.0);
//! ```

/// Numeric bounds for feature values
pub mod data;
/// Error types
pub mod error;
/// Seeded random number generation for tree growers
pub mod random;
/// Decision trees
pub mod trees;

pub use error::{RandomError, TreeError};
