//! Array-backed decision tree
use super::node::{Histogram, NodeIndex, SplitInfo, TreeNode};
use super::params::TreeParams;
use super::routing::Traversal;
use crate::data::RealNumber;
use crate::error::{ChildSide, TreeError};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use std::fmt;
use tracing::{debug, instrument, trace};

/// Decision tree stored as a flat, append-only arena of nodes.
///
/// Node 0 is the root. Nodes are appended by a tree grower through
/// [`Tree::add_node`]; once built, the tree is read-only and can serve
/// any number of concurrent inference calls.
#[derive(Clone, Debug)]
pub struct Tree<T: RealNumber = f64> {
    params: TreeParams,
    nodes: Vec<TreeNode<T>>,
    max_depth: usize,
}

impl<T: RealNumber> Tree<T> {
    /// Creates an empty tree with the given shape.
    pub fn new(params: TreeParams) -> Self {
        debug!(
            num_features = params.num_features(),
            num_outputs = params.num_outputs(),
            max_num_classes = params.max_num_classes(),
            "created tree"
        );
        Self {
            params,
            nodes: Vec::new(),
            max_depth: 0,
        }
    }

    pub fn params(&self) -> &TreeParams {
        &self.params
    }

    pub fn num_outputs(&self) -> usize {
        self.params.num_outputs()
    }

    pub fn num_features(&self) -> usize {
        self.params.num_features()
    }

    pub fn num_classes_list(&self) -> &[usize] {
        self.params.num_classes_list()
    }

    pub fn max_num_classes(&self) -> usize {
        self.params.max_num_classes()
    }

    /// Deepest depth passed to [`Tree::add_node`] so far.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[TreeNode<T>] {
        &self.nodes
    }

    pub fn node(&self, index: NodeIndex) -> Option<&TreeNode<T>> {
        self.nodes.get(index.index())
    }

    pub fn root(&self) -> Option<&TreeNode<T>> {
        self.nodes.first()
    }

    /// Appends a node and links it to its parent.
    ///
    /// The new node is a leaf until children are attached to it by later calls.
    /// With `depth == 0` the node becomes the root and `is_left` and
    /// `parent_index` are ignored. Otherwise it becomes the left (`is_left`)
    /// or right child of `parent_index`, which must already exist.
    ///
    /// # Returns
    ///
    /// The index of the new node. Indices increase by one from 0.
    ///
    /// # Errors
    ///
    /// Fails without modifying the tree when the root is added twice, a
    /// child is added before the root, the parent does not exist or already
    /// has a child on that side, the split feature is out of range, or the
    /// histogram does not match the tree's shape.
    pub fn add_node(
        &mut self,
        is_left: bool,
        depth: usize,
        parent_index: NodeIndex,
        split: SplitInfo<T>,
        histogram: Histogram,
    ) -> Result<NodeIndex, TreeError> {
        if split.feature_index >= self.num_features() {
            return Err(TreeError::FeatureOutOfBounds {
                feature_index: split.feature_index,
                num_features: self.num_features(),
            });
        }
        histogram.validate(self.params.num_classes_list())?;

        let node_count = self.nodes.len();
        let node_index = NodeIndex::new(node_count);
        if depth == 0 {
            if node_count > 0 {
                return Err(TreeError::RootAlreadyExists);
            }
        } else {
            if node_count == 0 {
                return Err(TreeError::MissingRoot);
            }
            let side = if is_left {
                ChildSide::Left
            } else {
                ChildSide::Right
            };
            let parent = self.nodes.get_mut(parent_index.index()).ok_or(
                TreeError::ParentOutOfBounds {
                    parent: parent_index.index(),
                    node_count,
                },
            )?;
            parent
                .attach_child(side, node_index)
                .map_err(|side| TreeError::ChildAlreadyAssigned {
                    parent: parent_index.index(),
                    side,
                })?;
        }

        self.nodes.push(TreeNode::new(split, histogram));
        self.max_depth = self.max_depth.max(depth);
        trace!(node = %node_index, depth, parent = %parent_index, is_left, "added node");
        Ok(node_index)
    }

    /// Share of the total split improvement contributed by each feature.
    ///
    /// Sums the improvement of every node with a left child per split
    /// feature and normalizes the result to 1. All zeros when no split
    /// improved the criterion.
    pub fn compute_feature_importance(&self) -> DVector<f64> {
        let mut importances = DVector::zeros(self.num_features());
        for node in self.nodes.iter().filter(|node| node.left_child().is_some()) {
            importances[node.feature_index()] += node.improvement();
        }

        let norm_coeff = importances.sum();
        if norm_coeff > 0.0 {
            importances /= norm_coeff;
        }
        debug!(
            num_features = self.num_features(),
            total_improvement = norm_coeff,
            "computed feature importance"
        );
        importances
    }

    /// Class probabilities for a batch of samples.
    ///
    /// # Arguments
    ///
    /// * `x` - Row-major features, `num_samples * num_features` values. NaN marks a missing value.
    /// * `num_samples` - The number of rows in `x`.
    ///
    /// # Returns
    ///
    /// A row-major buffer of shape `[num_samples][num_outputs][max_num_classes]`.
    /// Classes past an output's own class count stay at 0.
    ///
    /// # Errors
    ///
    /// This method will return an error if the tree is empty or `x` has the wrong length.
    pub fn predict_proba(&self, x: &[T], num_samples: usize) -> Result<Vec<f64>, TreeError> {
        self.check_input(x, num_samples)?;
        let len = self
            .output_len(num_samples)
            .ok_or(TreeError::OutputLengthMismatch {
                expected: usize::MAX,
                got: 0,
            })?;
        let mut proba = vec![0.0; len];
        self.predict_proba_into(x, num_samples, &mut proba)?;
        Ok(proba)
    }

    /// Same as [`Tree::predict_proba`], writing into a caller-owned buffer.
    ///
    /// The buffer is overwritten. Samples are processed in parallel; the
    /// result does not depend on the number of worker threads.
    ///
    /// # Returns
    ///
    /// The number of leaves reached over all samples. It equals `num_samples`
    /// unless missing values sent some samples down both sides of a split.
    ///
    /// # Errors
    ///
    /// This method will return an error if the tree is empty or either buffer has the wrong length.
    #[instrument(skip(self, x, proba))]
    pub fn predict_proba_into(
        &self,
        x: &[T],
        num_samples: usize,
        proba: &mut [f64],
    ) -> Result<usize, TreeError> {
        self.check_input(x, num_samples)?;
        let stride = self.sample_stride();
        if self.output_len(num_samples) != Some(proba.len()) {
            return Err(TreeError::OutputLengthMismatch {
                expected: num_samples.saturating_mul(stride),
                got: proba.len(),
            });
        }

        proba.fill(0.0);
        let max_num_classes = self.max_num_classes();
        let leaves_reached: usize = proba
            .par_chunks_mut(stride)
            .zip(x.par_chunks_exact(self.num_features()))
            .map_init(Traversal::default, |traversal, (sample_proba, sample)| {
                let leaves = traversal.descend(&self.nodes, sample);
                for token in leaves {
                    let histogram = self.nodes[token.node.index()].histogram();
                    for (output, output_proba) in
                        sample_proba.chunks_exact_mut(max_num_classes).enumerate()
                    {
                        histogram.accumulate_normalized(output, token.weight, output_proba);
                    }
                }
                leaves.len()
            })
            .sum();
        debug!(num_samples, leaves_reached, "computed class probabilities");
        Ok(leaves_reached)
    }

    /// Class probabilities for the rows of a feature matrix.
    ///
    /// Returns one row per sample with `num_outputs * max_num_classes`
    /// columns laid out like a sample of [`Tree::predict_proba`].
    ///
    /// # Errors
    ///
    /// This method will return an error if the tree is empty or the matrix
    /// does not have `num_features` columns.
    pub fn predict_proba_matrix(&self, features: &DMatrix<T>) -> Result<DMatrix<f64>, TreeError> {
        let (num_samples, num_columns) = features.shape();
        if num_columns != self.num_features() {
            return Err(TreeError::FeatureCountMismatch {
                expected: self.num_features(),
                got: num_columns,
            });
        }
        // column-major storage of the transpose is the row-major layout of `features`
        let x = features.transpose();
        let proba = self.predict_proba(x.as_slice(), num_samples)?;
        Ok(DMatrix::from_row_slice(
            num_samples,
            self.sample_stride(),
            &proba,
        ))
    }

    /// Most probable class per sample and output, shaped `[num_samples][num_outputs]`.
    ///
    /// Ties go to the lowest class index.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Tree::predict_proba`].
    pub fn predict(&self, x: &[T], num_samples: usize) -> Result<Vec<usize>, TreeError> {
        let proba = self.predict_proba(x, num_samples)?;
        let max_num_classes = self.max_num_classes();
        let num_classes_list = self.num_classes_list();
        let predictions = proba
            .chunks_exact(max_num_classes)
            .zip(num_classes_list.iter().cycle())
            .map(|(output_proba, &num_classes)| {
                output_proba[..num_classes]
                    .iter()
                    .enumerate()
                    .fold((0, f64::NEG_INFINITY), |best, (class, &p)| {
                        if p > best.1 {
                            (class, p)
                        } else {
                            best
                        }
                    })
                    .0
            })
            .collect();
        Ok(predictions)
    }

    /// Emits one debug event per node with its summary line.
    pub fn log_node_info(&self) {
        for (index, node) in self.nodes.iter().enumerate() {
            debug!(node = index, "{node}");
        }
    }

    fn sample_stride(&self) -> usize {
        self.num_outputs() * self.max_num_classes()
    }

    /// Length of the probability buffer for `num_samples`, `None` on overflow.
    fn output_len(&self, num_samples: usize) -> Option<usize> {
        num_samples.checked_mul(self.sample_stride())
    }

    fn check_input(&self, x: &[T], num_samples: usize) -> Result<(), TreeError> {
        if self.nodes.is_empty() {
            return Err(TreeError::EmptyTree);
        }
        let num_features = self.num_features();
        if num_samples.checked_mul(num_features) != Some(x.len()) {
            return Err(TreeError::InputLengthMismatch {
                expected: num_samples.saturating_mul(num_features),
                got: x.len(),
            });
        }
        Ok(())
    }
}

impl<T: RealNumber> fmt::Display for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            writeln!(f, "{node}")?;
        }
        Ok(())
    }
}
