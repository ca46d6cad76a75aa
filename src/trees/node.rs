use crate::data::RealNumber;
use crate::error::{ChildSide, TreeError};
use nalgebra::DVector;
use std::fmt;

/// Index into the node arena of a [`Tree`](super::tree::Tree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// Index of the root node.
    pub const ROOT: NodeIndex = NodeIndex(0);

    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where samples whose split feature is missing (NaN) are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingValuePolicy {
    /// Missing values were grouped with the left child during training.
    Left,
    /// Missing values were grouped with the right child during training.
    Right,
    /// No side owns missing values: the sample follows both children,
    /// weighted by their share of the training population.
    #[default]
    Split,
}

impl MissingValuePolicy {
    /// Decodes the integer tag used by tree growers: `0` is left, `1` is
    /// right and every other value means split.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => MissingValuePolicy::Left,
            1 => MissingValuePolicy::Right,
            _ => MissingValuePolicy::Split,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            MissingValuePolicy::Left => 0,
            MissingValuePolicy::Right => 1,
            MissingValuePolicy::Split => -1,
        }
    }
}

/// Weighted class counts of a node, one row per output.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    rows: Vec<DVector<f64>>,
}

impl From<Vec<Vec<f64>>> for Histogram {
    fn from(rows: Vec<Vec<f64>>) -> Self {
        Self::new(rows.into_iter().map(DVector::from_vec).collect())
    }
}

impl Histogram {
    pub fn new(rows: Vec<DVector<f64>>) -> Self {
        Self { rows }
    }

    pub fn num_outputs(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[DVector<f64>] {
        &self.rows
    }

    pub fn row(&self, output: usize) -> Option<&DVector<f64>> {
        self.rows.get(output)
    }

    /// Number of training samples (or their total weight) that reached the node,
    /// measured on the first output.
    pub fn population(&self) -> f64 {
        self.rows.first().map_or(0.0, |row| row.sum())
    }

    /// Class frequencies of `output`, or `None` when the row is empty or sums to zero.
    pub fn normalized_row(&self, output: usize) -> Option<DVector<f64>> {
        let row = self.rows.get(output)?;
        let total = row.sum();
        if total > 0.0 {
            Some(row / total)
        } else {
            None
        }
    }

    /// Adds `weight * normalized_row(output)` into `out`. Rows summing to zero contribute nothing.
    pub(crate) fn accumulate_normalized(&self, output: usize, weight: f64, out: &mut [f64]) {
        let Some(row) = self.rows.get(output) else {
            return;
        };
        let total = row.sum();
        if total > 0.0 {
            let scale = weight / total;
            for (slot, &count) in out.iter_mut().zip(row.iter()) {
                *slot += scale * count;
            }
        }
    }

    pub(crate) fn validate(&self, num_classes_list: &[usize]) -> Result<(), TreeError> {
        if self.rows.len() != num_classes_list.len() {
            return Err(TreeError::HistogramOutputMismatch {
                expected: num_classes_list.len(),
                got: self.rows.len(),
            });
        }
        for (output, (row, &num_classes)) in self.rows.iter().zip(num_classes_list).enumerate() {
            if row.len() != num_classes {
                return Err(TreeError::HistogramClassMismatch {
                    output,
                    expected: num_classes,
                    got: row.len(),
                });
            }
            if let Some((class, &value)) = row
                .iter()
                .enumerate()
                .find(|(_, &value)| !value.is_finite() || value < 0.0)
            {
                return Err(TreeError::InvalidHistogramCount {
                    output,
                    class,
                    value,
                });
            }
            let total = row.sum();
            if !total.is_finite() {
                return Err(TreeError::InvalidHistogramTotal { output, total });
            }
        }
        Ok(())
    }
}

/// Split decision recorded for a node. For leaves the feature and threshold are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitInfo<T: RealNumber> {
    pub feature_index: usize,
    pub missing_value_policy: MissingValuePolicy,
    pub threshold: T,
    pub impurity: f64,
    pub improvement: f64,
}

impl<T: RealNumber> SplitInfo<T> {
    /// Split on `feature_index`: values `<= threshold` go left.
    pub fn new(feature_index: usize, missing_value_policy: MissingValuePolicy, threshold: T) -> Self {
        Self {
            feature_index,
            missing_value_policy,
            threshold,
            impurity: 0.0,
            improvement: 0.0,
        }
    }

    /// Placeholder split for a node that is known to stay a leaf.
    pub fn leaf(impurity: f64) -> Self {
        Self::new(0, MissingValuePolicy::default(), T::zero()).with_impurity(impurity)
    }

    #[must_use]
    pub fn with_impurity(mut self, impurity: f64) -> Self {
        self.impurity = impurity;
        self
    }

    #[must_use]
    pub fn with_improvement(mut self, improvement: f64) -> Self {
        self.improvement = improvement;
        self
    }
}

/// Node of a [`Tree`](super::tree::Tree).
///
/// A node starts as a leaf and becomes internal when children are attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode<T: RealNumber> {
    left_child: Option<NodeIndex>,
    right_child: Option<NodeIndex>,
    feature_index: usize,
    missing_value_policy: MissingValuePolicy,
    threshold: T,
    impurity: f64,
    improvement: f64,
    histogram: Histogram,
}

impl<T: RealNumber> TreeNode<T> {
    pub(crate) fn new(split: SplitInfo<T>, histogram: Histogram) -> Self {
        Self {
            left_child: None,
            right_child: None,
            feature_index: split.feature_index,
            missing_value_policy: split.missing_value_policy,
            threshold: split.threshold,
            impurity: split.impurity,
            improvement: split.improvement,
            histogram,
        }
    }

    pub fn left_child(&self) -> Option<NodeIndex> {
        self.left_child
    }

    pub fn right_child(&self) -> Option<NodeIndex> {
        self.right_child
    }

    /// Both children, if the node routes samples.
    pub fn children(&self) -> Option<(NodeIndex, NodeIndex)> {
        self.left_child.zip(self.right_child)
    }

    pub fn is_leaf(&self) -> bool {
        self.left_child.is_none() && self.right_child.is_none()
    }

    pub fn feature_index(&self) -> usize {
        self.feature_index
    }

    pub fn missing_value_policy(&self) -> MissingValuePolicy {
        self.missing_value_policy
    }

    pub fn threshold(&self) -> T {
        self.threshold
    }

    pub fn impurity(&self) -> f64 {
        self.impurity
    }

    pub fn improvement(&self) -> f64 {
        self.improvement
    }

    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    pub(crate) fn attach_child(&mut self, side: ChildSide, child: NodeIndex) -> Result<(), ChildSide> {
        let slot = match side {
            ChildSide::Left => &mut self.left_child,
            ChildSide::Right => &mut self.right_child,
        };
        if slot.is_some() {
            return Err(side);
        }
        *slot = Some(child);
        Ok(())
    }
}

fn fmt_child(child: Option<NodeIndex>) -> String {
    child.map_or_else(|| "none".to_string(), |index| index.to_string())
}

impl<T: RealNumber> fmt::Display for TreeNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "left child = {}, right child = {}, feature index = {}, threshold = {}, improvement = {}, histogram size = ({}, {})",
            fmt_child(self.left_child),
            fmt_child(self.right_child),
            self.feature_index,
            self.threshold,
            self.improvement,
            self.histogram.num_outputs(),
            self.histogram.row(0).map_or(0, |row| row.len()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_missing_value_policy_codes() {
        assert_eq!(MissingValuePolicy::from_code(0), MissingValuePolicy::Left);
        assert_eq!(MissingValuePolicy::from_code(1), MissingValuePolicy::Right);
        assert_eq!(MissingValuePolicy::from_code(2), MissingValuePolicy::Split);
        assert_eq!(MissingValuePolicy::from_code(-1), MissingValuePolicy::Split);
        for policy in [
            MissingValuePolicy::Left,
            MissingValuePolicy::Right,
            MissingValuePolicy::Split,
        ] {
            assert_eq!(MissingValuePolicy::from_code(policy.code()), policy);
        }
    }

    #[test]
    fn test_histogram_population_uses_first_output() {
        let histogram = Histogram::from(vec![vec![3.0, 1.0], vec![0.5, 0.5, 9.0]]);
        assert_eq!(histogram.num_outputs(), 2);
        assert_relative_eq!(histogram.population(), 4.0);
        assert_relative_eq!(Histogram::new(vec![]).population(), 0.0);
    }

    #[test]
    fn test_histogram_normalized_row() {
        let histogram = Histogram::from(vec![vec![3.0, 1.0], vec![0.0, 0.0]]);
        let row = histogram.normalized_row(0).unwrap();
        assert_relative_eq!(row, DVector::from_vec(vec![0.75, 0.25]));
        assert!(histogram.normalized_row(1).is_none());
        assert!(histogram.normalized_row(2).is_none());
    }

    #[test]
    fn test_histogram_accumulate_normalized() {
        let histogram = Histogram::from(vec![vec![1.0, 3.0], vec![0.0, 0.0]]);
        let mut out = vec![0.1, 0.2];
        histogram.accumulate_normalized(0, 0.5, &mut out);
        assert_relative_eq!(out[0], 0.1 + 0.125);
        assert_relative_eq!(out[1], 0.2 + 0.375);

        let mut untouched = vec![0.0, 0.0];
        histogram.accumulate_normalized(1, 1.0, &mut untouched);
        assert_eq!(untouched, vec![0.0, 0.0]);
    }

    #[test]
    fn test_histogram_validate() {
        let histogram = Histogram::from(vec![vec![1.0, 2.0]]);
        assert!(histogram.validate(&[2]).is_ok());
        assert_eq!(
            histogram.validate(&[2, 3]),
            Err(TreeError::HistogramOutputMismatch {
                expected: 2,
                got: 1
            })
        );
        assert_eq!(
            histogram.validate(&[3]),
            Err(TreeError::HistogramClassMismatch {
                output: 0,
                expected: 3,
                got: 2
            })
        );
        let negative = Histogram::from(vec![vec![1.0, -2.0]]);
        assert_eq!(
            negative.validate(&[2]),
            Err(TreeError::InvalidHistogramCount {
                output: 0,
                class: 1,
                value: -2.0
            })
        );
        let nan = Histogram::from(vec![vec![f64::NAN, 2.0]]);
        assert!(nan.validate(&[2]).is_err());

        let overflowing = Histogram::from(vec![vec![1.0], vec![1e308, 1e308]]);
        assert_eq!(
            overflowing.validate(&[1, 2]),
            Err(TreeError::InvalidHistogramTotal {
                output: 1,
                total: f64::INFINITY
            })
        );
        let largest = Histogram::from(vec![vec![f64::MAX, 0.0]]);
        assert!(largest.validate(&[2]).is_ok());
    }

    #[test]
    fn test_new_node_is_leaf() {
        let node: TreeNode<f64> = TreeNode::new(
            SplitInfo::new(2, MissingValuePolicy::Left, 0.5).with_improvement(0.25),
            Histogram::from(vec![vec![1.0, 1.0]]),
        );
        assert!(node.is_leaf());
        assert!(node.children().is_none());
        assert_eq!(node.feature_index(), 2);
        assert_eq!(node.missing_value_policy(), MissingValuePolicy::Left);
        assert_relative_eq!(node.improvement(), 0.25);
    }

    #[test]
    fn test_attach_child_once() {
        let mut node: TreeNode<f64> =
            TreeNode::new(SplitInfo::leaf(0.5), Histogram::from(vec![vec![1.0]]));
        node.attach_child(ChildSide::Left, NodeIndex::new(1)).unwrap();
        assert!(!node.is_leaf());
        assert!(node.children().is_none());
        assert_eq!(
            node.attach_child(ChildSide::Left, NodeIndex::new(2)),
            Err(ChildSide::Left)
        );
        node.attach_child(ChildSide::Right, NodeIndex::new(2)).unwrap();
        assert_eq!(node.children(), Some((NodeIndex::new(1), NodeIndex::new(2))));
    }

    #[test]
    fn test_node_display() {
        let mut node: TreeNode<f64> = TreeNode::new(
            SplitInfo::new(0, MissingValuePolicy::Split, 0.5).with_improvement(0.125),
            Histogram::from(vec![vec![4.0, 4.0]]),
        );
        node.attach_child(ChildSide::Left, NodeIndex::new(1)).unwrap();
        assert_eq!(
            node.to_string(),
            "left child = 1, right child = none, feature index = 0, threshold = 0.5, improvement = 0.125, histogram size = (1, 2)"
        );
    }
}
