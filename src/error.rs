use std::fmt;

/// Which child slot of a parent node an operation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildSide {
    Left,
    Right,
}

impl fmt::Display for ChildSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildSide::Left => write!(f, "left"),
            ChildSide::Right => write!(f, "right"),
        }
    }
}

/// Errors from building a tree or running inference on it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TreeError {
    /// Returned when a tree is configured with zero features.
    #[error("num_features must be at least 1, got {num_features}")]
    InvalidFeatureCount {
        /// The invalid feature count.
        num_features: usize,
    },

    /// Returned when the per-output class-count list is empty.
    #[error("a tree needs at least one output")]
    NoOutputs,

    /// Returned when an output is configured with zero classes.
    #[error("output {output} must have at least 1 class, got {num_classes}")]
    InvalidClassCount {
        /// The offending output.
        output: usize,
        /// The invalid class count.
        num_classes: usize,
    },

    /// Returned when a second root is added.
    #[error("the tree already has a root node")]
    RootAlreadyExists,

    /// Returned when a non-root node is added before the root.
    #[error("cannot attach a child before the root node exists")]
    MissingRoot,

    /// Returned when the parent index does not name an existing node.
    #[error("parent index {parent} is out of bounds for a tree of {node_count} nodes")]
    ParentOutOfBounds {
        /// The requested parent index.
        parent: usize,
        /// The number of nodes in the tree.
        node_count: usize,
    },

    /// Returned when the parent's child slot is already taken.
    #[error("node {parent} already has a {side} child")]
    ChildAlreadyAssigned {
        /// The parent node index.
        parent: usize,
        /// The slot that was already assigned.
        side: ChildSide,
    },

    /// Returned when a split feature is outside the configured feature range.
    #[error("feature index {feature_index} is out of bounds for {num_features} features")]
    FeatureOutOfBounds {
        /// The requested feature index.
        feature_index: usize,
        /// The number of features of the tree.
        num_features: usize,
    },

    /// Returned when a histogram has the wrong number of output rows.
    #[error("histogram has {got} output rows, expected {expected}")]
    HistogramOutputMismatch {
        /// The configured number of outputs.
        expected: usize,
        /// The number of rows supplied.
        got: usize,
    },

    /// Returned when a histogram row has the wrong number of classes.
    #[error("histogram row {output} has {got} classes, expected {expected}")]
    HistogramClassMismatch {
        /// The output row.
        output: usize,
        /// The configured class count for that output.
        expected: usize,
        /// The number of classes supplied.
        got: usize,
    },

    /// Returned when a histogram count is negative or not finite.
    #[error("histogram count at output {output}, class {class} is invalid: {value}")]
    InvalidHistogramCount {
        /// The output row.
        output: usize,
        /// The class column.
        class: usize,
        /// The offending value.
        value: f64,
    },

    /// Returned when a histogram row sums to a value that is not finite.
    #[error("histogram row {output} sums to {total}")]
    InvalidHistogramTotal {
        /// The output row.
        output: usize,
        /// The overflowing total.
        total: f64,
    },

    /// Returned when the feature buffer does not hold `num_samples * num_features` values.
    #[error("feature buffer has {got} values, expected {expected}")]
    InputLengthMismatch {
        /// The expected buffer length.
        expected: usize,
        /// The actual buffer length.
        got: usize,
    },

    /// Returned when a feature matrix does not have one column per feature.
    #[error("feature matrix has {got} columns, expected {expected}")]
    FeatureCountMismatch {
        /// The number of features of the tree.
        expected: usize,
        /// The number of columns supplied.
        got: usize,
    },

    /// Returned when a caller-supplied probability buffer has the wrong length.
    #[error("probability buffer has {got} values, expected {expected}")]
    OutputLengthMismatch {
        /// The expected buffer length.
        expected: usize,
        /// The actual buffer length.
        got: usize,
    },

    /// Returned when inference runs on a tree without nodes.
    #[error("the tree has no nodes")]
    EmptyTree,
}

/// Errors from [`RandomState`](crate::random::RandomState) sampling.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RandomError {
    /// Returned when the half-open interval `[low, high)` is empty.
    #[error("empty sampling range [{low}, {high})")]
    EmptyRange {
        /// Included lower bound.
        low: f64,
        /// Excluded upper bound.
        high: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TreeError::ChildAlreadyAssigned {
            parent: 3,
            side: ChildSide::Right,
        };
        assert_eq!(err.to_string(), "node 3 already has a right child");

        let err = TreeError::InputLengthMismatch {
            expected: 6,
            got: 4,
        };
        assert_eq!(err.to_string(), "feature buffer has 4 values, expected 6");

        let err = TreeError::FeatureCountMismatch {
            expected: 3,
            got: 2,
        };
        assert_eq!(err.to_string(), "feature matrix has 2 columns, expected 3");

        let err = TreeError::InvalidHistogramTotal {
            output: 1,
            total: f64::INFINITY,
        };
        assert_eq!(err.to_string(), "histogram row 1 sums to inf");

        let err = RandomError::EmptyRange {
            low: 1.0,
            high: 1.0,
        };
        assert_eq!(err.to_string(), "empty sampling range [1, 1)");
    }
}
