//! Weighted descent of one sample from the root to the leaves it reaches.
use super::node::{MissingValuePolicy, NodeIndex, TreeNode};
use crate::data::RealNumber;

/// A path in flight: the node it has reached and the share of the sample it carries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathToken {
    pub node: NodeIndex,
    pub weight: f64,
}

impl PathToken {
    fn root() -> Self {
        Self {
            node: NodeIndex::ROOT,
            weight: 1.0,
        }
    }
}

/// Work lists for routing samples, reused from one sample to the next.
#[derive(Debug, Default)]
pub(crate) struct Traversal {
    pending: Vec<PathToken>,
    leaves: Vec<PathToken>,
}

impl Traversal {
    /// Routes `sample` through `nodes` and returns every leaf reached with its weight.
    ///
    /// Without missing values exactly one leaf is returned with weight 1. The
    /// weights of the returned tokens always sum to 1.
    pub(crate) fn descend<T: RealNumber>(
        &mut self,
        nodes: &[TreeNode<T>],
        sample: &[T],
    ) -> &[PathToken] {
        self.pending.clear();
        self.leaves.clear();
        self.pending.push(PathToken::root());

        while let Some(mut token) = self.pending.pop() {
            while let Some((left, right)) = nodes[token.node.index()].children() {
                let node = &nodes[token.node.index()];
                let value = sample[node.feature_index()];
                if value.is_nan() {
                    match node.missing_value_policy() {
                        MissingValuePolicy::Left => token.node = left,
                        MissingValuePolicy::Right => token.node = right,
                        MissingValuePolicy::Split => {
                            let (left_share, right_share) = population_shares(
                                nodes[left.index()].histogram().population(),
                                nodes[right.index()].histogram().population(),
                            );
                            self.pending.push(PathToken {
                                node: right,
                                weight: token.weight * right_share,
                            });
                            token = PathToken {
                                node: left,
                                weight: token.weight * left_share,
                            };
                        }
                    }
                } else if value <= node.threshold() {
                    token.node = left;
                } else {
                    token.node = right;
                }
            }
            self.leaves.push(token);
        }
        &self.leaves
    }
}

/// Fractions of the parent population that went left and right.
/// Two empty children share the weight evenly.
fn population_shares(left: f64, right: f64) -> (f64, f64) {
    let total = left + right;
    if total.is_infinite() {
        return population_shares(left / 2.0, right / 2.0);
    }
    if total > 0.0 {
        (left / total, right / total)
    } else {
        (0.5, 0.5)
    }
}
