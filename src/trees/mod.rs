/// Nodes, histograms and split records
pub mod node;
/// Tree shape configuration
pub mod params;
mod routing;
/// The tree itself
pub mod tree;

pub use node::{Histogram, MissingValuePolicy, NodeIndex, SplitInfo, TreeNode};
pub use params::TreeParams;
pub use tree::Tree;
