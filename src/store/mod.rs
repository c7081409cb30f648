//! Authoritative node and chain collections

pub mod chains;
pub mod nodes;

pub use chains::ChainStore;
pub use nodes::NodeStore;
