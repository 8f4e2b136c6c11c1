use thiserror::Error;

/// Error enumerates over all possible errors that this package
/// shall return.
#[derive(Debug, PartialEq, Error)]
pub enum Error<K> {
    /// Well known value for stopping a walk, callbacks can return this
    /// to terminate the walk early. Walk hands it back verbatim.
    #[error("stop walking")]
    Stop,
    /// Fatal case, a red node has a red child.
    #[error("consecutive red nodes")]
    ConsecutiveReds,
    /// Fatal case, root node is not black.
    #[error("root node is red")]
    RedRoot,
    /// Fatal case, black height differs between two paths. The String
    /// component of this variant can be used for debugging.
    #[error("unbalanced blacks, {0}")]
    UnbalancedBlacks(String),
    /// Fatal case, index entries are not in sort-order.
    #[error("sort error, {0:?} after {1:?}")]
    SortError(K, K),
    /// Fatal case, parent link of the node does not point back to the
    /// node that holds it as a child.
    #[error("broken parent link at {0:?}")]
    BrokenLink(K),
    /// Fatal case, number of reachable entries does not match len().
    #[error("entry count {found} does not match len {expected}")]
    EntryCount { expected: usize, found: usize },
}
