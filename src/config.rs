//! Tuning constants for the rope B-tree.
//!
//! The split/combine threshold for leaves has no single universally optimal
//! value -- it trades allocation cost against path length -- so it is
//! exposed here rather than hard-coded into the tree operations.

/// Tree shape parameters shared by every node in one rope family.
///
/// Mixing ropes built under different configs (e.g. concatenating a rope
/// built with `RopeConfig::default()` to one built with a custom config) is
/// a logic error: the resulting tree's balance invariant is only meaningful
/// relative to a single config. Debug builds assert this; see
/// [`crate::rope::Rope::concat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RopeConfig {
    pub min_children: usize,
    pub max_children: usize,
    pub max_leaf: usize,
}

impl RopeConfig {
    pub const fn new(min_children: usize, max_leaf: usize) -> Self {
        RopeConfig {
            min_children,
            max_children: min_children * 2,
            max_leaf,
        }
    }
}

impl Default for RopeConfig {
    fn default() -> Self {
        // MIN_CHILDREN=4, MAX_CHILDREN=8, MAX_LEAF=512 bytes.
        RopeConfig::new(4, 512)
    }
}
