//! A persistent, copy-on-write byte rope: an immutable B-tree of leaves
//! shared by `Arc`, cloning only the path a mutation touches.
//!
//! `Rope` itself only moves bytes around; it knows nothing about UTF-8 or
//! normalization. [`crate::grapherope::GraphemeRope`] is the text-aware
//! facade built on top of it.

mod leaf;
mod node;

pub use leaf::Leaf;
pub(crate) use node::{concat as node_concat, find_element, for_each_segment, size, substr as node_substr};

use std::sync::Arc;

use crate::config::RopeConfig;
use crate::error::TextError;
use node::{empty_node, insert as node_insert, Node};

/// A byte rope: `O(log n)` substring, insert, erase, and concatenation, with
/// structural sharing between any ropes derived from one another.
#[derive(Debug, Clone)]
pub struct Rope {
    root: Arc<Node>,
    config: RopeConfig,
}

impl Default for Rope {
    fn default() -> Self {
        Rope::new()
    }
}

impl Rope {
    pub fn new() -> Self {
        Rope::with_config(RopeConfig::default())
    }

    pub fn with_config(config: RopeConfig) -> Self {
        Rope {
            root: empty_node(),
            config,
        }
    }

    pub fn config(&self) -> RopeConfig {
        self.config
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Rope::from_bytes_with_config(bytes, RopeConfig::default())
    }

    /// Builds a rope from a byte buffer, chunking it into `max_leaf`-sized
    /// pieces and folding them together with `concat` so a large initial
    /// buffer still produces a balanced tree rather than one oversized leaf.
    pub fn from_bytes_with_config(bytes: Vec<u8>, config: RopeConfig) -> Self {
        let mut root = empty_node();
        for chunk in bytes.chunks(config.max_leaf.max(1)) {
            let leaf = Arc::new(Node::Leaf(Leaf::from_bytes(chunk.to_vec())));
            root = node_concat(&root, &leaf, &config);
        }
        Rope { root, config }
    }

    pub fn len(&self) -> usize {
        size(&self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `find_element`: the byte at `offset`.
    pub fn byte_at(&self, offset: usize) -> Result<u8, TextError> {
        let len = self.len();
        if offset >= len {
            return Err(TextError::OffsetOutOfBounds { offset, len });
        }
        Ok(find_element(&self.root, offset))
    }

    /// `concat`. Mixing ropes built under different
    /// [`RopeConfig`]s is a logic error (their balance invariants are only
    /// meaningful relative to one config); debug builds assert against it.
    pub fn concat(&self, other: &Rope) -> Rope {
        debug_assert_eq!(
            self.config, other.config,
            "concatenating ropes built under different RopeConfigs"
        );
        Rope {
            root: node_concat(&self.root, &other.root, &self.config),
            config: self.config,
        }
    }

    /// `substr`: the half-open byte span `[lo, hi)`.
    pub fn substr(&self, lo: usize, hi: usize) -> Result<Rope, TextError> {
        let len = self.len();
        if lo > hi || hi > len {
            return Err(TextError::OffsetOutOfBounds { offset: hi, len });
        }
        Ok(Rope {
            root: node_substr(&self.root, lo, hi, &self.config),
            config: self.config,
        })
    }

    /// `insert`: splices `bytes` in at `offset`.
    pub fn insert(&mut self, offset: usize, bytes: &[u8]) -> Result<(), TextError> {
        let len = self.len();
        if offset > len {
            return Err(TextError::OffsetOutOfBounds { offset, len });
        }
        if bytes.is_empty() {
            return Ok(());
        }
        if bytes.len() <= self.config.max_leaf {
            node_insert(&mut self.root, offset, Leaf::from_bytes(bytes.to_vec()), &self.config);
        } else {
            // Larger than one leaf can hold: build a small balanced subtree
            // out-of-line and splice it in with concat, rather than forcing
            // `insert_nonfull` to split one oversized leaf bytewise.
            let middle = Rope::from_bytes_with_config(bytes.to_vec(), self.config);
            let left = node_substr(&self.root, 0, offset, &self.config);
            let right = node_substr(&self.root, offset, len, &self.config);
            self.root = node_concat(&node_concat(&left, &middle.root, &self.config), &right, &self.config);
        }
        Ok(())
    }

    /// `erase`: removes the half-open byte span `[lo, hi)`.
    ///
    /// Implemented as `concat(substr(0, lo), substr(hi, len))` rather than
    /// the classical in-place descend/trim/rebalance: both substr and
    /// concat already carry the correct O(log n) behaviour and rebalancing,
    /// so composing them gives erase the same guarantees without a second,
    /// independently fallible borrow-or-merge implementation.
    pub fn erase(&mut self, lo: usize, hi: usize) -> Result<(), TextError> {
        let len = self.len();
        if lo > hi || hi > len {
            return Err(TextError::OffsetOutOfBounds { offset: hi, len });
        }
        if lo == hi {
            return Ok(());
        }
        let left = node_substr(&self.root, 0, lo, &self.config);
        let right = node_substr(&self.root, hi, len, &self.config);
        self.root = node_concat(&left, &right, &self.config);
        Ok(())
    }

    /// Replaces the half-open span `[lo, hi)` with `bytes` in one step.
    pub fn replace(&mut self, lo: usize, hi: usize, bytes: &[u8]) -> Result<(), TextError> {
        let len = self.len();
        if lo > hi || hi > len {
            return Err(TextError::OffsetOutOfBounds { offset: hi, len });
        }
        let left = node_substr(&self.root, 0, lo, &self.config);
        let right = node_substr(&self.root, hi, len, &self.config);
        let middle = Rope::from_bytes_with_config(bytes.to_vec(), self.config).root;
        self.root = node_concat(&node_concat(&left, &middle, &self.config), &right, &self.config);
        Ok(())
    }

    /// Whether `self` and `other` share their root node -- a cheap,
    /// structural "equal-root" check: true only when one is an unedited
    /// clone of the other's exact tree.
    pub fn equal_root(&self, other: &Rope) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }

    /// `for_each_segment`: visits owned-leaf byte slices in
    /// order without materializing the whole rope.
    pub fn for_each_segment(&self, mut f: impl FnMut(&[u8])) {
        for_each_segment(&self.root, &mut f);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        self.for_each_segment(|chunk| out.extend_from_slice(chunk));
        out
    }

    pub(crate) fn root(&self) -> &Arc<Node> {
        &self.root
    }

    pub(crate) fn from_root(root: Arc<Node>, config: RopeConfig) -> Self {
        Rope { root, config }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_erase_round_trip() {
        let mut r = Rope::from_bytes(b"hello world".to_vec());
        r.insert(5, b",").unwrap();
        assert_eq!(r.to_bytes(), b"hello, world");
        r.erase(5, 6).unwrap();
        assert_eq!(r.to_bytes(), b"hello world");
    }

    #[test]
    fn substr_shares_structure_until_edited() {
        let r = Rope::from_bytes(b"the quick brown fox".to_vec());
        let piece = r.substr(4, 9).unwrap();
        assert_eq!(piece.to_bytes(), b"quick");
        assert!(r.equal_root(&r.clone()));
        assert!(!r.equal_root(&piece));
    }

    #[test]
    fn replace_swaps_a_span() {
        let mut r = Rope::from_bytes(b"the quick brown fox".to_vec());
        r.replace(4, 9, b"slow").unwrap();
        assert_eq!(r.to_bytes(), b"the slow brown fox");
    }

    #[test]
    fn out_of_bounds_offsets_error() {
        let mut r = Rope::from_bytes(b"abc".to_vec());
        assert!(r.substr(0, 10).is_err());
        assert!(r.insert(10, b"x").is_err());
        assert!(r.erase(2, 1).is_err());
    }

    #[test]
    fn large_insert_still_round_trips() {
        let mut r = Rope::with_config(RopeConfig::new(2, 8));
        r.insert(0, b"0123456789").unwrap();
        r.insert(5, b"abcdefghijklmnop").unwrap();
        let mut expected = b"0123456789".to_vec();
        expected.splice(5..5, b"abcdefghijklmnop".to_vec());
        assert_eq!(r.to_bytes(), expected);
    }

    #[test]
    fn byte_at_matches_slice_indexing() {
        let r = Rope::from_bytes(b"hello".to_vec());
        for i in 0..5 {
            assert_eq!(r.byte_at(i).unwrap(), b"hello"[i]);
        }
        assert!(r.byte_at(5).is_err());
    }

    #[test]
    fn for_each_segment_covers_every_byte_in_order() {
        let r = Rope::from_bytes_with_config(b"abcdefghijklmnop".to_vec(), RopeConfig::new(2, 3));
        let mut collected = Vec::new();
        r.for_each_segment(|chunk| collected.extend_from_slice(chunk));
        assert_eq!(collected, b"abcdefghijklmnop");
    }
}
