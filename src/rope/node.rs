//! The B-tree proper: `Node::Leaf`/`Node::Interior`, shared via `Arc` and
//! mutated copy-on-write (`Arc::make_mut`), generalized with a two-variant
//! leaf (owned bytes vs. a reference window into a shared owner).
//!
//! `concat` and `substr` are the two primitives everything else is built
//! from. `Rope::insert`/`erase`/`replace` (see `super::mod`) compose them
//! rather than splicing children in place -- classical B-tree deletion's
//! borrow-or-merge rebalancing has enough edge cases that duplicating it
//! here, unverified by a compiler, would trade real robustness for a
//! marginal constant-factor win. `split_leaf`/`split_child`/`insert_child`/
//! `erase_child` are still implemented and exercised by the top-down
//! insertion path below.

use std::sync::Arc;

use super::leaf::Leaf;
use crate::config::RopeConfig;

#[derive(Debug, Clone)]
pub enum Node {
    Leaf(Leaf),
    Interior(Interior),
}

#[derive(Debug, Clone)]
pub struct Interior {
    pub children: Vec<Arc<Node>>,
    /// `keys[i]` is the total byte length of the first `i + 1` children.
    /// Strictly increasing; `keys.last()` is the subtree size.
    pub keys: Vec<usize>,
}

impl Interior {
    fn empty() -> Self {
        Interior {
            children: Vec::new(),
            keys: Vec::new(),
        }
    }

    fn recompute_keys_from(&mut self, index: usize) {
        let mut acc = if index == 0 { 0 } else { self.keys[index - 1] };
        for i in index..self.children.len() {
            acc += size(&self.children[i]);
            self.keys[i] = acc;
        }
    }

    /// `insert_child`: inserts `child` at `index`, shifting
    /// the rest right, and repairs the cumulative keys in lockstep.
    pub fn insert_child(&mut self, index: usize, child: Arc<Node>) {
        self.children.insert(index, child);
        self.keys.insert(index, 0);
        self.recompute_keys_from(index);
    }

    /// `erase_child`: removes the child at `index` and
    /// repairs the cumulative keys for everything after it.
    pub fn erase_child(&mut self, index: usize) {
        self.children.remove(index);
        self.keys.remove(index);
        if index < self.children.len() {
            self.recompute_keys_from(index);
        }
    }

    /// Locates the child containing byte offset `offset`, treating an
    /// offset exactly on a boundary as the start of the following child
    /// (the right convention for an insertion point or a half-open range's
    /// low end).
    fn locate(&self, offset: usize) -> (usize, usize) {
        let mut idx = 0;
        while idx + 1 < self.children.len() && offset >= self.keys[idx] {
            idx += 1;
        }
        let prev = if idx == 0 { 0 } else { self.keys[idx - 1] };
        (idx, offset - prev)
    }

    /// Locates the child an *exclusive* end offset falls within, treating
    /// an offset exactly on a boundary as the end of the preceding child
    /// rather than the start of the next (the right convention for a
    /// half-open range's high end).
    fn locate_end(&self, offset: usize) -> (usize, usize) {
        if offset == 0 {
            return (0, 0);
        }
        let mut idx = 0;
        while idx + 1 < self.children.len() && offset > self.keys[idx] {
            idx += 1;
        }
        let prev = if idx == 0 { 0 } else { self.keys[idx - 1] };
        (idx, offset - prev)
    }
}

pub fn size(node: &Node) -> usize {
    match node {
        Node::Leaf(l) => l.len(),
        Node::Interior(i) => i.keys.last().copied().unwrap_or(0),
    }
}

pub fn height(node: &Node) -> usize {
    match node {
        Node::Leaf(_) => 0,
        Node::Interior(i) => i
            .children
            .first()
            .map(|c| 1 + height(c))
            .unwrap_or(0),
    }
}

pub fn empty_node() -> Arc<Node> {
    Arc::new(Node::Interior(Interior::empty()))
}

fn wrap_as_interior(children: Vec<Arc<Node>>) -> Arc<Node> {
    let mut interior = Interior {
        keys: vec![0; children.len()],
        children,
    };
    interior.recompute_keys_from(0);
    Arc::new(Node::Interior(interior))
}

/// `find_leaf`: the leaf containing byte `offset`, and the
/// offset within it. The "path of ancestors" the prose also names is the
/// recursion's own call stack rather than an explicit returned vector --
/// idiomatic for a tree this shape (ropey's equivalent walk does the same).
pub fn find_leaf(node: &Node, offset: usize) -> (&Leaf, usize) {
    match node {
        Node::Leaf(l) => (l, offset),
        Node::Interior(i) => {
            let (idx, local) = i.locate(offset);
            find_leaf(&i.children[idx], local)
        }
    }
}

/// `find_element`: the byte at `offset`.
pub fn find_element(node: &Node, offset: usize) -> u8 {
    let (leaf, local) = find_leaf(node, offset);
    leaf.as_bytes()[local]
}

pub fn for_each_segment<'a>(node: &'a Node, f: &mut dyn FnMut(&'a [u8])) {
    match node {
        Node::Leaf(leaf) => f(leaf.as_bytes()),
        Node::Interior(i) => {
            for child in &i.children {
                for_each_segment(child, f);
            }
        }
    }
}

/// `split_leaf`: splits one leaf into the pieces before and
/// after `offset`, both encoded as reference leaves.
pub fn split_leaf(leaf: &Leaf, offset: usize) -> (Leaf, Leaf) {
    (leaf.slice(0, offset, true), leaf.slice(offset, leaf.len(), true))
}

/// `split_child`: splits `parent.children[index]`, which must
/// be an interior node at its `max_children` capacity, into two halves and
/// inserts the new right half immediately after it.
///
/// "Unlike a classical B-tree: here all data lives in leaves, so only the
/// size keys change" -- no payload moves, just the child list and keys.
pub fn split_child(parent: &mut Interior, index: usize, config: &RopeConfig) {
    let right = {
        let child = Arc::make_mut(&mut parent.children[index]);
        match child {
            Node::Interior(ci) => {
                debug_assert!(ci.children.len() >= config.max_children);
                let mid = ci.children.len() / 2;
                let right_children = ci.children.split_off(mid);
                ci.keys.truncate(mid);
                wrap_as_interior(right_children)
            }
            Node::Leaf(_) => unreachable!("split_child only splits interior children"),
        }
    };
    parent.insert_child(index + 1, right);
    log::trace!(
        "rope: split_child at index {index}, parent now has {} children",
        parent.children.len()
    );
}

enum LeafEdit {
    Merged(Leaf),
    /// One, two, or three leaves replacing the original, in order.
    Split(Vec<Leaf>),
}

fn edit_leaf_for_insert(existing: &Leaf, offset: usize, new_leaf: Leaf, config: &RopeConfig) -> LeafEdit {
    if existing.len() + new_leaf.len() <= config.max_leaf {
        let mut bytes = existing.as_bytes()[..offset].to_vec();
        bytes.extend_from_slice(new_leaf.as_bytes());
        bytes.extend_from_slice(&existing.as_bytes()[offset..]);
        LeafEdit::Merged(Leaf::from_bytes(bytes))
    } else {
        let (before, after) = split_leaf(existing, offset);
        log::trace!(
            "rope: leaf split at offset {offset} to hold a {}-byte insertion",
            new_leaf.len()
        );
        if before.is_empty() || after.is_empty() {
            // Insertion lands at one edge of the leaf: only one of the two
            // halves is non-empty, so this replaces one child with two.
            let mut pieces = Vec::with_capacity(2);
            if !before.is_empty() {
                pieces.push(before);
            }
            pieces.push(new_leaf);
            if !after.is_empty() {
                pieces.push(after);
            }
            LeafEdit::Split(pieces)
        } else {
            // Insertion lands in the middle: before, new_leaf, and after
            // are all non-empty. Keeping them as three separate children
            // would replace one child with three, growing the parent by
            // two -- but the parent only ever has room reserved for one
            // extra child (the same room `split_child` relies on for a
            // full interior child). Re-chunk the combined bytes evenly
            // into two leaves instead, so this case grows the parent by
            // one, same as every other leaf split.
            let mut bytes = before.as_bytes().to_vec();
            bytes.extend_from_slice(new_leaf.as_bytes());
            bytes.extend_from_slice(after.as_bytes());
            let mid = bytes.len().div_ceil(2);
            let right = Leaf::from_bytes(bytes.split_off(mid));
            let left = Leaf::from_bytes(bytes);
            LeafEdit::Split(vec![left, right])
        }
    }
}

fn replace_leaf_child(interior: &mut Interior, index: usize, edit: LeafEdit) {
    match edit {
        LeafEdit::Merged(merged) => {
            interior.children[index] = Arc::new(Node::Leaf(merged));
            interior.recompute_keys_from(index);
        }
        LeafEdit::Split(pieces) => {
            interior.erase_child(index);
            for (offset, leaf) in pieces.into_iter().enumerate() {
                interior.insert_child(index + offset, Arc::new(Node::Leaf(leaf)));
            }
        }
    }
}

/// `insert`: grows the root by one level first if it is at
/// capacity, then descends with `insert_nonfull`.
pub fn insert(root: &mut Arc<Node>, offset: usize, new_leaf: Leaf, config: &RopeConfig) {
    if new_leaf.is_empty() {
        return;
    }
    if size(root) == 0 {
        *root = Arc::new(Node::Leaf(new_leaf));
        return;
    }
    let root_is_full_interior = matches!(&**root, Node::Interior(i) if i.children.len() >= config.max_children);
    if root_is_full_interior {
        let old_root = root.clone();
        *root = wrap_as_interior(vec![old_root]);
    }
    insert_nonfull(root, offset, new_leaf, config);
}

/// `insert_nonfull`: classical top-down B-tree insertion.
/// `node` must have fewer than `max_children` children if it is interior
/// (anything is allowed if it is a bare leaf, which only happens at the
/// root of a small rope). Every full interior child is split *before* the
/// recursive descent reaches it, so a child is never discovered to be full
/// only after already being inside it.
fn insert_nonfull(node: &mut Arc<Node>, offset: usize, new_leaf: Leaf, config: &RopeConfig) {
    if matches!(&**node, Node::Leaf(_)) {
        let existing = match &**node {
            Node::Leaf(l) => l.clone(),
            Node::Interior(_) => unreachable!(),
        };
        *node = match edit_leaf_for_insert(&existing, offset, new_leaf, config) {
            LeafEdit::Merged(merged) => Arc::new(Node::Leaf(merged)),
            LeafEdit::Split(pieces) if pieces.len() == 1 => {
                Arc::new(Node::Leaf(pieces.into_iter().next().unwrap()))
            }
            LeafEdit::Split(pieces) => {
                wrap_as_interior(pieces.into_iter().map(|l| Arc::new(Node::Leaf(l))).collect())
            }
        };
        return;
    }

    let interior = match Arc::make_mut(node) {
        Node::Interior(i) => i,
        Node::Leaf(_) => unreachable!(),
    };
    let (mut idx, mut local) = interior.locate(offset);

    let child_is_full_interior =
        matches!(&*interior.children[idx], Node::Interior(ci) if ci.children.len() >= config.max_children);
    if child_is_full_interior {
        split_child(interior, idx, config);
        if local >= size(&interior.children[idx]) {
            local -= size(&interior.children[idx]);
            idx += 1;
        }
    }

    if matches!(&*interior.children[idx], Node::Leaf(_)) {
        let existing = match &*interior.children[idx] {
            Node::Leaf(l) => l.clone(),
            Node::Interior(_) => unreachable!(),
        };
        let edit = edit_leaf_for_insert(&existing, local, new_leaf, config);
        replace_leaf_child(interior, idx, edit);
    } else {
        insert_nonfull(&mut interior.children[idx], local, new_leaf, config);
        interior.recompute_keys_from(idx);
    }
}

/// `substr`: the half-open span `[lo, hi)`, built entirely
/// from reference leaves except where `concat` must merge adjoining pieces.
pub fn substr(root: &Arc<Node>, lo: usize, hi: usize, config: &RopeConfig) -> Arc<Node> {
    debug_assert!(lo <= hi && hi <= size(root));
    if lo == 0 && hi == size(root) {
        return root.clone();
    }
    if lo == hi {
        return empty_node();
    }
    match &**root {
        Node::Leaf(leaf) => Arc::new(Node::Leaf(leaf.slice(lo, hi, true))),
        Node::Interior(interior) => {
            let (lo_idx, lo_local) = interior.locate(lo);
            let (hi_idx, hi_local) = interior.locate_end(hi);
            if lo_idx == hi_idx {
                substr(&interior.children[lo_idx], lo_local, hi_local, config)
            } else {
                let mut acc = substr(
                    &interior.children[lo_idx],
                    lo_local,
                    size(&interior.children[lo_idx]),
                    config,
                );
                for child in &interior.children[lo_idx + 1..hi_idx] {
                    acc = concat(&acc, child, config);
                }
                let right = substr(&interior.children[hi_idx], 0, hi_local, config);
                concat(&acc, &right, config)
            }
        }
    }
}

enum JoinResult {
    /// Replaces one node at the same height as its inputs.
    Same(Arc<Node>),
    /// The inputs didn't fit in a single node; the caller must splice both
    /// in at the same height the single slot they're replacing held,
    /// rather than nesting an extra level.
    Grown(Arc<Node>, Arc<Node>),
}

fn join_same_height(a: Arc<Node>, b: Arc<Node>, config: &RopeConfig) -> JoinResult {
    match (&*a, &*b) {
        (Node::Leaf(la), Node::Leaf(lb)) => {
            if la.len() + lb.len() <= config.max_leaf {
                let mut bytes = la.as_bytes().to_vec();
                bytes.extend_from_slice(lb.as_bytes());
                JoinResult::Same(Arc::new(Node::Leaf(Leaf::from_bytes(bytes))))
            } else {
                JoinResult::Grown(a, b)
            }
        }
        (Node::Interior(ia), Node::Interior(ib)) => {
            if ia.children.is_empty() {
                JoinResult::Same(b)
            } else if ib.children.is_empty() {
                JoinResult::Same(a)
            } else if ia.children.len() + ib.children.len() <= config.max_children {
                let mut children = ia.children.clone();
                children.extend(ib.children.iter().cloned());
                JoinResult::Same(wrap_as_interior(children))
            } else {
                JoinResult::Grown(a, b)
            }
        }
        _ => JoinResult::Grown(a, b),
    }
}

/// Walks down the taller side's edge (rightmost child if `short` is being
/// appended, leftmost if prepended) until reaching `short`'s height, joins
/// there, then rebuilds the path back up, splitting any node that overflows
/// `max_children` as a result.
fn join_at_edge(tall: &Arc<Node>, short: &Arc<Node>, config: &RopeConfig, short_is_right: bool) -> JoinResult {
    let interior = match &**tall {
        Node::Interior(i) => i,
        Node::Leaf(_) => unreachable!("join_at_edge only called when height(tall) > height(short)"),
    };
    let edge_idx = if short_is_right { interior.children.len() - 1 } else { 0 };
    let edge_child = &interior.children[edge_idx];

    let replacement = if height(edge_child) == height(short) {
        if short_is_right {
            join_same_height(edge_child.clone(), short.clone(), config)
        } else {
            join_same_height(short.clone(), edge_child.clone(), config)
        }
    } else {
        join_at_edge(edge_child, short, config, short_is_right)
    };

    let mut children = interior.children.clone();
    match replacement {
        JoinResult::Same(node) => children[edge_idx] = node,
        JoinResult::Grown(left, right) => {
            children.splice(edge_idx..=edge_idx, [left, right]);
        }
    }

    if children.len() <= config.max_children {
        JoinResult::Same(wrap_as_interior(children))
    } else {
        log::trace!("rope: concat rebalance split an overflowing interior node");
        let mid = children.len() / 2;
        let right = children.split_off(mid);
        JoinResult::Grown(wrap_as_interior(children), wrap_as_interior(right))
    }
}

/// `concat`: joins two ropes. Equal-height roots combine
/// directly into a new root holding both as children (or merge into one
/// node, if small enough); unequal heights descend the taller rope's edge,
/// splice, and rebalance back up, growing the tree by at most one level.
pub fn concat(a: &Arc<Node>, b: &Arc<Node>, config: &RopeConfig) -> Arc<Node> {
    if size(a) == 0 {
        return b.clone();
    }
    if size(b) == 0 {
        return a.clone();
    }
    let ha = height(a);
    let hb = height(b);
    let result = match ha.cmp(&hb) {
        std::cmp::Ordering::Equal => join_same_height(a.clone(), b.clone(), config),
        std::cmp::Ordering::Greater => join_at_edge(a, b, config, true),
        std::cmp::Ordering::Less => join_at_edge(b, a, config, false),
    };
    match result {
        JoinResult::Same(n) => n,
        JoinResult::Grown(l, r) => wrap_as_interior(vec![l, r]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(s: &str) -> Arc<Node> {
        Arc::new(Node::Leaf(Leaf::from_bytes(s.as_bytes().to_vec())))
    }

    fn text(node: &Node) -> String {
        let mut out = Vec::new();
        for_each_segment(node, &mut |b| out.extend_from_slice(b));
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn concat_two_leaves_merges_when_small() {
        let config = RopeConfig::new(4, 512);
        let r = concat(&leaf("hello "), &leaf("world"), &config);
        assert_eq!(text(&r), "hello world");
        assert_eq!(size(&r), 11);
    }

    #[test]
    fn concat_builds_a_balanced_tree_over_many_pieces() {
        let config = RopeConfig::new(2, 4);
        let mut rope = empty_node();
        let words = ["one ", "two ", "three ", "four ", "five ", "six "];
        for w in words {
            rope = concat(&rope, &leaf(w), &config);
        }
        assert_eq!(text(&rope), words.concat());
        assert_eq!(size(&rope), words.concat().len());
    }

    #[test]
    fn substr_then_concat_scenario() {
        // concatenate four pieces, then take a substring spanning a leaf boundary.
        let config = RopeConfig::default();
        let a = "When writing a specialization, ";
        let b = "be careful about its location; ";
        let c = "or to make it compile will be such a trial as to kindle its self-immolation";
        let d = "here is the rest of the text that keeps the rope spanning several leaves.";
        let mut r = empty_node();
        for piece in [a, b, c, d] {
            r = concat(&r, &leaf(piece), &config);
        }
        let total = size(&r);
        let out = substr(&r, total - 4, total - 1, &config);
        let expected = &format!("{a}{b}{c}{d}")[total - 4..total - 1];
        assert_eq!(text(&out), expected);
    }

    #[test]
    fn substr_spanning_many_leaves_round_trips() {
        let config = RopeConfig::new(2, 4);
        let mut rope = empty_node();
        let full = "abcdefghijklmnopqrstuvwxyz";
        for chunk in full.as_bytes().chunks(3) {
            rope = concat(&rope, &Arc::new(Node::Leaf(Leaf::from_bytes(chunk.to_vec()))), &config);
        }
        assert_eq!(text(&rope), full);
        for (lo, hi) in [(0, 26), (5, 20), (1, 2), (0, 0), (26, 26)] {
            let piece = substr(&rope, lo, hi, &config);
            assert_eq!(text(&piece), &full[lo..hi]);
        }
    }

    #[test]
    fn insert_merges_into_small_leaf() {
        let config = RopeConfig::default();
        let mut rope = leaf("helloworld");
        insert(&mut rope, 5, Leaf::from_bytes(b" ".to_vec()), &config);
        assert_eq!(text(&rope), "hello world");
    }

    #[test]
    fn insert_splits_a_full_leaf() {
        let config = RopeConfig::new(2, 4);
        let mut rope = leaf("abcd");
        insert(&mut rope, 2, Leaf::from_bytes(b"XY".to_vec()), &config);
        assert_eq!(text(&rope), "abXYcd");
    }

    #[test]
    fn insert_grows_tree_past_many_leaf_splits() {
        let config = RopeConfig::new(2, 3);
        let mut rope = empty_node();
        for ch in "abcdefgh".chars() {
            let at = size(&rope);
            insert(&mut rope, at, Leaf::from_bytes(ch.to_string().into_bytes()), &config);
        }
        assert_eq!(text(&rope), "abcdefgh");
    }

    #[test]
    fn insert_into_a_leaf_child_never_overflows_the_parent() {
        // A leaf child that must split into three non-empty pieces
        // (before/inserted/after) would grow its parent by two children if
        // kept as three separate leaves. The parent here only has room
        // reserved for one extra child, the same as a full interior split.
        let config = RopeConfig::new(2, 4);
        let mut rope = wrap_as_interior(vec![leaf("abcd"), leaf("efgh"), leaf("ijkl")]);
        insert(&mut rope, 2, Leaf::from_bytes(b"XYZWQ".to_vec()), &config);
        assert_eq!(text(&rope), "abXYZWQcdefghijkl");
        match &*rope {
            Node::Interior(i) => assert!(i.children.len() <= config.max_children),
            Node::Leaf(_) => panic!("expected an interior root"),
        }
    }

    #[test]
    fn trace_logging_can_be_enabled_for_manual_debugging() {
        // Exercises the `log::trace!` sites at `split_child`, leaf-split
        // during insert, and `join_at_edge`'s rebalance branch with a real
        // subscriber attached, so `RUST_LOG=trace cargo test -- --nocapture`
        // actually shows something here rather than silently dropping it.
        let _ = env_logger::builder().is_test(true).try_init();
        let config = RopeConfig::new(2, 3);
        let mut rope = empty_node();
        for ch in "abcdefgh".chars() {
            let at = size(&rope);
            insert(&mut rope, at, Leaf::from_bytes(ch.to_string().into_bytes()), &config);
        }
        assert_eq!(text(&rope), "abcdefgh");
    }

    #[test]
    fn empty_rope_has_zero_size() {
        let n = empty_node();
        assert_eq!(size(&n), 0);
        assert_eq!(text(&n), "");
    }
}
