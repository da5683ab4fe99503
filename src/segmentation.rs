//! Default, non-locale-specific grapheme cluster boundaries (UAX #29).
//!
//! This module is a stateless `is_boundary(cps, i)` predicate -- including
//! GB11 (`\p{Extended_Pictographic} Extend* ZWJ` joining the next
//! `\p{Extended_Pictographic}`), so multi-part ZWJ emoji sequences stay
//! joined after every connecting ZWJ -- with the run lengths GB11 and
//! GB12/13 need recovered by a short backward scan rather than carried
//! loop state, so the same rule table drives both forward and backward
//! iteration, which the grapheme-rope facade's cursor needs.

use crate::ucd::{grapheme_break_property, GraphemeBreak};

fn count_preceding_ri(cps: &[u32], upto_exclusive: usize) -> usize {
    let mut n = 0;
    let mut j = upto_exclusive;
    while j > 0 && grapheme_break_property(cps[j - 1]) == GraphemeBreak::RegionalIndicator {
        n += 1;
        j -= 1;
    }
    n
}

/// Scans backward over an `Extend` run starting just before `before`,
/// returning whether the character preceding the run is ExtPict (GB11's
/// `\p{Extended_Pictographic} Extend*` prefix).
fn preceding_base_is_ext_pict(cps: &[u32], before: usize) -> bool {
    let mut j = before;
    while j > 0 && grapheme_break_property(cps[j - 1]) == GraphemeBreak::Extend {
        j -= 1;
    }
    j > 0 && grapheme_break_property(cps[j - 1]) == GraphemeBreak::ExtPict
}

/// True if there is a grapheme cluster boundary immediately before
/// `cps[i]` (GB1/GB2 put boundaries at the very start and end for free).
pub fn is_boundary(cps: &[u32], i: usize) -> bool {
    use GraphemeBreak::*;
    if i == 0 || i >= cps.len() {
        return true;
    }
    let prev = grapheme_break_property(cps[i - 1]);
    let cur = grapheme_break_property(cps[i]);
    match (prev, cur) {
        (Cr, Lf) => false,                                      // GB3
        (Cr, _) | (Lf, _) | (Control, _) => true,               // GB4
        (_, Cr) | (_, Lf) | (_, Control) => true,               // GB5
        (L, L) | (L, V) | (L, Lv) | (L, Lvt) => false,          // GB6
        (Lv, V) | (Lv, T) | (V, V) | (V, T) => false,           // GB7
        (Lvt, T) | (T, T) => false,                             // GB8
        (_, Extend) | (_, Zwj) => false,                        // GB9
        (_, SpacingMark) => false,                              // GB9a
        (Prepend, _) => false,                                  // GB9b
        (Zwj, ExtPict) => !preceding_base_is_ext_pict(cps, i - 1), // GB11
        (RegionalIndicator, RegionalIndicator) => count_preceding_ri(cps, i - 1) % 2 == 1, // GB12/13
        _ => true,                                              // GB999
    }
}

/// The end of the cluster starting at `start` (`cps.len()` at the end of
/// input).
pub fn next_boundary(cps: &[u32], start: usize) -> usize {
    if start >= cps.len() {
        return start;
    }
    let mut pos = start + 1;
    while pos < cps.len() && !is_boundary(cps, pos) {
        pos += 1;
    }
    pos
}

/// The start of the cluster ending at `end`.
pub fn prev_boundary(cps: &[u32], end: usize) -> usize {
    if end == 0 {
        return 0;
    }
    let mut pos = end - 1;
    while pos > 0 && !is_boundary(cps, pos) {
        pos -= 1;
    }
    pos
}

/// Forward iterator over grapheme clusters, yielding one code-point slice
/// per cluster.
pub struct GraphemeIter<'a> {
    code_points: &'a [u32],
    front: usize,
    back: usize,
}

impl<'a> GraphemeIter<'a> {
    pub fn new(code_points: &'a [u32]) -> Self {
        GraphemeIter {
            code_points,
            front: 0,
            back: code_points.len(),
        }
    }
}

impl<'a> Iterator for GraphemeIter<'a> {
    type Item = &'a [u32];

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let end = next_boundary(&self.code_points[..self.back], self.front).min(self.back);
        let start = self.front;
        self.front = end;
        Some(&self.code_points[start..end])
    }
}

impl<'a> DoubleEndedIterator for GraphemeIter<'a> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let start = prev_boundary(&self.code_points[..self.back], self.back);
        let end = self.back;
        self.back = start;
        Some(&self.code_points[start..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_plain_ascii_per_char() {
        let cps: Vec<u32> = "ab".chars().map(|c| c as u32).collect();
        let clusters: Vec<&[u32]> = GraphemeIter::new(&cps).collect();
        assert_eq!(clusters, vec![&[0x61][..], &[0x62][..]]);
    }

    #[test]
    fn keeps_crlf_together() {
        let cps = vec![0x41, 0x0D, 0x0A, 0x42];
        let clusters: Vec<&[u32]> = GraphemeIter::new(&cps).collect();
        assert_eq!(clusters, vec![&[0x41][..], &[0x0D, 0x0A][..], &[0x42][..]]);
    }

    #[test]
    fn keeps_base_and_combining_marks_together() {
        // "e" + combining acute + combining grave, one cluster.
        let cps = vec![0x65, 0x0301, 0x0300];
        let clusters: Vec<&[u32]> = GraphemeIter::new(&cps).collect();
        assert_eq!(clusters, vec![&cps[..]]);
    }

    #[test]
    fn pairs_regional_indicators_into_flags() {
        // Two flags back to back: four RI code points, two clusters of two.
        let cps = vec![0x1F1FA, 0x1F1F8, 0x1F1EC, 0x1F1E7]; // US GB
        let clusters: Vec<&[u32]> = GraphemeIter::new(&cps).collect();
        assert_eq!(clusters, vec![&cps[0..2], &cps[2..4]]);
    }

    #[test]
    fn hangul_syllable_sequence_is_one_cluster() {
        // L V T jamo compose to one syllable, so it forms a single grapheme cluster.
        let cps = vec![0x1100, 0x1161, 0x11A8];
        let clusters: Vec<&[u32]> = GraphemeIter::new(&cps).collect();
        assert_eq!(clusters, vec![&cps[..]]);
    }

    #[test]
    fn zwj_sequence_joins_extended_pictographics() {
        // man + ZWJ + woman + ZWJ + girl: a single family emoji cluster.
        let cps = vec![0x1F468, 0x200D, 0x1F469, 0x200D, 0x1F467];
        let clusters: Vec<&[u32]> = GraphemeIter::new(&cps).collect();
        assert_eq!(clusters, vec![&cps[..]]);
    }

    #[test]
    fn zwj_without_following_ext_pict_does_not_join() {
        let cps = vec![0x1F468, 0x200D, 0x41]; // man, ZWJ, plain 'A'
        let clusters: Vec<&[u32]> = GraphemeIter::new(&cps).collect();
        assert_eq!(clusters, vec![&cps[0..2], &cps[2..3]]);
    }

    #[test]
    fn forward_and_backward_iteration_agree() {
        let cps = vec![0x1F468, 0x200D, 0x1F469, 0x41, 0x1F1FA, 0x1F1F8, 0x65, 0x0301];
        let forward: Vec<&[u32]> = GraphemeIter::new(&cps).collect();
        let mut backward: Vec<&[u32]> = GraphemeIter::new(&cps).rev().collect();
        backward.reverse();
        assert_eq!(forward, backward);
    }
}
