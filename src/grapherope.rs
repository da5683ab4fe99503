//! The text-aware facade over [`crate::rope::Rope`]: always valid UTF-8,
//! always FCC-normalized, always cut between grapheme clusters.
//!
//! `Rope` itself is oblivious to Unicode; `GraphemeRope::replace` is where
//! the normalization engine, the grapheme segmenter, and the rope meet.

use std::ops::Range;

use crate::boundary::{encode_utf8_vec, Utf8CodePoints};
use crate::config::RopeConfig;
use crate::normalize::{self, Form};
use crate::rope::Rope;
use crate::segmentation::{next_boundary, prev_boundary};
use crate::ucd::combining_class;

/// Walks `pos` left past the combining-mark run immediately before it, then
/// one starter further, so the returned boundary always has a full base
/// character (not just a bare mark) on its near side. A later combining
/// mark inserted at the original `pos` could still compose into that
/// starter, so the starter has to be in the re-normalization window too.
fn expand_left(cps: &[u32], mut pos: usize) -> usize {
    while pos > 0 && combining_class(cps[pos - 1]) != 0 {
        pos -= 1;
    }
    if pos > 0 {
        pos -= 1;
    }
    pos
}

/// Walks `pos` right through the combining-mark run starting at it, so a
/// replace never cuts a reordering run in half. Stops at the next starter:
/// nothing before a starter can reach forward across it under canonical
/// composition.
fn expand_right(cps: &[u32], mut pos: usize) -> usize {
    while pos < cps.len() && combining_class(cps[pos]) != 0 {
        pos += 1;
    }
    pos
}

fn utf8_len(cp: u32) -> usize {
    match cp {
        0x00..=0x7F => 1,
        0x80..=0x7FF => 2,
        0x800..=0xFFFF => 3,
        _ => 4,
    }
}

/// Cumulative byte offsets of each code point in `cps`, plus the total
/// length as a trailing entry (`offsets.len() == cps.len() + 1`).
fn cp_byte_offsets(cps: &[u32]) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(cps.len() + 1);
    let mut acc = 0;
    for &cp in cps {
        offsets.push(acc);
        acc += utf8_len(cp);
    }
    offsets.push(acc);
    offsets
}

/// A rope whose content is always well-formed UTF-8 in Fast C or Canonical
/// Composition (FCC), with leaf boundaries that never split a code point.
#[derive(Debug, Clone)]
pub struct GraphemeRope {
    rope: Rope,
}

impl GraphemeRope {
    pub fn new(s: &str) -> Self {
        Self::with_config(s, RopeConfig::default())
    }

    pub fn with_config(s: &str, config: RopeConfig) -> Self {
        let cps: Vec<u32> = s.chars().map(|c| c as u32).collect();
        let normalized = normalize::normalize(&cps, Form::Fcc);
        let bytes = encode_utf8_vec(normalized);
        GraphemeRope {
            rope: Rope::from_bytes_with_config(bytes, config),
        }
    }

    pub fn len_bytes(&self) -> usize {
        self.rope.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.is_empty()
    }

    fn code_points(&self) -> Vec<u32> {
        let bytes = self.rope.to_bytes();
        Utf8CodePoints::new(&bytes).collect()
    }

    pub fn chars(&self) -> Chars {
        let code_points = self.code_points();
        let back = code_points.len();
        Chars {
            code_points,
            front: 0,
            back,
        }
    }

    pub fn graphemes(&self) -> Graphemes {
        let code_points = self.code_points();
        let back = code_points.len();
        Graphemes {
            code_points,
            front: 0,
            back,
        }
    }

    /// `replace`: a grapheme- and normalization-aware edit.
    ///
    /// `from`/`to` are byte offsets into the current content and must fall
    /// on code point boundaries. `insertion_is_normalized` is an
    /// attestation from the caller, not a request: when true,
    /// the stable interior of `insertion` is copied verbatim instead of
    /// being re-normalized; a caller that attests falsely gets wrong output,
    /// not a panic -- this crate does not silently double-check attestations
    /// it has no cheap way to verify.
    ///
    /// Returns the post-mutation byte range the edit actually touched,
    /// after boundary expansion may have widened it past `[from, to)`.
    pub fn replace(&mut self, from: usize, to: usize, insertion: &str, insertion_is_normalized: bool) -> Range<usize> {
        let len = self.rope.len();
        assert!(from <= to && to <= len, "replace: byte range out of bounds");

        let cps = self.code_points();
        let offsets = cp_byte_offsets(&cps);
        let from_cp = offsets
            .binary_search(&from)
            .expect("replace: `from` must fall on a code point boundary");
        let to_cp = offsets
            .binary_search(&to)
            .expect("replace: `to` must fall on a code point boundary");

        let lo_cp = expand_left(&cps, from_cp);
        let hi_cp = expand_right(&cps, to_cp);

        let insertion_cps: Vec<u32> = insertion.chars().map(|c| c as u32).collect();

        let new_cps = if insertion_is_normalized && !insertion_cps.is_empty() {
            let mid_start = expand_right(&insertion_cps, 0);
            let mid_end = expand_left(&insertion_cps, insertion_cps.len()).max(mid_start);

            let mut head = cps[lo_cp..from_cp].to_vec();
            head.extend_from_slice(&insertion_cps[..mid_start]);
            let mut out = normalize::normalize(&head, Form::Fcc);

            out.extend_from_slice(&insertion_cps[mid_start..mid_end]);

            let mut tail = insertion_cps[mid_end..].to_vec();
            tail.extend_from_slice(&cps[to_cp..hi_cp]);
            out.extend(normalize::normalize(&tail, Form::Fcc));
            out
        } else {
            let mut buf = cps[lo_cp..from_cp].to_vec();
            buf.extend_from_slice(&insertion_cps);
            buf.extend_from_slice(&cps[to_cp..hi_cp]);
            normalize::normalize(&buf, Form::Fcc)
        };

        let new_bytes = encode_utf8_vec(new_cps);
        let lo_byte = offsets[lo_cp];
        let hi_byte = offsets[hi_cp];
        self.rope
            .replace(lo_byte, hi_byte, &new_bytes)
            .expect("replace: expanded range stays within rope bounds");
        lo_byte..lo_byte + new_bytes.len()
    }

    /// Hands back the underlying byte rope, giving up the UTF-8/FCC
    /// invariants this type otherwise maintains.
    pub fn extract(self) -> Rope {
        self.rope
    }

    /// Rebuilds a `GraphemeRope` from a `Rope` the caller attests is valid
    /// UTF-8, FCC-normalized, and cut only between grapheme clusters: a
    /// release build trusts the attestation and stays well-defined but
    /// possibly non-normalized; a debug build checks it and panics instead
    /// of silently corrupting later reads.
    pub fn install(rope: Rope) -> GraphemeRope {
        #[cfg(debug_assertions)]
        {
            let bytes = rope.to_bytes();
            let text = std::str::from_utf8(&bytes).expect("install: rope is not valid UTF-8");
            let cps: Vec<u32> = text.chars().map(|c| c as u32).collect();
            debug_assert_eq!(
                normalize::normalize(&cps, Form::Fcc),
                cps,
                "install: rope is not FCC-normalized"
            );
        }
        GraphemeRope { rope }
    }
}

/// Owning bidirectional iterator over `char`s (invalid/unpaired surrogate
/// code points, which cannot occur in valid UTF-8 content, would decode as
/// U+FFFD; `GraphemeRope` never contains them).
pub struct Chars {
    code_points: Vec<u32>,
    front: usize,
    back: usize,
}

impl Iterator for Chars {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        if self.front >= self.back {
            return None;
        }
        let cp = self.code_points[self.front];
        self.front += 1;
        Some(char::from_u32(cp).unwrap_or('\u{FFFD}'))
    }
}

impl DoubleEndedIterator for Chars {
    fn next_back(&mut self) -> Option<char> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        let cp = self.code_points[self.back];
        Some(char::from_u32(cp).unwrap_or('\u{FFFD}'))
    }
}

/// Owning bidirectional iterator over grapheme clusters, each yielded as an
/// owned `String` (UAX #29, via [`crate::segmentation`]).
pub struct Graphemes {
    code_points: Vec<u32>,
    front: usize,
    back: usize,
}

impl Iterator for Graphemes {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.front >= self.back {
            return None;
        }
        let end = next_boundary(&self.code_points[..self.back], self.front).min(self.back);
        let cluster = &self.code_points[self.front..end];
        self.front = end;
        Some(String::from_utf8(encode_utf8_vec(cluster.iter().copied())).expect("FCC content is valid UTF-8"))
    }
}

impl DoubleEndedIterator for Graphemes {
    fn next_back(&mut self) -> Option<String> {
        if self.front >= self.back {
            return None;
        }
        let start = prev_boundary(&self.code_points[..self.back], self.back);
        let cluster = &self.code_points[start..self.back];
        self.back = start;
        Some(String::from_utf8(encode_utf8_vec(cluster.iter().copied())).expect("FCC content is valid UTF-8"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_normalizes_to_fcc() {
        let t = GraphemeRope::new("cafe\u{0301}"); // e + combining acute
        assert_eq!(t.chars().collect::<String>(), "café");
    }

    #[test]
    fn insert_combining_mark_after_first_grapheme_composes() {
        // insert a combining mark right after the first grapheme; it composes.
        let mut t = GraphemeRope::new("et");
        let graphemes_before: Vec<String> = t.graphemes().collect();
        assert_eq!(graphemes_before, vec!["e", "t"]);
        let first_end = "e".len();
        t.replace(first_end, first_end, "\u{0308}", false);
        assert_eq!(t.chars().collect::<String>(), "ët");
        assert_eq!(t.graphemes().count(), 2);
    }

    #[test]
    fn repeated_append_of_combining_mark_does_not_double_compose() {
        // repeated append of a combining mark must not double-compose.
        let mut t = GraphemeRope::new("e");
        let end = t.len_bytes();
        t.replace(end, end, "\u{0308}", false);
        assert_eq!(t.chars().collect::<String>(), "ë");
        assert_eq!(t.graphemes().count(), 1);

        let end = t.len_bytes();
        t.replace(end, end, "\u{0308}", false);
        assert_eq!(t.graphemes().count(), 1);
        let cps: Vec<u32> = t.chars().map(|c| c as u32).collect();
        assert_eq!(cps, vec![0x00EB, 0x0308]);
    }

    #[test]
    fn graphemes_split_crlf_and_regional_indicator_pairs() {
        // CRLF and regional-indicator pairs each stay one cluster.
        let t = GraphemeRope::new("A\r\nB\u{1F1FA}\u{1F1F8}\u{1F1EC}\u{1F1E7}C");
        let clusters: Vec<String> = t.graphemes().collect();
        assert_eq!(
            clusters,
            vec!["A", "\r\n", "B", "\u{1F1FA}\u{1F1F8}", "\u{1F1EC}\u{1F1E7}", "C"]
        );
    }

    #[test]
    fn forward_and_backward_graphemes_agree() {
        let t = GraphemeRope::new("caf\u{00E9} \u{1F468}\u{200D}\u{1F469}");
        let forward: Vec<String> = t.graphemes().collect();
        let mut backward: Vec<String> = t.graphemes().rev().collect();
        backward.reverse();
        assert_eq!(forward, backward);
    }

    #[test]
    fn extract_and_install_round_trip() {
        let t = GraphemeRope::new("hello");
        let rope = t.extract();
        let t2 = GraphemeRope::install(rope);
        assert_eq!(t2.chars().collect::<String>(), "hello");
    }

    #[test]
    fn replace_honors_normalized_attestation() {
        let mut t = GraphemeRope::new("hello world");
        // Already-NFC text inserted with the fast path: no recomposition
        // needed since nothing in it is unstable at either edge.
        t.replace(6, 11, "there", true);
        assert_eq!(t.chars().collect::<String>(), "hello there");
    }
}
