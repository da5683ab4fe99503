//! Fixed, read-only Unicode Character Database lookups.
//!
//! Real UCD data runs to hundreds of thousands of entries; a from-scratch
//! crate cannot embed the whole thing without code generation from the
//! Unicode data files, which is out of reach here. Instead this module
//! stores only the *exceptional* entries (non-zero ccc, actual
//! decompositions, non-"yes" quick-check flags) in small maps and defaults
//! everything else, embedding a curated, factually accurate subset of real
//! Unicode data as Rust literals rather than loading it from data files at
//! runtime. The set covers the Latin-1 Supplement accented letters, the
//! combining diacritics that compose with them, Hangul conjoining jamo
//! (handled algorithmically, see [`hangul`]), and the grapheme-break-
//! relevant code point ranges exercised by this crate's tests.
//!
//! Extending the table is purely additive: add an entry to
//! `CANONICAL_DECOMPOSITIONS` or `COMBINING_CLASSES` and every consumer
//! (normalizer, segmenter) picks it up automatically.

pub mod hangul;

use lazy_static::lazy_static;
use std::collections::HashMap;

/// Combining class exceptions: (code point, ccc). Everything absent has
/// ccc = 0 (a starter).
const COMBINING_CLASS_DATA: &[(u32, u8)] = &[
    (0x0300, 230), // grave
    (0x0301, 230), // acute
    (0x0302, 230), // circumflex
    (0x0303, 230), // tilde
    (0x0304, 230), // macron
    (0x0306, 230), // breve
    (0x0307, 230), // dot above
    (0x0308, 230), // diaeresis
    (0x030A, 230), // ring above
    (0x030B, 230), // double acute
    (0x030C, 230), // caron
    (0x0323, 220), // dot below
    (0x0324, 220), // diaeresis below
    (0x0325, 220), // ring below
    (0x0330, 220), // tilde below
    (0x0331, 220), // macron below
    (0x0327, 202), // cedilla
    (0x0328, 202), // ogonek
    (0x0344, 230), // combining Greek dialytika tonos (a composition exclusion)
];

/// Canonical decomposition exceptions: code point -> its immediate
/// decomposition. Entries here cover the Latin-1 Supplement accented
/// letters this crate's tests exercise, plus their combining-mark halves
/// (which decompose to themselves, i.e. have no entry).
const CANONICAL_DECOMPOSITION_DATA: &[(u32, [u32; 2])] = &[
    (0x00C0, [0x0041, 0x0300]),
    (0x00C1, [0x0041, 0x0301]),
    (0x00C2, [0x0041, 0x0302]),
    (0x00C3, [0x0041, 0x0303]),
    (0x00C4, [0x0041, 0x0308]),
    (0x00C5, [0x0041, 0x030A]),
    (0x00C7, [0x0043, 0x0327]),
    (0x00C8, [0x0045, 0x0300]),
    (0x00C9, [0x0045, 0x0301]),
    (0x00CA, [0x0045, 0x0302]),
    (0x00CB, [0x0045, 0x0308]),
    (0x00CC, [0x0049, 0x0300]),
    (0x00CD, [0x0049, 0x0301]),
    (0x00CE, [0x0049, 0x0302]),
    (0x00CF, [0x0049, 0x0308]),
    (0x00D1, [0x004E, 0x0303]),
    (0x00D2, [0x004F, 0x0300]),
    (0x00D3, [0x004F, 0x0301]),
    (0x00D4, [0x004F, 0x0302]),
    (0x00D5, [0x004F, 0x0303]),
    (0x00D6, [0x004F, 0x0308]),
    (0x00D9, [0x0055, 0x0300]),
    (0x00DA, [0x0055, 0x0301]),
    (0x00DB, [0x0055, 0x0302]),
    (0x00DC, [0x0055, 0x0308]),
    (0x00DD, [0x0059, 0x0301]),
    (0x00E0, [0x0061, 0x0300]),
    (0x00E1, [0x0061, 0x0301]),
    (0x00E2, [0x0061, 0x0302]),
    (0x00E3, [0x0061, 0x0303]),
    (0x00E4, [0x0061, 0x0308]),
    (0x00E5, [0x0061, 0x030A]),
    (0x00E7, [0x0063, 0x0327]),
    (0x00E8, [0x0065, 0x0300]),
    (0x00E9, [0x0065, 0x0301]),
    (0x00EA, [0x0065, 0x0302]),
    (0x00EB, [0x0065, 0x0308]),
    (0x00EC, [0x0069, 0x0300]),
    (0x00ED, [0x0069, 0x0301]),
    (0x00EE, [0x0069, 0x0302]),
    (0x00EF, [0x0069, 0x0308]),
    (0x00F1, [0x006E, 0x0303]),
    (0x00F2, [0x006F, 0x0300]),
    (0x00F3, [0x006F, 0x0301]),
    (0x00F4, [0x006F, 0x0302]),
    (0x00F5, [0x006F, 0x0303]),
    (0x00F6, [0x006F, 0x0308]),
    (0x00F9, [0x0075, 0x0300]),
    (0x00FA, [0x0075, 0x0301]),
    (0x00FB, [0x0075, 0x0302]),
    (0x00FC, [0x0075, 0x0308]),
    (0x00FD, [0x0079, 0x0301]),
    (0x00FF, [0x0079, 0x0308]),
];

/// Compatibility-only decompositions (i.e. `dt != can`): entries that NFD
/// leaves alone but NFKD expands.
const COMPATIBILITY_DECOMPOSITION_DATA: &[(u32, &[u32])] = &[
    (0xFB00, &[0x0066, 0x0066]),         // LATIN SMALL LIGATURE FF
    (0xFB01, &[0x0066, 0x0069]),         // LATIN SMALL LIGATURE FI
    (0xFB02, &[0x0066, 0x006C]),         // LATIN SMALL LIGATURE FL
    (0x00B2, &[0x0032]),                 // SUPERSCRIPT TWO
    (0x00B3, &[0x0033]),                 // SUPERSCRIPT THREE
    (0x2160, &[0x0049]),                 // ROMAN NUMERAL ONE
];

/// Composition exclusions: code points with a canonical decomposition that
/// must *not* be re-derived by `compose`. `U+0344` is the classic example:
/// it decomposes, but input containing the decomposed sequence should not
/// be recomposed to it.
const COMPOSITION_EXCLUSIONS: &[u32] = &[0x0344];

lazy_static! {
    static ref COMBINING_CLASSES: HashMap<u32, u8> =
        COMBINING_CLASS_DATA.iter().copied().collect();
    static ref CANONICAL_DECOMPOSITIONS: HashMap<u32, [u32; 2]> =
        CANONICAL_DECOMPOSITION_DATA.iter().copied().collect();
    static ref COMPATIBILITY_DECOMPOSITIONS: HashMap<u32, &'static [u32]> =
        COMPATIBILITY_DECOMPOSITION_DATA.iter().copied().collect();
    /// Inverse of `CANONICAL_DECOMPOSITIONS`, minus composition exclusions:
    /// this is exactly D114's definition of the primary composites.
    static ref PRIMARY_COMPOSITES: HashMap<(u32, u32), u32> =
        CANONICAL_DECOMPOSITION_DATA
            .iter()
            .filter(|(cp, _)| !COMPOSITION_EXCLUSIONS.contains(cp))
            .map(|&(cp, [a, b])| ((a, b), cp))
            .collect();
}

pub fn combining_class(cp: u32) -> u8 {
    COMBINING_CLASSES.get(&cp).copied().unwrap_or(0)
}

pub fn is_starter(cp: u32) -> bool {
    combining_class(cp) == 0
}

/// Canonical decomposition, recursing until no further decomposition
/// applies. Hangul syllables are handled algorithmically.
pub fn canonical_decompose(cp: u32) -> Vec<u32> {
    if let Some(jamo) = hangul::decompose(cp) {
        return if jamo[2] == 0 {
            vec![jamo[0], jamo[1]]
        } else {
            vec![jamo[0], jamo[1], jamo[2]]
        };
    }
    match CANONICAL_DECOMPOSITIONS.get(&cp) {
        None => vec![cp],
        Some([a, b]) => {
            let mut out = canonical_decompose(*a);
            out.extend(canonical_decompose(*b));
            out
        }
    }
}

/// Compatibility decomposition: falls back to canonical decomposition when
/// there is no compatibility-only mapping, since every canonical
/// decomposition is also a valid compatibility decomposition.
pub fn compatibility_decompose(cp: u32) -> Vec<u32> {
    if hangul::decompose(cp).is_some() || CANONICAL_DECOMPOSITIONS.contains_key(&cp) {
        return canonical_decompose(cp);
    }
    match COMPATIBILITY_DECOMPOSITIONS.get(&cp) {
        None => vec![cp],
        Some(seq) => seq.iter().flat_map(|&c| compatibility_decompose(c)).collect(),
    }
}

/// `compose(starter, combining) -> composed starter`, the canonical
/// (starter, combining) -> composed-starter mapping.
pub fn compose(starter: u32, next: u32) -> Option<u32> {
    hangul::compose(starter, next).or_else(|| PRIMARY_COMPOSITES.get(&(starter, next)).copied())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickCheck {
    Yes,
    No,
    Maybe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizationForm {
    Nfd,
    Nfkd,
    Nfc,
    Nfkc,
    Fcc,
}

/// Per-code-point, per-form quick-check flag. FCC
/// shares the NFC table: UAX #15 does not define a distinct FCC_QC
/// property, and FCC differs from NFC only in the discontiguous-composition
/// restriction, which quick-check (a composition-blind scan) cannot see
/// anyway -- see DESIGN.md.
pub fn quick_check(cp: u32, form: NormalizationForm) -> QuickCheck {
    use NormalizationForm::*;
    match form {
        Nfd => {
            if hangul::decompose(cp).is_some() || CANONICAL_DECOMPOSITIONS.contains_key(&cp) {
                QuickCheck::No
            } else {
                QuickCheck::Yes
            }
        }
        Nfkd => {
            if hangul::decompose(cp).is_some()
                || CANONICAL_DECOMPOSITIONS.contains_key(&cp)
                || COMPATIBILITY_DECOMPOSITIONS.contains_key(&cp)
            {
                QuickCheck::No
            } else {
                QuickCheck::Yes
            }
        }
        Nfc | Fcc => {
            if COMPOSITION_EXCLUSIONS.contains(&cp) {
                QuickCheck::No
            } else if combining_class(cp) != 0 {
                QuickCheck::Maybe
            } else {
                QuickCheck::Yes
            }
        }
        Nfkc => {
            if COMPOSITION_EXCLUSIONS.contains(&cp) || COMPATIBILITY_DECOMPOSITIONS.contains_key(&cp)
            {
                QuickCheck::No
            } else if combining_class(cp) != 0 {
                QuickCheck::Maybe
            } else {
                QuickCheck::Yes
            }
        }
    }
}

/// A code point is *stable in F*: a starter with ccc = 0 and
/// quick-check(F) = yes.
pub fn is_stable(cp: u32, form: NormalizationForm) -> bool {
    is_starter(cp) && quick_check(cp, form) == QuickCheck::Yes
}

// ---------------------------------------------------------------------
// Grapheme-break property (UAX #29).
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphemeBreak {
    Other,
    Cr,
    Lf,
    Control,
    Extend,
    RegionalIndicator,
    Prepend,
    SpacingMark,
    L,
    V,
    T,
    Lv,
    Lvt,
    ExtPict,
    Zwj,
}

fn in_ranges(cp: u32, ranges: &[(u32, u32)]) -> bool {
    ranges.iter().any(|&(lo, hi)| cp >= lo && cp <= hi)
}

const EXTEND_RANGES: &[(u32, u32)] = &[
    (0x0300, 0x036F), // combining diacritical marks (covers our ccc table)
    (0x200C, 0x200C), // ZWNJ
    (0xFE00, 0xFE0F), // variation selectors
    (0x1F3FB, 0x1F3FF), // emoji skin tone modifiers
];

const PREPEND_RANGES: &[(u32, u32)] = &[(0x0600, 0x0605), (0x06DD, 0x06DD), (0x070F, 0x070F)];

const SPACING_MARK_RANGES: &[(u32, u32)] = &[(0x0903, 0x0903), (0x0A03, 0x0A03)];

const EXT_PICT_RANGES: &[(u32, u32)] = &[
    (0x00A9, 0x00A9),
    (0x00AE, 0x00AE),
    (0x203C, 0x203C),
    (0x2049, 0x2049),
    (0x2122, 0x2122),
    (0x2600, 0x27BF),
    (0x2B00, 0x2BFF),
    (0x1F300, 0x1F5FF),
    (0x1F600, 0x1F64F),
    (0x1F680, 0x1F6FF),
    (0x1F900, 0x1F9FF),
    (0x1FA70, 0x1FAFF),
];

pub fn grapheme_break_property(cp: u32) -> GraphemeBreak {
    use GraphemeBreak::*;
    if cp == 0x0D {
        return Cr;
    }
    if cp == 0x0A {
        return Lf;
    }
    if cp == 0x200D {
        return Zwj;
    }
    if hangul::is_l(cp) {
        return L;
    }
    if hangul::is_v(cp) {
        return V;
    }
    if hangul::is_t(cp) {
        return T;
    }
    if hangul::is_syllable(cp) {
        return if hangul::is_lv_syllable(cp) { Lv } else { Lvt };
    }
    if (0x1F1E6..=0x1F1FF).contains(&cp) {
        return RegionalIndicator;
    }
    if in_ranges(cp, PREPEND_RANGES) {
        return Prepend;
    }
    if in_ranges(cp, SPACING_MARK_RANGES) {
        return SpacingMark;
    }
    if in_ranges(cp, EXT_PICT_RANGES) {
        return ExtPict;
    }
    // Every combining mark we track, plus the ZWNJ/variation-selector/
    // skin-tone ranges above, is Extend.
    if combining_class(cp) != 0 || in_ranges(cp, EXTEND_RANGES) {
        return Extend;
    }
    if cp <= 0x1F
        || (0x7F..=0x9F).contains(&cp)
        || cp == 0x2028
        || cp == 0x2029
        || cp == 0x200B // ZWSP is a Control for break purposes
    {
        return Control;
    }
    Other
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin1_decompose_recompose_round_trips() {
        for &(composed, [a, b]) in CANONICAL_DECOMPOSITION_DATA {
            assert_eq!(canonical_decompose(composed), vec![a, b]);
            assert_eq!(compose(a, b), Some(composed));
        }
    }

    #[test]
    fn ascii_has_default_properties() {
        assert_eq!(combining_class(b'h' as u32), 0);
        assert!(is_starter(b'h' as u32));
        assert_eq!(quick_check(b'h' as u32, NormalizationForm::Nfc), QuickCheck::Yes);
    }

    #[test]
    fn combining_mark_is_maybe_for_nfc() {
        assert_eq!(quick_check(0x0308, NormalizationForm::Nfc), QuickCheck::Maybe);
    }

    #[test]
    fn grapheme_break_regional_indicator() {
        assert_eq!(grapheme_break_property(0x1F1FA), GraphemeBreak::RegionalIndicator);
        assert_eq!(grapheme_break_property(0x1F1F8), GraphemeBreak::RegionalIndicator);
    }
}
