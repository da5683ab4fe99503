//! Streaming Unicode normalization: NFD, NFKD, NFC, NFKC, and FCC.
//!
//! The decomposition/canonical-ordering/composition pipeline follows
//! UAX #15 directly, parameterized three ways: a `compat` flag selects
//! canonical vs. compatibility decomposition, a `discontiguous` flag
//! selects NFC's vs. FCC's composition reach, and the whole pipeline is
//! exposed behind a single `NormalizationForm` enum instead of being
//! duplicated per form.

pub use crate::stream_safe::{as_stream_safe, NONSTARTER_CAP};
pub use crate::ucd::{NormalizationForm as Form, QuickCheck};
use crate::ucd::{combining_class, compatibility_decompose, canonical_decompose, compose, is_stable};

fn decompose_all(cps: &[u32], compat: bool) -> Vec<u32> {
    let mut out = Vec::with_capacity(cps.len());
    for &cp in cps {
        if compat {
            out.extend(compatibility_decompose(cp));
        } else {
            out.extend(canonical_decompose(cp));
        }
    }
    out
}

/// Canonically orders every maximal run of non-starters by ccc, with a
/// stable sort -- canonical equivalence depends on it.
fn canonical_order(buf: &mut [u32]) {
    let mut pos = 0;
    while pos < buf.len() {
        let run_len = buf[pos..]
            .iter()
            .skip(1)
            .position(|&cp| combining_class(cp) == 0)
            .map(|offset| offset + 1)
            .unwrap_or(buf.len() - pos);
        buf[pos..pos + run_len].sort_by_key(|&cp| combining_class(cp));
        pos += run_len;
    }
}

fn to_d(cps: &[u32], compat: bool) -> Vec<u32> {
    let mut buf = decompose_all(cps, compat);
    canonical_order(&mut buf);
    buf
}

/// Composition: a single forward pass keeping the index of
/// the current starter and the combining class of the most recently
/// examined, not-yet-composed character. A character composes with the
/// starter when nothing of equal or higher class stands between them
/// (D117's blocking rule); `discontiguous` narrows that further for FCC,
/// which only ever composes with a character immediately adjacent to the
/// starter, so an edit can never ripple composition into an earlier span.
fn compose_buffer(nfd: &mut Vec<u32>, discontiguous: bool) {
    let mut out: Vec<u32> = Vec::with_capacity(nfd.len());
    let mut starter: Option<usize> = None;
    let mut last_class = 0u8;
    let mut distance_from_starter = 0usize;

    for &ch in nfd.iter() {
        let ccc = combining_class(ch);
        let adjacent = discontiguous || distance_from_starter == 0;
        let composite = starter.filter(|_| adjacent && (last_class < ccc || last_class == 0))
            .and_then(|si| compose(out[si], ch));

        if let Some(composed) = composite {
            out[starter.unwrap()] = composed;
        } else {
            out.push(ch);
            if ccc == 0 {
                starter = Some(out.len() - 1);
                distance_from_starter = 0;
            } else {
                distance_from_starter += 1;
            }
            last_class = ccc;
        }
    }
    *nfd = out;
}

fn to_c(cps: &[u32], compat: bool, discontiguous: bool) -> Vec<u32> {
    let mut buf = to_d(cps, compat);
    if !buf.is_empty() {
        compose_buffer(&mut buf, discontiguous);
    }
    buf
}

/// Normalizes a code-point sequence into the given form.
pub fn normalize(cps: &[u32], form: Form) -> Vec<u32> {
    match form {
        Form::Nfd => to_d(cps, false),
        Form::Nfkd => to_d(cps, true),
        Form::Nfc => to_c(cps, false, true),
        Form::Nfkc => to_c(cps, true, true),
        Form::Fcc => to_c(cps, false, false),
    }
}

/// Quick-check fast path: `Yes` means `cps` is already in
/// `form` and may be used verbatim; `No`/`Maybe` both require full
/// normalization to decide or to produce output.
pub fn is_normalized(cps: &[u32], form: Form) -> QuickCheck {
    use crate::ucd::quick_check;
    let mut previous_ccc = 0u8;
    let mut result = QuickCheck::Yes;
    for &cp in cps {
        let ccc = combining_class(cp);
        match quick_check(cp, form) {
            QuickCheck::No => return QuickCheck::No,
            QuickCheck::Maybe => result = QuickCheck::Maybe,
            QuickCheck::Yes => {}
        }
        if ccc != 0 && ccc < previous_ccc {
            return QuickCheck::No;
        }
        previous_ccc = ccc;
    }
    result
}

/// Smallest prefix end that lies on a stable boundary.
/// Returns `cps.len()` if no code point in `cps` is stable.
pub fn first_stable_cp(cps: &[u32], form: Form) -> usize {
    cps.iter().position(|&cp| is_stable(cp, form)).unwrap_or(cps.len())
}

/// Largest prefix start that lies on a stable boundary. Returns 0 if no
/// code point in `cps` is stable (the whole slice must be treated as
/// unstable).
pub fn last_stable_cp(cps: &[u32], form: Form) -> usize {
    cps.iter().rposition(|&cp| is_stable(cp, form)).unwrap_or(0)
}

/// Accepts code-point input in chunks and normalizes it in bounded memory.
/// A chunk boundary may not fall inside a non-starter run, so a trailing
/// partial run is buffered and prepended to the next chunk.
pub struct NormalizingStream {
    form: Form,
    carry: Vec<u32>,
}

impl NormalizingStream {
    pub fn new(form: Form) -> Self {
        NormalizingStream {
            form,
            carry: Vec::new(),
        }
    }

    /// Feeds a chunk of code points, returning as much normalized output
    /// as can safely be produced without seeing more input.
    pub fn push(&mut self, chunk: &[u32]) -> Vec<u32> {
        self.carry.extend_from_slice(chunk);
        // Stream-Safe Text Format guarantees a stable cut point within
        // NONSTARTER_CAP code points of the end, even for adversarial
        // all-combining-mark input.
        self.carry = as_stream_safe(&self.carry);
        let cut = last_stable_cp(&self.carry, self.form);
        if cut == 0 {
            return Vec::new();
        }
        let tail = self.carry.split_off(cut);
        let head = std::mem::replace(&mut self.carry, tail);
        normalize(&head, self.form)
    }

    /// Flushes any buffered trailing partial run. Must be called once,
    /// after the last `push`.
    pub fn finish(&mut self) -> Vec<u32> {
        normalize(&std::mem::take(&mut self.carry), self.form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quick_check_ascii() {
        let s: Vec<u32> = "hello world".chars().map(|c| c as u32).collect();
        assert_eq!(is_normalized(&s, Form::Nfc), QuickCheck::Yes);
    }

    #[test]
    fn quick_check_decomposed_is_maybe() {
        // "a" + combining ring above, still in canonical order: not
        // necessarily non-normalized, quick-check can only say "maybe".
        let s = vec![0x61, 0x030A];
        assert_eq!(is_normalized(&s, Form::Nfc), QuickCheck::Maybe);
    }

    #[test]
    fn nfd_decomposes_precomposed_letter() {
        assert_eq!(normalize(&[0x00E5], Form::Nfd), vec![0x61, 0x030A]);
    }

    #[test]
    fn nfc_composes_decomposed_letter() {
        assert_eq!(normalize(&[0x61, 0x030A], Form::Nfc), vec![0x00E5]);
    }

    #[test]
    fn nfkd_expands_ligature_nfd_does_not() {
        assert_eq!(normalize(&[0xFB01], Form::Nfd), vec![0xFB01]);
        assert_eq!(normalize(&[0xFB01], Form::Nfkd), vec![0x66, 0x69]);
    }

    #[test]
    fn idempotent_for_all_forms() {
        let s = vec![0x00E9, 0x0041, 0xFB01];
        for form in [Form::Nfd, Form::Nfkd, Form::Nfc, Form::Nfkc, Form::Fcc] {
            let once = normalize(&s, form);
            let twice = normalize(&once, form);
            assert_eq!(once, twice, "{:?} not idempotent", form);
        }
    }

    #[test]
    fn nfd_nfc_canonical_equivalence() {
        let composed = vec![0x00E9]; // é
        let decomposed = vec![0x65, 0x0301]; // e + combining acute
        assert_eq!(normalize(&composed, Form::Nfd), normalize(&decomposed, Form::Nfd));
        assert_eq!(normalize(&composed, Form::Nfc), normalize(&decomposed, Form::Nfc));
    }

    #[test]
    fn hangul_composes_to_single_syllable() {
        // L + V + T jamo compose to the single syllable U+AC01 "각"
        let jamo = vec![0x1100, 0x1161, 0x11A8];
        assert_eq!(normalize(&jamo, Form::Nfc), vec![0xAC01]);
    }

    #[test]
    fn fcc_forbids_discontiguous_composition() {
        // a + combining dot below (ccc 220) + combining acute (ccc 230):
        // NFC composes a+acute across the dot-below (non-blocking, lower
        // ccc); FCC must not, since the acute is not adjacent to 'a'.
        let s = vec![0x61, 0x0323, 0x0301];
        let nfc = normalize(&s, Form::Nfc);
        let fcc = normalize(&s, Form::Fcc);
        assert_ne!(nfc, fcc);
        assert_eq!(fcc, vec![0x61, 0x0323, 0x0301]);
    }

    #[test]
    fn streaming_matches_one_shot() {
        let s: Vec<u32> = "café".chars().map(|c| c as u32).collect();
        let mut stream = NormalizingStream::new(Form::Nfc);
        let mut out = stream.push(&s[..2]);
        out.extend(stream.push(&s[2..]));
        out.extend(stream.finish());
        assert_eq!(out, normalize(&s, Form::Nfc));
    }
}
