//! The two leaf kinds: an owned leaf holds its bytes; a
//! reference leaf is a window `(data, lo, hi)` into a leaf someone else
//! owns. `substr`/`concat` produce reference leaves liberally so slicing a
//! large rope never copies its text; only an insertion that needs to grow a
//! leaf past [`RopeConfig::max_leaf`] allocates fresh bytes.
//!
//! Tagged variant rather than a trait object: there are exactly two shapes
//! and no caller ever needs to add a third, so the enum avoids the
//! indirection and allocation a trait object would cost here.

use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum Leaf {
    Owned(Arc<Vec<u8>>),
    Reference {
        data: Arc<Vec<u8>>,
        lo: usize,
        hi: usize,
    },
}

impl Leaf {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Leaf::Owned(Arc::new(bytes))
    }

    pub fn len(&self) -> usize {
        match self {
            Leaf::Owned(b) => b.len(),
            Leaf::Reference { lo, hi, .. } => hi - lo,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Leaf::Owned(b) => b,
            Leaf::Reference { data, lo, hi } => &data[*lo..*hi],
        }
    }

    /// `slice_leaf`: the sub-window `[lo, hi)` of this leaf.
    /// Always returns a reference leaf when trimming an owned leaf and
    /// `encode_as_ref` is set, narrowing further when trimming an existing
    /// reference leaf (never chains through the original owner twice).
    pub fn slice(&self, lo: usize, hi: usize, encode_as_ref: bool) -> Leaf {
        debug_assert!(lo <= hi && hi <= self.len());
        if lo == 0 && hi == self.len() {
            return self.clone();
        }
        match self {
            Leaf::Reference { data, lo: base, .. } => Leaf::Reference {
                data: data.clone(),
                lo: base + lo,
                hi: base + hi,
            },
            Leaf::Owned(bytes) => {
                if encode_as_ref {
                    Leaf::Reference {
                        data: bytes.clone(),
                        lo,
                        hi,
                    }
                } else {
                    Leaf::Owned(Arc::new(bytes[lo..hi].to_vec()))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owned_slice_becomes_reference() {
        let leaf = Leaf::from_bytes(b"hello world".to_vec());
        let slice = leaf.slice(6, 11, true);
        assert!(matches!(slice, Leaf::Reference { .. }));
        assert_eq!(slice.as_bytes(), b"world");
    }

    #[test]
    fn reference_of_reference_does_not_nest() {
        let leaf = Leaf::from_bytes(b"hello world".to_vec());
        let once = leaf.slice(0, 8, true);
        let twice = once.slice(2, 5, true);
        assert_eq!(twice.as_bytes(), b"llo");
        match twice {
            Leaf::Reference { data, .. } => assert_eq!(data.len(), leaf.len()),
            Leaf::Owned(_) => panic!("expected a reference leaf"),
        }
    }

    #[test]
    fn full_span_slice_is_identity() {
        let leaf = Leaf::from_bytes(b"abc".to_vec());
        let same = leaf.slice(0, 3, true);
        assert_eq!(same.as_bytes(), leaf.as_bytes());
    }
}
