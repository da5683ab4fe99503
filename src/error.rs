//! Error types for the boundary and rope layers.
//!
//! The normalization engine and grapheme segmenter are pure functions with
//! no failure modes beyond exhaustion of the input (spec categories 1 and 2
//! only apply at the boundary and at rope entry points that take raw
//! caller-supplied offsets).

use thiserror::Error;

/// What went wrong while decoding a UTF-8 byte sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utf8ErrorKind {
    UnexpectedContinuation,
    InvalidLeadByte,
    IncompleteSequence,
    OverlongEncoding,
    SurrogateCodePoint,
    CodePointTooLarge,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TextError {
    #[error("invalid UTF-8 at byte {at}: {kind:?}")]
    InvalidUtf8 { at: usize, kind: Utf8ErrorKind },

    #[error("offset {offset} out of bounds for rope of length {len}")]
    OffsetOutOfBounds { offset: usize, len: usize },
}
