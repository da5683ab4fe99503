//! A Unicode-aware persistent text toolkit: a copy-on-write rope B-tree
//! ([`rope::Rope`]) and a Unicode normalization/grapheme-segmentation
//! engine, composed into a grapheme- and FCC-normalization-aware facade
//! ([`grapherope::GraphemeRope`]).

pub mod boundary;
pub mod config;
pub mod error;
pub mod grapherope;
pub mod normalize;
pub mod rope;
pub mod segmentation;
pub mod stream_safe;
pub mod ucd;

pub use config::RopeConfig;
pub use error::{TextError, Utf8ErrorKind};
pub use grapherope::GraphemeRope;
pub use rope::Rope;
pub use ucd::{NormalizationForm, QuickCheck};
