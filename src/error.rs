//! Error type shared by the frag codec and the leaf tree.

use thiserror::Error;

use crate::Frag;

pub type FragResult<T> = Result<T, FragError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FragError {
    /// A depth above 24 was requested or decoded.
    #[error("frag depth {depth} exceeds the 24-bit value field")]
    DepthOutOfRange { depth: u32 },

    /// A raw word had bits set below its prefix (or a depth that leaves no room for them).
    #[error("raw frag {raw:#010x} has bits set below its prefix")]
    StrayBits { raw: u32 },

    #[error("child index {index} out of range for a {by}-level split")]
    ChildIndexOutOfRange { by: u32, index: u32 },

    #[error("cannot parse frag from {input:?}")]
    Parse { input: String },

    #[error("{0} is not a leaf")]
    NotALeaf(Frag),

    #[error("{frag} is already covered by shallower leaf {leaf}")]
    Covered { frag: Frag, leaf: Frag },

    #[error("split by zero levels")]
    EmptySplit,

    /// The leaf set does not tile the space; the frag marks the first hole or overlap.
    #[error("leaf set has a gap or overlap at {0}")]
    Gap(Frag),
}
