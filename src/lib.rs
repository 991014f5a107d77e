//! # frag-rs
//!
//! Packed binary-trie addresses ("frags") for partitioning a fixed 24-bit
//! key space, such as the low bits of a name hash.
//!
//! A frag names one node of the binary subdivision trie over the space. It is
//! stored in a single `u32`: the top 8 bits hold the depth, the low 24 bits
//! hold the value, of which only the top `depth` bits are meaningful. Using
//! the most significant bits of the value makes values sort logically, but
//! because the depth sits above them the packed words do not; use
//! [`Frag::compare`] (or `Ord`) for logical order.
//!
//! ## Example
//!
//! ```rust
//! use frag_rs::{Frag, FragTree};
//!
//! let left = Frag::ROOT.left_child().unwrap();
//! assert_eq!(left, Frag::new(1, 0).unwrap());
//! assert!(left.contains_value(0x12_3456));
//! assert!(!left.contains_value(0x92_3456));
//!
//! let mut tree = FragTree::new();
//! tree.split(Frag::ROOT, 2).unwrap();
//! assert_eq!(tree.leaf_for(0x92_3456), Frag::new(2, 0x80_0000).unwrap());
//! ```

#![forbid(unsafe_code)]

mod error;
mod frag;
mod tree;

pub use error::{FragError, FragResult};
pub use frag::{Children, Frag};
pub use tree::FragTree;

// =============================================================================
// Configuration
// =============================================================================

/// Width of the value field.
pub const VALUE_BITS: u32 = 24;
/// Deepest frag; at this depth every value bit is significant.
pub const MAX_DEPTH: u32 = VALUE_BITS;
pub const VALUE_MASK: u32 = (1 << VALUE_BITS) - 1;
/// One past the largest value. `SPACE_SIZE >> depth` is the width of a frag at `depth`.
pub const SPACE_SIZE: u32 = 1 << VALUE_BITS;
