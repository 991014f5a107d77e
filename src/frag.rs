use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{FragError, FragResult};
use crate::{MAX_DEPTH, SPACE_SIZE, VALUE_BITS, VALUE_MASK};

// =============================================================================
// Bit utilities
// =============================================================================

const DEPTH_SHIFT: u32 = VALUE_BITS;

/// Mask with the top `depth` bits of the value field set.
#[inline]
const fn mask_for(depth: u32) -> u32 {
    debug_assert!(depth <= MAX_DEPTH);
    (VALUE_MASK << (VALUE_BITS - depth)) & VALUE_MASK
}

/// Width of a frag at `depth`; also the bit that separates a frag at `depth`
/// from its sibling.
#[inline]
const fn step_for(depth: u32) -> u32 {
    debug_assert!(depth <= MAX_DEPTH);
    SPACE_SIZE >> depth
}

#[inline]
const fn pack(depth: u32, value: u32) -> u32 {
    (depth << DEPTH_SHIFT) | (value & mask_for(depth))
}

// =============================================================================
// Frag
// =============================================================================

/// One node of the binary trie over the 24-bit space.
///
/// Layout of the packed word:
/// - Bits 31..24: depth (0..=24)
/// - Bits 23..0: value; the top `depth` bits are the node's address, the rest
///   are always zero
///
/// Every `Frag` is well-formed: constructors mask or reject anything else, so
/// two frags are equal exactly when their depth and significant bits are.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u32", into = "u32")
)]
#[repr(transparent)]
pub struct Frag(u32);

impl Frag {
    /// The whole space.
    pub const ROOT: Frag = Frag(0);

    /// Builds the frag at `depth` whose prefix is the top `depth` bits of
    /// `value`. Bits of `value` outside that prefix are discarded.
    pub fn new(depth: u32, value: u32) -> FragResult<Frag> {
        if depth > MAX_DEPTH {
            return Err(FragError::DepthOutOfRange { depth });
        }
        Ok(Frag(pack(depth, value)))
    }

    /// Decodes a packed word, rejecting depths above 24 and words with bits
    /// set below the prefix.
    pub fn from_raw(raw: u32) -> FragResult<Frag> {
        let depth = raw >> DEPTH_SHIFT;
        if depth > MAX_DEPTH {
            return Err(FragError::DepthOutOfRange { depth });
        }
        if raw & VALUE_MASK & !mask_for(depth) != 0 {
            return Err(FragError::StrayBits { raw });
        }
        Ok(Frag(raw))
    }

    /// The deepest frag holding `value`: every bit significant.
    #[inline]
    pub const fn point(value: u32) -> Frag {
        Frag(pack(MAX_DEPTH, value))
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn depth(self) -> u32 {
        self.0 >> DEPTH_SHIFT
    }

    #[inline]
    pub const fn value(self) -> u32 {
        self.0 & VALUE_MASK
    }

    #[inline]
    pub const fn mask(self) -> u32 {
        mask_for(self.depth())
    }

    /// Number of insignificant low bits in the value.
    #[inline]
    pub const fn mask_shift(self) -> u32 {
        VALUE_BITS - self.depth()
    }

    #[inline]
    pub const fn is_root(self) -> bool {
        self.depth() == 0
    }

    // -------------------------------------------------------------------------
    // Containment
    // -------------------------------------------------------------------------

    /// Whether the 24-bit value `v` falls inside this frag.
    #[inline]
    pub const fn contains_value(self, v: u32) -> bool {
        (v & self.mask()) == self.value()
    }

    /// Whether `sub` is this frag or one of its descendants.
    #[inline]
    pub const fn contains(self, sub: Frag) -> bool {
        sub.depth() >= self.depth() && (sub.value() & self.mask()) == self.value()
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    pub const fn parent(self) -> Option<Frag> {
        match self.depth() {
            0 => None,
            depth => Some(Frag(pack(depth - 1, self.value()))),
        }
    }

    #[inline]
    pub const fn is_left_child(self) -> bool {
        !self.is_root() && self.value() & step_for(self.depth()) == 0
    }

    #[inline]
    pub const fn is_right_child(self) -> bool {
        !self.is_root() && self.value() & step_for(self.depth()) != 0
    }

    pub const fn sibling(self) -> Option<Frag> {
        match self.depth() {
            0 => None,
            depth => Some(Frag(pack(depth, self.value() ^ step_for(depth)))),
        }
    }

    pub const fn left_child(self) -> Option<Frag> {
        match self.depth() {
            MAX_DEPTH => None,
            depth => Some(Frag(pack(depth + 1, self.value()))),
        }
    }

    pub const fn right_child(self) -> Option<Frag> {
        match self.depth() {
            MAX_DEPTH => None,
            depth => Some(Frag(pack(depth + 1, self.value() | step_for(depth + 1)))),
        }
    }

    /// The `i`-th of the `2^by` descendants `by` levels down, counting from
    /// the left. `make_child(1, 0)` is the left child, `make_child(1, 1)` the
    /// right one, and `make_child(0, 0)` is `self`.
    pub fn make_child(self, by: u32, i: u32) -> FragResult<Frag> {
        let depth = self.child_depth(by)?;
        if i >> by != 0 {
            return Err(FragError::ChildIndexOutOfRange { by, index: i });
        }
        Ok(Frag(pack(depth, self.value() | (i << (VALUE_BITS - depth)))))
    }

    /// All `2^by` descendants `by` levels down, in logical order.
    pub fn children(self, by: u32) -> FragResult<Children> {
        let depth = self.child_depth(by)?;
        Ok(Children {
            base: self.value(),
            depth,
            shift: VALUE_BITS - depth,
            next: 0,
            end: 1 << by,
        })
    }

    fn child_depth(self, by: u32) -> FragResult<u32> {
        match self.depth().checked_add(by) {
            Some(depth) if depth <= MAX_DEPTH => Ok(depth),
            _ => Err(FragError::DepthOutOfRange {
                depth: self.depth().saturating_add(by),
            }),
        }
    }

    /// Whether every significant bit is clear: the first frag at this depth.
    #[inline]
    pub const fn is_leftmost(self) -> bool {
        self.value() == 0
    }

    /// Whether every significant bit is set: the last frag at this depth.
    #[inline]
    pub const fn is_rightmost(self) -> bool {
        self.value() == self.mask()
    }

    /// The frag immediately to the right at the same depth, whether or not it
    /// shares a parent with `self`. `None` past the end of the space, which is
    /// exactly when `self.is_rightmost()`.
    pub const fn next(self) -> Option<Frag> {
        let depth = self.depth();
        let value = self.value() + step_for(depth);
        if value > VALUE_MASK {
            None
        } else {
            Some(Frag(pack(depth, value)))
        }
    }

    // -------------------------------------------------------------------------
    // Ordering
    // -------------------------------------------------------------------------

    /// Logical order: left to right through the space, an ancestor before
    /// its descendants (pre-order). Not the numeric order of [`Frag::raw`].
    ///
    /// Low bits are always zero, so comparing values orders any two frags by
    /// their first differing prefix bit; equal values mean one is the
    /// leftmost descendant of the other and the shallower one goes first.
    #[inline]
    pub fn compare(self, other: Frag) -> Ordering {
        self.value()
            .cmp(&other.value())
            .then_with(|| self.depth().cmp(&other.depth()))
    }
}

impl Ord for Frag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(*other)
    }
}

impl PartialOrd for Frag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<Frag> for u32 {
    fn from(f: Frag) -> u32 {
        f.raw()
    }
}

impl TryFrom<u32> for Frag {
    type Error = FragError;

    fn try_from(raw: u32) -> FragResult<Frag> {
        Frag::from_raw(raw)
    }
}

// =============================================================================
// Text forms
// =============================================================================

/// Significant bits as binary digits followed by `*`; the root is just `*`.
impl fmt::Display for Frag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.value();
        for bit in (self.mask_shift()..VALUE_BITS).rev() {
            f.write_str(if value & (1 << bit) != 0 { "1" } else { "0" })?;
        }
        f.write_str("*")
    }
}

/// `value/depth` with the value in hex, e.g. `400000/2`.
impl fmt::LowerHex for Frag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}/{}", self.value(), self.depth())
    }
}

impl fmt::Debug for Frag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frag({self})")
    }
}

impl FromStr for Frag {
    type Err = FragError;

    /// Accepts either text form. Values with bits outside their prefix are
    /// rejected rather than masked.
    fn from_str(s: &str) -> FragResult<Frag> {
        let parse_err = || FragError::Parse {
            input: s.to_string(),
        };

        if let Some(digits) = s.strip_suffix('*') {
            let depth = u32::try_from(digits.len()).map_err(|_| parse_err())?;
            if depth > MAX_DEPTH {
                return Err(FragError::DepthOutOfRange { depth });
            }
            let mut value = 0u32;
            for (i, c) in (0u32..).zip(digits.chars()) {
                match c {
                    '0' => {}
                    '1' => value |= 1 << (VALUE_BITS - 1 - i),
                    _ => return Err(parse_err()),
                }
            }
            return Frag::new(depth, value);
        }

        let (value, depth) = s.split_once('/').ok_or_else(parse_err)?;
        let value = u32::from_str_radix(value, 16).map_err(|_| parse_err())?;
        let depth = depth.parse::<u32>().map_err(|_| parse_err())?;
        let frag = Frag::new(depth, value)?;
        if frag.value() != value {
            return Err(parse_err());
        }
        Ok(frag)
    }
}

// =============================================================================
// Children iterator
// =============================================================================

/// Iterator returned by [`Frag::children`].
#[derive(Clone, Debug)]
pub struct Children {
    base: u32,
    depth: u32,
    shift: u32,
    next: u32,
    end: u32,
}

impl Iterator for Children {
    type Item = Frag;

    fn next(&mut self) -> Option<Frag> {
        if self.next >= self.end {
            return None;
        }
        let i = self.next;
        self.next += 1;
        Some(Frag(pack(self.depth, self.base | (i << self.shift))))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = (self.end - self.next) as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Children {}
