//! # Block Numbers and Scan Windows
//!
//! `BlockNumber` is the ledger's native 256-bit block height. `BlockRange`
//! is the lazy, ascending enumeration of the scan window
//! `[head - window_size, head]` that feeds the worker pool.
//!
//! ## Underflow Policy
//!
//! A window reaching below genesis is clamped to start at block 0. The
//! range remembers that it was clamped so callers can surface it; the
//! arithmetic itself never wraps.

use std::fmt;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Height of a block in the ledger.
///
/// Totally ordered and exact at any magnitude. Serializes as a JSON-RPC hex
/// quantity; displays in decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockNumber(pub U256);

impl BlockNumber {
    /// The first block of the ledger.
    pub const GENESIS: Self = Self(U256::ZERO);

    /// Wrap a raw 256-bit height.
    pub const fn new(value: U256) -> Self {
        Self(value)
    }

    /// Access the inner integer.
    pub fn as_u256(&self) -> &U256 {
        &self.0
    }

    /// Parse a JSON-RPC hex quantity such as `"0x3e8"`.
    ///
    /// The `0x` prefix is mandatory and at least one digit must follow.
    /// Values that do not fit in 256 bits are rejected.
    pub fn from_quantity(raw: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidQuantity {
            value: raw.to_string(),
            reason: reason.to_string(),
        };
        let digits = raw
            .strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .ok_or_else(|| invalid("missing 0x prefix"))?;
        if digits.is_empty() {
            return Err(invalid("no digits after 0x"));
        }
        U256::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|e| invalid(&e.to_string()))
    }

    /// Render as a JSON-RPC hex quantity (`"0x3e8"`, `"0x0"`).
    pub fn to_quantity(&self) -> String {
        format!("0x{:x}", self.0)
    }

    /// `self + n`, or `None` past the 256-bit ceiling.
    pub fn checked_add(&self, n: u64) -> Option<Self> {
        self.0.checked_add(U256::from(n)).map(Self)
    }

    /// `self - n`, stopping at genesis.
    pub fn saturating_sub(&self, n: u64) -> Self {
        Self(self.0.saturating_sub(U256::from(n)))
    }

    /// Lossy conversion for metrics and log fields.
    pub fn saturating_u64(&self) -> u64 {
        u64::try_from(self.0).unwrap_or(u64::MAX)
    }
}

impl From<u64> for BlockNumber {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<U256> for BlockNumber {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl fmt::Display for BlockNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The closed, ascending interval of blocks a scan cycle visits.
///
/// Iterating yields each block exactly once, oldest first. The range is
/// never empty: it always contains at least `head`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRange {
    start: BlockNumber,
    end: BlockNumber,
    next: Option<U256>,
    clamped: bool,
}

impl BlockRange {
    /// The window of `window_size + 1` blocks ending at `head`.
    ///
    /// When `head < window_size` the window is clamped to start at genesis
    /// and [`is_clamped`](Self::is_clamped) returns `true`.
    pub fn window(head: BlockNumber, window_size: u64) -> Self {
        let size = U256::from(window_size);
        let (start, clamped) = if head.0 < size {
            (U256::ZERO, true)
        } else {
            (head.0 - size, false)
        };
        Self {
            start: BlockNumber(start),
            end: head,
            next: Some(start),
            clamped,
        }
    }

    /// Oldest block in the window.
    pub fn start(&self) -> BlockNumber {
        self.start
    }

    /// Newest block in the window (the head).
    pub fn end(&self) -> BlockNumber {
        self.end
    }

    /// Whether the requested window reached below genesis.
    pub fn is_clamped(&self) -> bool {
        self.clamped
    }

    /// Total number of blocks in the window, independent of iteration.
    pub fn len(&self) -> U256 {
        self.end.0 - self.start.0 + U256::from(1u8)
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `block` lies inside the window.
    pub fn contains(&self, block: &BlockNumber) -> bool {
        self.start <= *block && *block <= self.end
    }
}

impl Iterator for BlockRange {
    type Item = BlockNumber;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = if current == self.end.0 {
            None
        } else {
            Some(current + U256::from(1u8))
        };
        Some(BlockNumber(current))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.next {
            None => (0, Some(0)),
            Some(next) => {
                let remaining = self.end.0 - next + U256::from(1u8);
                match usize::try_from(remaining) {
                    Ok(n) => (n, Some(n)),
                    Err(_) => (usize::MAX, None),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn window_of_two_below_thousand() {
        let range = BlockRange::window(BlockNumber::from(1000), 2);
        let blocks: Vec<_> = range.collect();
        assert_eq!(
            blocks,
            vec![
                BlockNumber::from(998),
                BlockNumber::from(999),
                BlockNumber::from(1000)
            ]
        );
    }

    #[test]
    fn default_window_has_101_blocks() {
        let range = BlockRange::window(BlockNumber::from(20_000_000), 100);
        assert_eq!(range.len(), U256::from(101));
        assert_eq!(range.start(), BlockNumber::from(19_999_900));
        assert!(!range.is_clamped());
        assert_eq!(range.count(), 101);
    }

    #[test]
    fn window_below_genesis_is_clamped() {
        let range = BlockRange::window(BlockNumber::from(5), 100);
        assert!(range.is_clamped());
        assert_eq!(range.start(), BlockNumber::GENESIS);
        let blocks: Vec<_> = range.collect();
        assert_eq!(blocks.len(), 6);
        assert_eq!(blocks[0], BlockNumber::GENESIS);
        assert_eq!(blocks[5], BlockNumber::from(5));
    }

    #[test]
    fn window_exactly_at_genesis_is_not_clamped() {
        let range = BlockRange::window(BlockNumber::from(100), 100);
        assert!(!range.is_clamped());
        assert_eq!(range.start(), BlockNumber::GENESIS);
        assert_eq!(range.count(), 101);
    }

    #[test]
    fn zero_window_yields_only_head() {
        let blocks: Vec<_> = BlockRange::window(BlockNumber::from(42), 0).collect();
        assert_eq!(blocks, vec![BlockNumber::from(42)]);
    }

    #[test]
    fn genesis_head_yields_genesis() {
        let range = BlockRange::window(BlockNumber::GENESIS, 3);
        assert!(range.is_clamped());
        let blocks: Vec<_> = range.collect();
        assert_eq!(blocks, vec![BlockNumber::GENESIS]);
    }

    #[test]
    fn window_at_u256_ceiling_terminates() {
        let head = BlockNumber(U256::MAX);
        let blocks: Vec<_> = BlockRange::window(head, 2).collect();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[2], head);
        assert_eq!(blocks[0], BlockNumber(U256::MAX - U256::from(2)));
    }

    #[test]
    fn size_hint_tracks_remaining() {
        let mut range = BlockRange::window(BlockNumber::from(10), 4);
        assert_eq!(range.size_hint(), (5, Some(5)));
        range.next();
        range.next();
        assert_eq!(range.size_hint(), (3, Some(3)));
        range.by_ref().for_each(drop);
        assert_eq!(range.size_hint(), (0, Some(0)));
        assert_eq!(range.len(), U256::from(5), "len is independent of iteration");
    }

    #[test]
    fn contains_respects_bounds() {
        let range = BlockRange::window(BlockNumber::from(1000), 2);
        assert!(range.contains(&BlockNumber::from(998)));
        assert!(range.contains(&BlockNumber::from(1000)));
        assert!(!range.contains(&BlockNumber::from(997)));
        assert!(!range.contains(&BlockNumber::from(1001)));
    }

    #[test]
    fn quantity_parses_hex() {
        assert_eq!(
            BlockNumber::from_quantity("0x3e8").unwrap(),
            BlockNumber::from(1000)
        );
        assert_eq!(BlockNumber::from_quantity("0x0").unwrap(), BlockNumber::GENESIS);
        assert_eq!(
            BlockNumber::from_quantity("0X1A").unwrap(),
            BlockNumber::from(26)
        );
    }

    #[test]
    fn quantity_rejects_malformed_input() {
        assert!(BlockNumber::from_quantity("3e8").is_err());
        assert!(BlockNumber::from_quantity("0x").is_err());
        assert!(BlockNumber::from_quantity("0xzz").is_err());
        let too_big = format!("0x1{}", "0".repeat(64));
        assert!(BlockNumber::from_quantity(&too_big).is_err());
    }

    #[test]
    fn quantity_renders_hex() {
        assert_eq!(BlockNumber::from(1000).to_quantity(), "0x3e8");
        assert_eq!(BlockNumber::GENESIS.to_quantity(), "0x0");
    }

    #[test]
    fn display_is_decimal() {
        assert_eq!(BlockNumber::from(1000).to_string(), "1000");
    }

    #[test]
    fn arithmetic_helpers() {
        assert_eq!(
            BlockNumber::from(3).saturating_sub(10),
            BlockNumber::GENESIS
        );
        assert_eq!(BlockNumber::from(3).checked_add(1), Some(BlockNumber::from(4)));
        assert_eq!(BlockNumber(U256::MAX).checked_add(1), None);
        assert_eq!(BlockNumber(U256::MAX).saturating_u64(), u64::MAX);
    }

    proptest! {
        #[test]
        fn window_is_ascending_and_exact(head in 0u64..10_000_000, window in 0u64..512) {
            prop_assume!(head >= window);
            let blocks: Vec<_> = BlockRange::window(BlockNumber::from(head), window).collect();
            prop_assert_eq!(blocks.len() as u64, window + 1);
            prop_assert_eq!(blocks[0], BlockNumber::from(head - window));
            prop_assert_eq!(*blocks.last().unwrap(), BlockNumber::from(head));
            for pair in blocks.windows(2) {
                prop_assert!(pair[0] < pair[1]);
                prop_assert_eq!(pair[1].0 - pair[0].0, U256::from(1u8));
            }
        }

        #[test]
        fn clamped_window_starts_at_genesis(head in 0u64..256, window in 0u64..512) {
            prop_assume!(head < window);
            let range = BlockRange::window(BlockNumber::from(head), window);
            prop_assert!(range.is_clamped());
            let blocks: Vec<_> = range.collect();
            prop_assert_eq!(blocks.len() as u64, head + 1);
            prop_assert_eq!(blocks[0], BlockNumber::GENESIS);
        }

        #[test]
        fn quantity_round_trips(n in any::<u64>()) {
            let block = BlockNumber::from(n);
            prop_assert_eq!(BlockNumber::from_quantity(&block.to_quantity()).unwrap(), block);
        }
    }
}
