//! Capacities of hash values and the folding of arbitrary values into them.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::error::HashError;

static BYTE_SIZE: OnceLock<HashSize> = OnceLock::new();
static SHORT_SIZE: OnceLock<HashSize> = OnceLock::new();
static INT_SIZE: OnceLock<HashSize> = OnceLock::new();
static LONG_SIZE: OnceLock<HashSize> = OnceLock::new();

/// The number of distinct values a hasher can produce.
///
/// Values of a size `n` lie in `[0, n)`. Everything the folding operations
/// need (bit length, power-of-two test, masks, native-width copies of the
/// capacity) is computed once on construction, since sized hashers fold
/// every value they emit.
///
/// The big-integer fields are shared, so cloning a size (as the length
/// constructors do with the canonical sizes) never copies a capacity.
///
/// Widths are classified two ways:
///
/// * *sized*: the capacity itself can be handled in native arithmetic with
///   headroom (`bits < 32` for ints, `bits < 64` for longs);
/// * *capacity*: every value `0..n` fits the width (`bits <= 32`,
///   `bits <= 64`), although the capacity itself may not.
#[derive(Clone, Debug)]
pub struct HashSize {
    big_size: Arc<BigUint>,
    bits: u32,
    power_of_two: bool,
    mask: Arc<BigUint>,

    int_sized: bool,
    int_capacity: bool,
    int_size: u32,
    int_mask: u32,

    long_sized: bool,
    long_capacity: bool,
    long_size: u64,
    long_mask: u64,
}

impl HashSize {
    /// All 2^8 byte values.
    pub fn byte_size() -> &'static HashSize {
        BYTE_SIZE.get_or_init(|| HashSize::new(BigUint::one() << 8u32))
    }

    /// All 2^16 short values.
    pub fn short_size() -> &'static HashSize {
        SHORT_SIZE.get_or_init(|| HashSize::new(BigUint::one() << 16u32))
    }

    /// All 2^32 int values.
    pub fn int_size() -> &'static HashSize {
        INT_SIZE.get_or_init(|| HashSize::new(BigUint::one() << 32u32))
    }

    /// All 2^64 long values.
    pub fn long_size() -> &'static HashSize {
        LONG_SIZE.get_or_init(|| HashSize::new(BigUint::one() << 64u32))
    }

    /// The size of hashes that are `byte_length` bytes long.
    pub fn from_byte_length(byte_length: usize) -> Result<Self, HashError> {
        match byte_length {
            0 => Err(HashError::invalid("non-positive byte length")),
            1 => Ok(Self::byte_size().clone()),
            2 => Ok(Self::short_size().clone()),
            4 => Ok(Self::int_size().clone()),
            8 => Ok(Self::long_size().clone()),
            _ => {
                let bit_length = byte_length
                    .checked_mul(8)
                    .and_then(|bits| u32::try_from(bits).ok())
                    .ok_or_else(|| HashError::invalid("byte length too large"))?;
                Self::from_bit_length(bit_length)
            }
        }
    }

    /// The size of hashes that are `bit_length` bits long.
    pub fn from_bit_length(bit_length: u32) -> Result<Self, HashError> {
        match bit_length {
            0 => Err(HashError::invalid("non-positive bit length")),
            8 => Ok(Self::byte_size().clone()),
            16 => Ok(Self::short_size().clone()),
            32 => Ok(Self::int_size().clone()),
            64 => Ok(Self::long_size().clone()),
            _ => Ok(Self::new(BigUint::one() << bit_length)),
        }
    }

    pub fn from_big(size: BigUint) -> Result<Self, HashError> {
        if size.is_zero() {
            return Err(HashError::invalid("non-positive size"));
        }
        Ok(Self::new(size))
    }

    pub fn from_u32(size: u32) -> Result<Self, HashError> {
        Self::from_big(BigUint::from(size))
    }

    pub fn from_u64(size: u64) -> Result<Self, HashError> {
        Self::from_big(BigUint::from(size))
    }

    fn new(big_size: BigUint) -> Self {
        let size_minus_one = &big_size - 1u32;
        // a BigUint bit length always fits: sizes are bounded by memory
        let bits = size_minus_one.bits() as u32;
        let power_of_two = (&big_size & &size_minus_one).is_zero();
        let mask = if power_of_two {
            size_minus_one
        } else {
            (BigUint::one() << bits) - 1u32
        };

        let int_size = low_u32(&big_size);
        let long_size = low_u64(&big_size);

        HashSize {
            big_size: Arc::new(big_size),
            bits,
            power_of_two,
            mask: Arc::new(mask),
            int_sized: bits < 32,
            int_capacity: bits <= 32,
            int_size,
            int_mask: int_size.wrapping_sub(1),
            long_sized: bits < 64,
            long_capacity: bits <= 64,
            long_size,
            long_mask: long_size.wrapping_sub(1),
        }
    }

    /// The capacity, always greater than zero.
    pub fn as_big(&self) -> &BigUint {
        &self.big_size
    }

    /// The number of bits needed to store any value of this size.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn is_power_of_two(&self) -> bool {
        self.power_of_two
    }

    pub fn is_int_sized(&self) -> bool {
        self.int_sized
    }

    pub fn is_int_capacity(&self) -> bool {
        self.int_capacity
    }

    pub fn is_long_sized(&self) -> bool {
        self.long_sized
    }

    pub fn is_long_capacity(&self) -> bool {
        self.long_capacity
    }

    /// The capacity as a `u32`; fails unless int-sized.
    pub fn as_u32(&self) -> Result<u32, HashError> {
        if !self.int_sized {
            return Err(HashError::overflow(&self.big_size, 32));
        }
        Ok(self.int_size)
    }

    /// The capacity as a `u64`; fails unless long-sized.
    pub fn as_u64(&self) -> Result<u64, HashError> {
        if !self.long_sized {
            return Err(HashError::overflow(&self.big_size, 64));
        }
        Ok(self.long_size)
    }

    /// The bit mask selecting values of this size from an int.
    pub fn int_mask(&self) -> Result<u32, HashError> {
        if !(self.power_of_two && self.int_capacity) {
            return Err(HashError::UnsupportedOperation("int mask of a size that is not an int power of two"));
        }
        Ok(self.int_mask)
    }

    /// The bit mask selecting values of this size from a long.
    pub fn long_mask(&self) -> Result<u64, HashError> {
        if !(self.power_of_two && self.long_capacity) {
            return Err(HashError::UnsupportedOperation("long mask of a size that is not a long power of two"));
        }
        Ok(self.long_mask)
    }

    /// Folds `value` into `[0, size)`.
    ///
    /// When the size exceeds int capacity no int can leave the range, so the
    /// value is returned unchanged and callers wanting a folded value must use
    /// a wider view.
    #[inline]
    pub fn map_int(&self, value: u32) -> u32 {
        if !self.int_capacity {
            return value;
        }
        if self.power_of_two {
            return value & self.int_mask;
        }
        // not a power of two with at most 32 bits, so int_size is the exact capacity
        value % self.int_size
    }

    /// Folds `value` into `[0, size)`; the long analogue of [`map_int`](Self::map_int).
    #[inline]
    pub fn map_long(&self, value: u64) -> u64 {
        if !self.long_capacity {
            return value;
        }
        if self.power_of_two {
            return value & self.long_mask;
        }
        value % self.long_size
    }

    /// Folds `value` into `[0, size)`. Exact for every size.
    pub fn map_big(&self, value: &BigUint) -> BigUint {
        if self.power_of_two {
            value & &*self.mask
        } else {
            value % &*self.big_size
        }
    }
}

/// The low 32 bits of `value`.
pub(crate) fn low_u32(value: &BigUint) -> u32 {
    value.iter_u32_digits().next().unwrap_or(0)
}

/// The low 64 bits of `value`.
pub(crate) fn low_u64(value: &BigUint) -> u64 {
    value.iter_u64_digits().next().unwrap_or(0)
}

impl PartialEq for HashSize {
    fn eq(&self, other: &Self) -> bool {
        self.big_size == other.big_size
    }
}

impl Eq for HashSize {}

impl PartialOrd for HashSize {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HashSize {
    fn cmp(&self, other: &Self) -> Ordering {
        self.big_size.cmp(&other.big_size)
    }
}

impl Hash for HashSize {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.big_size.hash(state);
    }
}

impl fmt::Display for HashSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.big_size)
    }
}

impl TryFrom<u64> for HashSize {
    type Error = HashError;

    fn try_from(size: u64) -> Result<Self, Self::Error> {
        Self::from_u64(size)
    }
}

impl TryFrom<BigUint> for HashSize {
    type Error = HashError;

    fn try_from(size: BigUint) -> Result<Self, Self::Error> {
        Self::from_big(size)
    }
}

// used by the tests to check native folding against exact arithmetic
#[cfg(test)]
pub(crate) fn reference_mod(value: u64, size: &HashSize) -> u64 {
    use num_traits::ToPrimitive;
    (BigUint::from(value) % size.as_big())
        .to_u64()
        .unwrap_or_else(|| panic!("{} mod {} exceeds 64 bits", value, size))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pow2(bits: u32) -> HashSize {
        HashSize::from_big(BigUint::one() << bits).unwrap()
    }

    fn pow2_plus(bits: u32, extra: u32) -> HashSize {
        HashSize::from_big((BigUint::one() << bits) + extra).unwrap()
    }

    #[test]
    fn test_rejects_empty_sizes() {
        assert!(matches!(HashSize::from_u32(0), Err(HashError::InvalidArgument(_))));
        assert!(matches!(HashSize::from_u64(0), Err(HashError::InvalidArgument(_))));
        assert!(matches!(HashSize::from_big(BigUint::zero()), Err(HashError::InvalidArgument(_))));
        assert!(matches!(HashSize::from_byte_length(0), Err(HashError::InvalidArgument(_))));
        assert!(matches!(HashSize::from_bit_length(0), Err(HashError::InvalidArgument(_))));
    }

    #[test]
    fn test_canonical_sizes() {
        assert_eq!(HashSize::from_byte_length(1).unwrap(), *HashSize::byte_size());
        assert_eq!(HashSize::from_byte_length(2).unwrap(), *HashSize::short_size());
        assert_eq!(HashSize::from_bit_length(32).unwrap(), *HashSize::int_size());
        assert_eq!(HashSize::from_bit_length(64).unwrap(), *HashSize::long_size());
        assert_eq!(HashSize::from_byte_length(16).unwrap(), pow2(128));
        assert_eq!(HashSize::int_size().bits(), 32);
        assert_eq!(HashSize::long_size().to_string(), "18446744073709551616");
        assert!(std::ptr::eq(HashSize::int_size(), HashSize::int_size()));
    }

    #[test]
    fn test_length_constructors_share_canonical_capacity() {
        let int = HashSize::from_bit_length(32).unwrap();
        assert!(Arc::ptr_eq(&int.big_size, &HashSize::int_size().big_size));
        assert!(Arc::ptr_eq(&int.mask, &HashSize::int_size().mask));
        let long = HashSize::from_byte_length(8).unwrap();
        assert!(Arc::ptr_eq(&long.big_size, &HashSize::long_size().big_size));
        let wide = pow2(100);
        let copy = wide.clone();
        assert!(Arc::ptr_eq(&wide.big_size, &copy.big_size));
    }

    #[test]
    fn test_bits() {
        assert_eq!(HashSize::from_u32(1).unwrap().bits(), 0);
        assert_eq!(HashSize::from_u32(2).unwrap().bits(), 1);
        assert_eq!(HashSize::from_u32(3).unwrap().bits(), 2);
        assert_eq!(HashSize::from_u32(1000).unwrap().bits(), 10);
        assert_eq!(HashSize::from_u32(1024).unwrap().bits(), 10);
        assert_eq!(HashSize::from_u32(1025).unwrap().bits(), 11);
        assert_eq!(pow2_plus(64, 1).bits(), 65);
    }

    #[test]
    fn test_boundary_classification() {
        let s = pow2(31);
        assert!(s.is_int_sized() && s.is_int_capacity());
        assert!(s.is_long_sized() && s.is_long_capacity());
        assert_eq!(s.as_u32(), Ok(1 << 31));

        let s = pow2(32);
        assert!(!s.is_int_sized() && s.is_int_capacity());
        assert!(s.is_long_sized() && s.is_long_capacity());
        assert!(matches!(s.as_u32(), Err(HashError::ArithmeticOverflow { bits: 32, .. })));
        assert_eq!(s.as_u64(), Ok(1 << 32));

        let s = pow2_plus(32, 1);
        assert!(!s.is_int_sized() && !s.is_int_capacity());
        assert!(s.is_long_sized() && s.is_long_capacity());

        let s = pow2(63);
        assert!(!s.is_int_capacity());
        assert!(s.is_long_sized() && s.is_long_capacity());

        let s = pow2(64);
        assert!(!s.is_long_sized() && s.is_long_capacity());
        assert!(s.as_u64().is_err());

        let s = pow2_plus(64, 1);
        assert!(!s.is_long_sized() && !s.is_long_capacity());
    }

    #[test]
    fn test_masks() {
        assert_eq!(HashSize::from_u32(256).unwrap().int_mask(), Ok(0xff));
        assert_eq!(pow2(32).int_mask(), Ok(u32::MAX));
        assert_eq!(pow2(64).long_mask(), Ok(u64::MAX));
        assert_eq!(HashSize::from_u32(1).unwrap().long_mask(), Ok(0));
        assert!(matches!(
            HashSize::from_u32(1000).unwrap().int_mask(),
            Err(HashError::UnsupportedOperation(_))
        ));
        assert!(pow2(40).int_mask().is_err());
        assert_eq!(pow2(40).long_mask(), Ok((1 << 40) - 1));
    }

    #[test]
    fn test_map_int_matches_reference() {
        let values = [0u32, 1, 2, 999, 1000, 0x7fff_ffff, 0x8000_0000, 0xdead_beef, u32::MAX - 1, u32::MAX];
        let sizes = [
            HashSize::from_u32(1).unwrap(),
            HashSize::from_u32(3).unwrap(),
            HashSize::from_u32(1000).unwrap(),
            HashSize::from_u32(65539).unwrap(),
            pow2(31),
            pow2_plus(31, 1),
            HashSize::from_u32(u32::MAX).unwrap(),
            pow2(32),
        ];
        for size in &sizes {
            for &v in &values {
                let mapped = size.map_int(v);
                assert_eq!(mapped as u64, reference_mod(v as u64, size), "{} mod {}", v, size);
            }
        }
    }

    #[test]
    fn test_map_int_beyond_int_capacity_is_unchanged() {
        let size = pow2_plus(32, 1);
        for v in [0u32, 17, u32::MAX] {
            assert_eq!(size.map_int(v), v);
        }
    }

    #[test]
    fn test_map_long_matches_reference() {
        let values = [
            0u64,
            1,
            (1 << 32) - 1,
            1 << 32,
            (1 << 32) + 1,
            i64::MAX as u64,
            1 << 63,
            0xdead_beef_cafe_babe,
            u64::MAX,
        ];
        let sizes = [
            HashSize::from_u32(1000).unwrap(),
            pow2(31),
            pow2(32),
            pow2_plus(32, 1),
            HashSize::from_u64(0x51de_5add_1e).unwrap(),
            pow2(63),
            pow2_plus(63, 1),
            HashSize::from_u64(u64::MAX).unwrap(),
            pow2(64),
        ];
        for size in &sizes {
            for &v in &values {
                assert_eq!(size.map_long(v), reference_mod(v, size), "{} mod {}", v, size);
            }
        }
        let size = pow2_plus(64, 1);
        assert_eq!(size.map_long(u64::MAX), u64::MAX);
    }

    #[test]
    fn test_map_big() {
        let size = pow2_plus(64, 3);
        let value = BigUint::one() << 70u32;
        assert_eq!(size.map_big(&value), &value % size.as_big());
        let size = pow2(100);
        let value = (BigUint::one() << 130u32) + 12345u32;
        assert_eq!(size.map_big(&value), BigUint::from(12345u32));
        let one = HashSize::from_u32(1).unwrap();
        assert!(one.map_big(&value).is_zero());
    }

    #[test]
    fn test_ordering() {
        let small = HashSize::from_u32(10).unwrap();
        let large = pow2(70);
        assert!(small < large);
        assert!(HashSize::int_size() < HashSize::long_size());
        assert_eq!(HashSize::from_u64(1 << 32).unwrap(), *HashSize::int_size());
        assert_eq!(HashSize::try_from(256u64).unwrap(), *HashSize::byte_size());
    }
}
