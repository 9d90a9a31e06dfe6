//! Unbounded streams of hash values derived from a single hash by double
//! hashing: the seed is spread into a start value `h` and a probe step `p`,
//! and the `i`-th value is `h ^ (i * p)`.
//!
//! The 32-bit stream spreads with a variant of the single-word Wang/Jenkins
//! hash (after Benjamin Manes' bloom filter for ConcurrentLinkedHashMap), the
//! 64-bit stream with the mix function of fast-hash. The spreading constants
//! and shifts are bit-exact. The 64-bit stream is seeded from the whole long
//! hash value, so its values differ from streams seeded with an int.

use log::debug;
use num_bigint::BigUint;

use crate::code::HashCode;
use crate::error::HashError;
use crate::hasher::{ArcHasher, Hasher, HasherExt, UNBOUNDED};
use crate::size::HashSize;

#[inline]
fn spread_int(mut h: u32) -> u32 {
    h = h.wrapping_add((h << 15) ^ 0xffff_cd7d);
    h ^= h >> 10;
    h = h.wrapping_add(h << 3);
    h ^= h >> 6;
    h = h.wrapping_add((h << 2).wrapping_add(h << 14));
    h ^ (h >> 16)
}

#[inline]
fn spread_long(mut h: u64) -> u64 {
    h ^= h >> 23;
    h = h.wrapping_mul(0x2127_599b_f432_5c37);
    h ^ (h >> 47)
}

/// Hashes into an endless stream of 32-bit values.
pub(crate) struct IntsHasher<T: ?Sized> {
    hasher: ArcHasher<T>,
}

impl<T: ?Sized + 'static> IntsHasher<T> {
    pub(crate) fn new(hasher: &ArcHasher<T>) -> Self {
        debug!("deriving 32-bit double hash stream from hasher of size {}", hasher.size());
        Self {
            hasher: hasher.sized(HashSize::int_size()),
        }
    }
}

impl<T: ?Sized> Hasher<T> for IntsHasher<T> {
    fn size(&self) -> &HashSize {
        HashSize::int_size()
    }

    fn quantity(&self) -> usize {
        UNBOUNDED
    }

    fn hash(&self, value: &T) -> Result<Box<dyn HashCode + '_>, HashError> {
        let seed = self.hasher.int_hash_value(value)?;
        Ok(Box::new(IntProbe::new(seed)))
    }
}

/// Hashes into an endless stream of 64-bit values.
pub(crate) struct LongsHasher<T: ?Sized> {
    hasher: ArcHasher<T>,
}

impl<T: ?Sized + 'static> LongsHasher<T> {
    pub(crate) fn new(hasher: &ArcHasher<T>) -> Self {
        debug!("deriving 64-bit double hash stream from hasher of size {}", hasher.size());
        Self {
            hasher: hasher.sized(HashSize::long_size()),
        }
    }
}

impl<T: ?Sized> Hasher<T> for LongsHasher<T> {
    fn size(&self) -> &HashSize {
        HashSize::long_size()
    }

    fn quantity(&self) -> usize {
        UNBOUNDED
    }

    fn hash(&self, value: &T) -> Result<Box<dyn HashCode + '_>, HashError> {
        let seed = self.hasher.long_hash_value(value)?;
        Ok(Box::new(LongProbe::new(seed)))
    }
}

/// The 32-bit stream for one seed.
#[derive(Clone, Debug)]
pub(crate) struct IntProbe {
    h: u32,
    probe: u32,
    i: u32,
}

impl IntProbe {
    pub(crate) fn new(seed: u32) -> Self {
        // the probe is one more than the magnitude of the seed read as signed
        let signed = seed as i32;
        let probe = if signed == i32::MIN {
            1
        } else {
            signed.unsigned_abs().wrapping_add(1)
        };
        Self {
            h: spread_int(seed),
            probe,
            i: 0,
        }
    }

    #[inline]
    fn next_value(&mut self) -> u32 {
        let value = self.h ^ self.i.wrapping_mul(self.probe);
        self.i = self.i.wrapping_add(1);
        value
    }
}

impl HashCode for IntProbe {
    fn int_value(&mut self) -> Result<u32, HashError> {
        Ok(self.next_value())
    }

    fn long_value(&mut self) -> Result<u64, HashError> {
        Ok(u64::from(self.next_value()))
    }

    fn big_value(&mut self) -> Result<BigUint, HashError> {
        Ok(BigUint::from(self.next_value()))
    }

    fn has_next(&self) -> bool {
        true
    }
}

/// The 64-bit stream for one seed.
///
/// Unlike other codes, an int view of a value wider than 32 bits is an
/// [`HashError::ArithmeticOverflow`] rather than a truncation.
#[derive(Clone, Debug)]
pub(crate) struct LongProbe {
    h: u64,
    probe: u64,
    i: u64,
}

impl LongProbe {
    pub(crate) fn new(seed: u64) -> Self {
        let signed = seed as i64;
        let probe = if signed == i64::MIN {
            1
        } else {
            signed.unsigned_abs().wrapping_add(1)
        };
        Self {
            h: spread_long(seed),
            probe,
            i: 0,
        }
    }

    #[inline]
    fn next_value(&mut self) -> u64 {
        let value = self.h ^ self.i.wrapping_mul(self.probe);
        self.i = self.i.wrapping_add(1);
        value
    }
}

impl HashCode for LongProbe {
    fn int_value(&mut self) -> Result<u32, HashError> {
        let value = self.next_value();
        u32::try_from(value).map_err(|_| HashError::overflow(value, 32))
    }

    fn long_value(&mut self) -> Result<u64, HashError> {
        Ok(self.next_value())
    }

    fn big_value(&mut self) -> Result<BigUint, HashError> {
        Ok(BigUint::from(self.next_value()))
    }

    fn has_next(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::SingleHashCode;
    use crate::hasher::shared;
    use crate::source::{IntHasher, StandardHasher};
    use std::collections::HashSet;

    fn identity() -> ArcHasher<u32> {
        shared(IntHasher::new(|x: &u32| *x))
    }

    /// Hashes a long to itself.
    struct LongIdentity;

    impl Hasher<u64> for LongIdentity {
        fn size(&self) -> &HashSize {
            HashSize::long_size()
        }

        fn hash(&self, value: &u64) -> Result<Box<dyn HashCode + '_>, HashError> {
            Ok(Box::new(SingleHashCode::from_u64(*value)))
        }
    }

    #[test]
    fn test_spread_reference_values() {
        assert_eq!(spread_int(0), 0xa78b_aef2);
        assert_eq!(spread_int(1), 0x4b43_9d4a);
        assert_eq!(spread_int(0xdead_beef), 0x6a3d_2c97);
        assert_eq!(spread_long(0), 0);
        assert_eq!(spread_long(1), 0x2127_599b_f432_1e79);
        assert_eq!(spread_long(1 << 63), 0xb25c_3700_0001_64b8);
    }

    #[test]
    fn test_int_stream_values() {
        let ints = identity().ints();
        let mut code = ints.hash(&5).unwrap();
        assert!(code.has_next());
        assert_eq!(code.int_values(4), Ok(vec![0xc10a_0b66, 0xc10a_0b60, 0xc10a_0b6a, 0xc10a_0b74]));
        assert_eq!(code.long_value(), Ok(0xc10a_0b66 ^ (4 * 6)));
        assert!(code.has_next());
    }

    #[test]
    fn test_long_stream_values() {
        let longs = identity().longs();
        let mut code = longs.hash(&5).unwrap();
        assert!(code.has_next());
        assert_eq!(
            code.long_values(4),
            Ok(vec![
                0xa5c4_c00b_c4fa_869a,
                0xa5c4_c00b_c4fa_869c,
                0xa5c4_c00b_c4fa_8696,
                0xa5c4_c00b_c4fa_8688,
            ])
        );

        // a seed read as -2 steps by 3
        let hasher: ArcHasher<u64> = shared(LongIdentity);
        let longs = hasher.longs();
        let values = longs.hash(&0xffff_ffff_ffff_fffe).unwrap().long_values(4).unwrap();
        assert_eq!(
            values,
            vec![
                0xbc6e_eb9b_f433_24ea,
                0xbc6e_eb9b_f433_24e9,
                0xbc6e_eb9b_f433_24ec,
                0xbc6e_eb9b_f433_24e3,
            ]
        );
    }

    #[test]
    fn test_long_odd_step_never_repeats() {
        let hasher: ArcHasher<u64> = shared(LongIdentity);
        let longs = hasher.longs();
        for i in 0..100u64 {
            // even seeds, small and spread over the full width, give odd steps
            for seed in [2 * i, i.wrapping_mul(0x9e37_79b9_7f4a_7c16)] {
                let values = longs.hash(&seed).unwrap().long_values(4096).unwrap();
                let unique: HashSet<u64> = values.iter().copied().collect();
                assert_eq!(unique.len(), values.len(), "repeat for seed {:#x}", seed);
            }
        }
    }

    #[test]
    fn test_min_seed_probes_by_one() {
        let mut probe = IntProbe::new(0x8000_0000);
        let h = spread_int(0x8000_0000);
        for i in 0..8 {
            assert_eq!(probe.int_value(), Ok(h ^ i));
        }
        let mut probe = LongProbe::new(1 << 63);
        let h = spread_long(1 << 63);
        for i in 0..8 {
            assert_eq!(probe.long_value(), Ok(h ^ i));
        }
    }

    #[test]
    fn test_stream_is_replayable() {
        let hasher: ArcHasher<str> = shared(StandardHasher::new());
        let ints = hasher.ints();
        let longs = hasher.longs();
        for word in ["hello", "world", "ballynamoney"] {
            let first = ints.hash(word).unwrap().int_values(64).unwrap();
            let second = ints.hash(word).unwrap().int_values(64).unwrap();
            assert_eq!(first, second);
            let first = longs.hash(word).unwrap().long_values(64).unwrap();
            let second = longs.hash(word).unwrap().long_values(64).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_odd_probe_never_repeats() {
        let hasher = identity();
        let ints = hasher.ints();
        let mut checked = 0;
        for seed in 0..200u32 {
            // seeds with an even magnitude give odd probes
            if seed % 2 != 0 {
                continue;
            }
            let values = ints.hash(&seed).unwrap().int_values(4096).unwrap();
            let unique: HashSet<u32> = values.iter().copied().collect();
            assert_eq!(unique.len(), values.len(), "repeat for seed {}", seed);
            checked += 1;
        }
        assert_eq!(checked, 100);
    }

    #[test]
    fn test_streams_diverge() {
        let ints = identity().ints();
        let a = ints.hash(&1).unwrap().int_values(16).unwrap();
        let b = ints.hash(&2).unwrap().int_values(16).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_long_stream_rejects_wide_int_views() {
        let mut probe = LongProbe::new(1);
        assert!(matches!(
            probe.int_value(),
            Err(HashError::ArithmeticOverflow { bits: 32, .. })
        ));
        let mut probe = LongProbe::new(0);
        assert_eq!(probe.int_value(), Ok(0));
        assert_eq!(probe.int_value(), Ok(1));
    }

    #[test]
    fn test_stream_sizes() {
        let hasher = identity();
        let ints = hasher.ints();
        let longs = hasher.longs();
        assert_eq!(ints.size(), HashSize::int_size());
        assert_eq!(longs.size(), HashSize::long_size());
        assert_eq!(ints.quantity(), UNBOUNDED);
        assert_eq!(longs.quantity(), UNBOUNDED);
        let indices = longs.sized(&HashSize::from_u32(1000).unwrap());
        let values = indices.hash(&42).unwrap().long_values(32).unwrap();
        assert!(values.iter().all(|&v| v < 1000));
    }
}
