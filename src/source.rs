//! Hashers that produce raw hash values from input values.
//!
//! These are the starting points for derivation: size them, stream them or
//! choose distinct values from them through [`HasherExt`](crate::HasherExt).

use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;

use ahash::RandomState;
use digest::Digest;
use log::debug;
use num_bigint::BigUint;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::code::{HashCode, SingleHashCode};
use crate::error::HashError;
use crate::hasher::{Hasher, UNBOUNDED};
use crate::size::{low_u64, HashSize};

/// Fixed seed
const SEED: RandomState = RandomState::with_seeds(
    0x355e438b4b1478c7_u64,
    0xd0e8453cd135b473_u64,
    0xf7b252066a57836a_u64,
    0xb8a829e3713c09bf_u64,
);

/// Hashes any [`Hash`] value to a single 64-bit value with a [`BuildHasher`].
///
/// The default build hasher is ahash with fixed seeds, so hash values are
/// stable from one run to the next.
#[derive(Clone, Debug)]
pub struct StandardHasher<S = RandomState> {
    build_hasher: S,
}

impl StandardHasher {
    pub fn new() -> Self {
        Self::with_hasher(SEED)
    }

    /// A stable hasher whose values depend on `seed`, for when several
    /// independent hash functions are needed.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_hasher(RandomState::with_seeds(seed, !seed, seed, !seed))
    }
}

impl Default for StandardHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: BuildHasher> StandardHasher<S> {
    pub fn with_hasher(build_hasher: S) -> Self {
        Self { build_hasher }
    }
}

impl<T, S> Hasher<T> for StandardHasher<S>
where
    T: Hash + ?Sized,
    S: BuildHasher + Send + Sync,
{
    fn size(&self) -> &HashSize {
        HashSize::long_size()
    }

    fn hash(&self, value: &T) -> Result<Box<dyn HashCode + '_>, HashError> {
        Ok(Box::new(SingleHashCode::from_u64(self.build_hasher.hash_one(value))))
    }

    fn long_hash_value(&self, value: &T) -> Result<u64, HashError> {
        Ok(self.build_hasher.hash_one(value))
    }
}

/// Hashes values to a single 32-bit value computed by a function.
pub struct IntHasher<F> {
    f: F,
}

impl<F> IntHasher<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<T, F> Hasher<T> for IntHasher<F>
where
    T: ?Sized,
    F: Fn(&T) -> u32 + Send + Sync,
{
    fn size(&self) -> &HashSize {
        HashSize::int_size()
    }

    fn hash(&self, value: &T) -> Result<Box<dyn HashCode + '_>, HashError> {
        Ok(Box::new(SingleHashCode::from_u32((self.f)(value))))
    }

    fn int_hash_value(&self, value: &T) -> Result<u32, HashError> {
        Ok((self.f)(value))
    }
}

/// Hashes byte strings to the whole output of a cryptographic digest, read
/// as a big-endian integer.
///
/// The size is that of the digest output, so for most digests the values
/// are wider than 64 bits; the int and long views are its low-order bits.
pub struct DigestHasher<D> {
    size: HashSize,
    _digest: PhantomData<fn() -> D>,
}

impl<D: Digest> DigestHasher<D> {
    pub fn new() -> Result<Self, HashError> {
        let size = HashSize::from_byte_length(<D as Digest>::output_size())?;
        debug!("hashing to digest output of {} bits", size.bits());
        Ok(Self {
            size,
            _digest: PhantomData,
        })
    }
}

impl<T, D> Hasher<T> for DigestHasher<D>
where
    T: AsRef<[u8]> + ?Sized,
    D: Digest,
{
    fn size(&self) -> &HashSize {
        &self.size
    }

    fn hash(&self, value: &T) -> Result<Box<dyn HashCode + '_>, HashError> {
        let output = D::digest(value.as_ref());
        Ok(Box::new(SingleHashCode::from_big(BigUint::from_bytes_be(&output))))
    }
}

/// How a [`PrngHasher`] draws values below its size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Strategy {
    /// Uniform in `[0, n)` for an int-sized `n`.
    Int(u32),
    FullInt,
    /// Uniform in `[0, n)` for `n` of at most 64 bits, not a power of two.
    Long(u64),
    /// The low bits of a random long.
    LongBits(u64),
    FullLong,
    /// A power of two beyond 64 bits: exactly `bits` random bits.
    BigBits(u32),
    /// Any other size: `bits` random bits folded into the size.
    Big(u32),
}

impl Strategy {
    fn of(size: &HashSize) -> Self {
        if size == HashSize::int_size() {
            Strategy::FullInt
        } else if let Ok(n) = size.as_u32() {
            Strategy::Int(n)
        } else if size == HashSize::long_size() {
            Strategy::FullLong
        } else if let Ok(mask) = size.long_mask() {
            Strategy::LongBits(mask)
        } else if size.is_long_capacity() {
            Strategy::Long(low_u64(size.as_big()))
        } else if size.is_power_of_two() {
            Strategy::BigBits(size.bits())
        } else {
            // the extra bits keep the bias of the fold small
            Strategy::Big(size.bits() + 16)
        }
    }
}

/// Hashes values to an unbounded stream of values drawn uniformly below a
/// size, from a pseudo random generator seeded by the value's hash.
///
/// A fresh generator is seeded for every hashing, so the stream for a value
/// is the same every time. The generator is not cryptographically secure.
#[derive(Clone, Debug)]
pub struct PrngHasher {
    size: HashSize,
    strategy: Strategy,
}

impl PrngHasher {
    pub fn new(size: HashSize) -> Self {
        let strategy = Strategy::of(&size);
        debug!("drawing pseudo random hash values below {} with {:?}", size, strategy);
        Self { size, strategy }
    }
}

impl<T: Hash + ?Sized> Hasher<T> for PrngHasher {
    fn size(&self) -> &HashSize {
        &self.size
    }

    fn quantity(&self) -> usize {
        UNBOUNDED
    }

    fn hash(&self, value: &T) -> Result<Box<dyn HashCode + '_>, HashError> {
        Ok(Box::new(PrngHashCode {
            rng: SmallRng::seed_from_u64(SEED.hash_one(value)),
            strategy: self.strategy,
            size: &self.size,
        }))
    }
}

struct PrngHashCode<'a> {
    rng: SmallRng,
    strategy: Strategy,
    size: &'a HashSize,
}

impl PrngHashCode<'_> {
    fn random_bits(&mut self, bits: u32) -> BigUint {
        let mut digits: Vec<u32> = (0..bits.div_ceil(32)).map(|_| self.rng.random()).collect();
        let spare = digits.len() as u32 * 32 - bits;
        if let Some(top) = digits.last_mut() {
            *top >>= spare;
        }
        BigUint::from_slice(&digits)
    }
}

impl HashCode for PrngHashCode<'_> {
    fn int_value(&mut self) -> Result<u32, HashError> {
        Ok(match self.strategy {
            Strategy::Int(n) => self.rng.random_range(0..n),
            Strategy::FullInt => self.rng.random(),
            _ => return self.long_value().map(|v| v as u32),
        })
    }

    fn long_value(&mut self) -> Result<u64, HashError> {
        Ok(match self.strategy {
            Strategy::Int(_) | Strategy::FullInt => return self.int_value().map(u64::from),
            Strategy::Long(n) => self.rng.random_range(0..n),
            Strategy::LongBits(mask) => self.rng.random::<u64>() & mask,
            Strategy::FullLong => self.rng.random(),
            Strategy::BigBits(_) | Strategy::Big(_) => return self.big_value().map(|v| low_u64(&v)),
        })
    }

    fn big_value(&mut self) -> Result<BigUint, HashError> {
        Ok(match self.strategy {
            Strategy::BigBits(bits) => self.random_bits(bits),
            Strategy::Big(bits) => {
                let value = self.random_bits(bits);
                self.size.map_big(&value)
            }
            _ => BigUint::from(self.long_value()?),
        })
    }

    fn has_next(&self) -> bool {
        true
    }
}
