use std::sync::Arc;

use num_bigint::BigUint;

use crate::choose::{Choose, CombinationIndex};
use crate::code::HashCode;
use crate::distinct::DistinctHasher;
use crate::double_hash::{IntsHasher, LongsHasher};
use crate::error::HashError;
use crate::size::HashSize;
use crate::sized;

/// The quantity reported by hashers that can produce any number of values.
pub const UNBOUNDED: usize = usize::MAX;

/// Produces hash codes for values of type `T`.
///
/// Hashers are immutable once built, so one hasher may be used from many
/// threads at once; the codes it returns are not shared.
pub trait Hasher<T: ?Sized>: Send + Sync {
    /// The size of the hash values this hasher produces.
    fn size(&self) -> &HashSize;

    /// The number of hash values produced per hashing, [`UNBOUNDED`] for
    /// hashers that never run out.
    fn quantity(&self) -> usize {
        1
    }

    /// Hashes `value`.
    fn hash(&self, value: &T) -> Result<Box<dyn HashCode + '_>, HashError>;

    /// The first hash value for `value` as a `u32`.
    fn int_hash_value(&self, value: &T) -> Result<u32, HashError> {
        self.hash(value)?.int_value()
    }

    /// The first hash value for `value` as a `u64`.
    fn long_hash_value(&self, value: &T) -> Result<u64, HashError> {
        self.hash(value)?.long_value()
    }

    /// The first hash value for `value` as a big integer.
    fn big_hash_value(&self, value: &T) -> Result<BigUint, HashError> {
        self.hash(value)?.big_value()
    }
}

/// A shared hasher; the form in which hashers are derived from one another.
pub type ArcHasher<T> = Arc<dyn Hasher<T>>;

/// Shares `hasher` so that new hashers can be derived from it.
pub fn shared<T, H>(hasher: H) -> ArcHasher<T>
where
    T: ?Sized,
    H: Hasher<T> + 'static,
{
    Arc::new(hasher)
}

impl<T: ?Sized, H: Hasher<T> + ?Sized> Hasher<T> for Arc<H> {
    fn size(&self) -> &HashSize {
        (**self).size()
    }

    fn quantity(&self) -> usize {
        (**self).quantity()
    }

    fn hash(&self, value: &T) -> Result<Box<dyn HashCode + '_>, HashError> {
        (**self).hash(value)
    }

    fn int_hash_value(&self, value: &T) -> Result<u32, HashError> {
        (**self).int_hash_value(value)
    }

    fn long_hash_value(&self, value: &T) -> Result<u64, HashError> {
        (**self).long_hash_value(value)
    }

    fn big_hash_value(&self, value: &T) -> Result<BigUint, HashError> {
        (**self).big_hash_value(value)
    }
}

/// Derives new hashers from a shared one. The original is never altered.
pub trait HasherExt<T: ?Sized> {
    /// A hasher whose values are folded into `new_size`.
    ///
    /// Values are only folded when `new_size` is smaller than the current
    /// size; resizing upwards keeps every value as it is. Unless `new_size`
    /// divides the current size the folded values are not evenly
    /// distributed. Resizing to the current size returns this same hasher.
    fn sized(&self, new_size: &HashSize) -> ArcHasher<T>;

    /// A hasher producing `quantity` distinct values in `[0, size)`.
    fn distinct(&self, quantity: usize, size: &HashSize) -> Result<ArcHasher<T>, HashError>;

    /// Like [`distinct`](Self::distinct), decoding with the supplied
    /// combination index.
    fn distinct_with<C>(&self, decoder: C) -> Result<ArcHasher<T>, HashError>
    where
        C: CombinationIndex + 'static;

    /// An unbounded stream of 32-bit values derived from each hash.
    fn ints(&self) -> ArcHasher<T>;

    /// An unbounded stream of 64-bit values derived from each hash.
    fn longs(&self) -> ArcHasher<T>;
}

impl<T: ?Sized + 'static> HasherExt<T> for ArcHasher<T> {
    fn sized(&self, new_size: &HashSize) -> ArcHasher<T> {
        sized::sized(self, new_size)
    }

    fn distinct(&self, quantity: usize, size: &HashSize) -> Result<ArcHasher<T>, HashError> {
        if !size.is_int_sized() {
            return Err(HashError::invalid(format!("size {} not int sized", size)));
        }
        let n = size.as_u32()? as usize;
        if quantity < 1 {
            return Err(HashError::invalid("non-positive quantity"));
        }
        if quantity > n {
            return Err(HashError::invalid(format!("quantity {} exceeds size {}", quantity, n)));
        }
        self.distinct_with(Choose::new(n, quantity)?)
    }

    fn distinct_with<C>(&self, decoder: C) -> Result<ArcHasher<T>, HashError>
    where
        C: CombinationIndex + 'static,
    {
        Ok(Arc::new(DistinctHasher::new(self, decoder)?))
    }

    fn ints(&self) -> ArcHasher<T> {
        Arc::new(IntsHasher::new(self))
    }

    fn longs(&self) -> ArcHasher<T> {
        Arc::new(LongsHasher::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{IntHasher, StandardHasher};

    #[test]
    fn test_single_value_accessors() {
        let hasher: ArcHasher<u32> = shared(IntHasher::new(|x: &u32| x.wrapping_mul(3)));
        assert_eq!(hasher.quantity(), 1);
        assert_eq!(hasher.size(), HashSize::int_size());
        assert_eq!(hasher.int_hash_value(&5), Ok(15));
        assert_eq!(hasher.long_hash_value(&5), Ok(15));
        assert_eq!(hasher.big_hash_value(&5), Ok(BigUint::from(15u32)));
    }

    #[test]
    fn test_cross_view_consistency() {
        let hasher: ArcHasher<str> = shared(StandardHasher::new());
        for word in ["ballynamoney", "lane", "pear tree", ""] {
            let long = hasher.long_hash_value(word).unwrap();
            let int = hasher.int_hash_value(word).unwrap();
            let big = hasher.big_hash_value(word).unwrap();
            assert_eq!(crate::size::low_u64(&big), long);
            assert_eq!(crate::size::low_u32(&big), int);
            assert_eq!(hasher.hash(word).unwrap().long_value(), Ok(long));
        }
    }

    #[test]
    fn test_distinct_validation() {
        let hasher: ArcHasher<u32> = shared(IntHasher::new(|x: &u32| *x));
        let size = HashSize::from_u32(10).unwrap();
        assert!(matches!(hasher.distinct(0, &size), Err(HashError::InvalidArgument(_))));
        assert!(matches!(hasher.distinct(11, &size), Err(HashError::InvalidArgument(_))));
        assert!(matches!(
            hasher.distinct(2, HashSize::int_size()),
            Err(HashError::InvalidArgument(_))
        ));
        let huge = HashSize::from_u32(1 << 31).unwrap();
        assert!(matches!(hasher.distinct(1 << 30, &huge), Err(HashError::InvalidArgument(_))));
        let distinct = hasher.distinct(10, &size).unwrap();
        assert_eq!(distinct.quantity(), 10);
        assert_eq!(distinct.size(), &size);
    }

    #[test]
    fn test_derived_hashers_leave_original_untouched() {
        let hasher: ArcHasher<u32> = shared(IntHasher::new(|x: &u32| *x));
        let _ints = hasher.ints();
        let _longs = hasher.longs();
        let _small = hasher.sized(&HashSize::from_u32(7).unwrap());
        assert_eq!(hasher.size(), HashSize::int_size());
        assert_eq!(hasher.int_hash_value(&123_456), Ok(123_456));
    }
}
