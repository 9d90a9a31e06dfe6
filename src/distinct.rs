use log::debug;

use crate::choose::CombinationIndex;
use crate::code::{HashCode, ValuesHashCode};
use crate::error::HashError;
use crate::hasher::{ArcHasher, Hasher, HasherExt};
use crate::size::HashSize;

/// Hashes to `k` distinct values below `n`.
///
/// Each hash is folded into `[0, C(n, k))` and the index is decoded into the
/// matching combination, so the values are distinct by construction and
/// come out in ascending order.
pub(crate) struct DistinctHasher<T: ?Sized, C> {
    size: HashSize,
    decoder: C,
    hasher: ArcHasher<T>,
    long_indices: bool,
}

impl<T, C> DistinctHasher<T, C>
where
    T: ?Sized + 'static,
    C: CombinationIndex,
{
    pub(crate) fn new(hasher: &ArcHasher<T>, decoder: C) -> Result<Self, HashError> {
        let (n, k) = (decoder.n(), decoder.k());
        if k < 1 {
            return Err(HashError::invalid("non-positive quantity"));
        }
        if k > n {
            return Err(HashError::invalid(format!("quantity {} exceeds size {}", k, n)));
        }
        let size = HashSize::from_u64(n as u64)?;
        if !size.is_int_sized() {
            return Err(HashError::invalid(format!("size {} not int sized", size)));
        }
        let choice_size = HashSize::from_big(decoder.count())?;
        debug!("choosing {} distinct values below {} from {} combinations", k, n, choice_size);
        Ok(Self {
            size,
            long_indices: choice_size.is_long_capacity(),
            hasher: hasher.sized(&choice_size),
            decoder,
        })
    }
}

impl<T, C> Hasher<T> for DistinctHasher<T, C>
where
    T: ?Sized,
    C: CombinationIndex,
{
    fn size(&self) -> &HashSize {
        &self.size
    }

    fn quantity(&self) -> usize {
        self.decoder.k()
    }

    fn hash(&self, value: &T) -> Result<Box<dyn HashCode + '_>, HashError> {
        let mut code = self.hasher.hash(value)?;
        let combination = if self.long_indices {
            self.decoder.decode_u64(code.long_value()?)?
        } else {
            self.decoder.decode_big(&code.big_value()?)?
        };
        // every element is below an int-sized n
        let values: Vec<u32> = combination.into_iter().map(|c| c as u32).collect();
        Ok(Box::new(ValuesHashCode::from_u32s(&values)?))
    }
}
