use std::sync::Arc;

use log::debug;
use num_bigint::BigUint;

use crate::code::HashCode;
use crate::error::HashError;
use crate::hasher::{ArcHasher, Hasher};
use crate::size::{low_u32, low_u64, HashSize};

/// The native width at which a wrapped hasher's values are read and folded.
///
/// Chosen once from the *wrapped* hasher's size: the narrowest width with
/// capacity for every value it produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tier {
    Int,
    Long,
    Big,
}

impl Tier {
    fn of(size: &HashSize) -> Self {
        if size.is_int_capacity() {
            Tier::Int
        } else if size.is_long_capacity() {
            Tier::Long
        } else {
            Tier::Big
        }
    }
}

/// Resizes `hasher`, returning it unchanged when it already has `new_size`.
pub(crate) fn sized<T>(hasher: &ArcHasher<T>, new_size: &HashSize) -> ArcHasher<T>
where
    T: ?Sized + 'static,
{
    if hasher.size() == new_size {
        return Arc::clone(hasher);
    }
    Arc::new(SizedHasher::new(hasher, new_size))
}

/// A hasher whose values are those of another hasher folded into a new size.
pub(crate) struct SizedHasher<T: ?Sized> {
    hasher: ArcHasher<T>,
    new_size: HashSize,
    tier: Tier,
    smaller: bool,
}

impl<T: ?Sized> SizedHasher<T> {
    pub(crate) fn new(hasher: &ArcHasher<T>, new_size: &HashSize) -> Self {
        let old_size = hasher.size();
        let tier = Tier::of(old_size);
        let smaller = new_size < old_size;
        debug!(
            "resizing hasher from {} to {} at {:?} width ({})",
            old_size,
            new_size,
            tier,
            if smaller { "folding" } else { "unfolded" }
        );
        SizedHasher {
            hasher: Arc::clone(hasher),
            new_size: new_size.clone(),
            tier,
            smaller,
        }
    }
}

impl<T: ?Sized> Hasher<T> for SizedHasher<T> {
    fn size(&self) -> &HashSize {
        &self.new_size
    }

    fn quantity(&self) -> usize {
        self.hasher.quantity()
    }

    fn hash(&self, value: &T) -> Result<Box<dyn HashCode + '_>, HashError> {
        Ok(Box::new(SizedHashCode {
            code: self.hasher.hash(value)?,
            size: &self.new_size,
            tier: self.tier,
            smaller: self.smaller,
        }))
    }
}

struct SizedHashCode<'a> {
    code: Box<dyn HashCode + 'a>,
    size: &'a HashSize,
    tier: Tier,
    smaller: bool,
}

impl SizedHashCode<'_> {
    fn sized_int(&mut self) -> Result<u32, HashError> {
        let h = self.code.int_value()?;
        Ok(if self.smaller { self.size.map_int(h) } else { h })
    }

    fn sized_long(&mut self) -> Result<u64, HashError> {
        let h = self.code.long_value()?;
        Ok(if self.smaller { self.size.map_long(h) } else { h })
    }

    fn sized_big(&mut self) -> Result<BigUint, HashError> {
        let h = self.code.big_value()?;
        Ok(if self.smaller { self.size.map_big(&h) } else { h })
    }
}

impl HashCode for SizedHashCode<'_> {
    fn int_value(&mut self) -> Result<u32, HashError> {
        match self.tier {
            Tier::Int => self.sized_int(),
            Tier::Long => self.sized_long().map(|h| h as u32),
            Tier::Big => self.sized_big().map(|h| low_u32(&h)),
        }
    }

    fn long_value(&mut self) -> Result<u64, HashError> {
        match self.tier {
            Tier::Int | Tier::Long => self.sized_long(),
            Tier::Big => self.sized_big().map(|h| low_u64(&h)),
        }
    }

    fn big_value(&mut self) -> Result<BigUint, HashError> {
        self.sized_big()
    }

    fn has_next(&self) -> bool {
        self.code.has_next()
    }
}
