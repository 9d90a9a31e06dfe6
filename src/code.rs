//! The values produced by a single hashing.

use std::fmt;

use num_bigint::BigUint;

use crate::error::HashError;
use crate::size::{low_u32, low_u64};

/// The result of hashing one value.
///
/// A hash code yields one or more hash values, each readable as a `u32`, a
/// `u64` or a [`BigUint`]. Codes that hold several values advance on every
/// read, whichever view is requested; codes holding a single value return
/// it again on every read. Narrower views take the low-order bits of a
/// value unless the producing hasher documents otherwise.
///
/// Codes are created per hashing and are not meant to be shared.
pub trait HashCode {
    /// The next hash value as a big integer.
    fn big_value(&mut self) -> Result<BigUint, HashError>;

    /// The next hash value as a `u64`.
    fn long_value(&mut self) -> Result<u64, HashError> {
        self.big_value().map(|big| low_u64(&big))
    }

    /// The next hash value as a `u32`.
    fn int_value(&mut self) -> Result<u32, HashError> {
        self.big_value().map(|big| low_u32(&big))
    }

    /// Whether another read will produce a value.
    fn has_next(&self) -> bool;

    /// Reads `count` successive values as ints.
    fn int_values(&mut self, count: usize) -> Result<Vec<u32>, HashError> {
        (0..count).map(|_| self.int_value()).collect()
    }

    /// Reads `count` successive values as longs.
    fn long_values(&mut self, count: usize) -> Result<Vec<u64>, HashError> {
        (0..count).map(|_| self.long_value()).collect()
    }

    /// Reads `count` successive values as big integers.
    fn big_values(&mut self, count: usize) -> Result<Vec<BigUint>, HashError> {
        (0..count).map(|_| self.big_value()).collect()
    }
}

/// One hash value held at the precision it was produced in.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HashValue {
    Int(u32),
    Long(u64),
    Big(BigUint),
}

impl HashValue {
    pub fn int_value(&self) -> u32 {
        match self {
            HashValue::Int(v) => *v,
            HashValue::Long(v) => *v as u32,
            HashValue::Big(v) => low_u32(v),
        }
    }

    pub fn long_value(&self) -> u64 {
        match self {
            HashValue::Int(v) => u64::from(*v),
            HashValue::Long(v) => *v,
            HashValue::Big(v) => low_u64(v),
        }
    }

    pub fn big_value(&self) -> BigUint {
        match self {
            HashValue::Int(v) => BigUint::from(*v),
            HashValue::Long(v) => BigUint::from(*v),
            HashValue::Big(v) => v.clone(),
        }
    }
}

impl fmt::Display for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashValue::Int(v) => write!(f, "{}", v),
            HashValue::Long(v) => write!(f, "{}", v),
            HashValue::Big(v) => write!(f, "{}", v),
        }
    }
}

/// A code holding exactly one value; every read returns it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SingleHashCode {
    value: HashValue,
}

impl SingleHashCode {
    pub fn new(value: HashValue) -> Self {
        Self { value }
    }

    pub fn from_u32(value: u32) -> Self {
        Self::new(HashValue::Int(value))
    }

    pub fn from_u64(value: u64) -> Self {
        Self::new(HashValue::Long(value))
    }

    pub fn from_big(value: BigUint) -> Self {
        Self::new(HashValue::Big(value))
    }

    pub fn value(&self) -> &HashValue {
        &self.value
    }
}

impl HashCode for SingleHashCode {
    fn big_value(&mut self) -> Result<BigUint, HashError> {
        Ok(self.value.big_value())
    }

    fn long_value(&mut self) -> Result<u64, HashError> {
        Ok(self.value.long_value())
    }

    fn int_value(&mut self) -> Result<u32, HashError> {
        Ok(self.value.int_value())
    }

    fn has_next(&self) -> bool {
        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cursor {
    At(usize),
    Exhausted,
}

/// A code over a fixed list of values, read in order.
#[derive(Clone, Debug)]
pub struct ValuesHashCode {
    values: Vec<HashValue>,
    cursor: Cursor,
}

impl ValuesHashCode {
    pub fn new(values: Vec<HashValue>) -> Result<Self, HashError> {
        if values.is_empty() {
            return Err(HashError::invalid("no hash values"));
        }
        Ok(Self {
            values,
            cursor: Cursor::At(0),
        })
    }

    pub fn from_u32s(values: &[u32]) -> Result<Self, HashError> {
        Self::new(values.iter().copied().map(HashValue::Int).collect())
    }

    pub fn from_u64s(values: &[u64]) -> Result<Self, HashError> {
        Self::new(values.iter().copied().map(HashValue::Long).collect())
    }

    pub fn from_bigs(values: Vec<BigUint>) -> Result<Self, HashError> {
        Self::new(values.into_iter().map(HashValue::Big).collect())
    }

    fn next_value(&mut self) -> Result<&HashValue, HashError> {
        let Cursor::At(index) = self.cursor else {
            return Err(HashError::ExhaustedSequence);
        };
        self.cursor = if index + 1 < self.values.len() {
            Cursor::At(index + 1)
        } else {
            Cursor::Exhausted
        };
        Ok(&self.values[index])
    }
}

impl HashCode for ValuesHashCode {
    fn big_value(&mut self) -> Result<BigUint, HashError> {
        self.next_value().map(HashValue::big_value)
    }

    fn long_value(&mut self) -> Result<u64, HashError> {
        self.next_value().map(HashValue::long_value)
    }

    fn int_value(&mut self) -> Result<u32, HashError> {
        self.next_value().map(HashValue::int_value)
    }

    fn has_next(&self) -> bool {
        self.cursor != Cursor::Exhausted
    }
}
