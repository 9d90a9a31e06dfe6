//! Indexing of k-combinations.
//!
//! [`Choose`] numbers the `k`-element subsets of `0..n` with the
//! combinatorial number system: the subset `c_1 < c_2 < ... < c_k` has index
//! `C(c_1, 1) + C(c_2, 2) + ... + C(c_k, k)`, which enumerates subsets in
//! colexicographic order and covers `[0, C(n, k))` without gaps.

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::error::HashError;

/// A bijection between `[0, C(n, k))` and the ascending `k`-subsets of `0..n`.
#[cfg_attr(test, mockall::automock)]
pub trait CombinationIndex: Send + Sync {
    /// The number of elements chosen from.
    fn n(&self) -> usize;

    /// The number of elements in each combination.
    fn k(&self) -> usize;

    /// `C(n, k)`, the number of combinations.
    fn count(&self) -> BigUint;

    /// The combination at `index`, in ascending order.
    fn decode_big(&self, index: &BigUint) -> Result<Vec<usize>, HashError>;

    /// The combination at `index`, in ascending order.
    fn decode_u64(&self, index: u64) -> Result<Vec<usize>, HashError> {
        self.decode_big(&BigUint::from(index))
    }

    /// The index of an ascending combination.
    fn encode(&self, combination: &[usize]) -> Result<BigUint, HashError>;
}

/// `C(n, k)` in native arithmetic, or `None` if it exceeds `u64`.
fn binomial_u64(n: u64, k: u64) -> Option<u64> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut r: u128 = 1;
    for i in 0..k {
        // r is C(n, i) here, and every C(n, i) for i <= k is at most C(n, k)
        r = r * u128::from(n - i) / u128::from(i + 1);
        if r > u128::from(u64::MAX) {
            return None;
        }
    }
    Some(r as u64)
}

/// `C(n, k)`, or `None` once it needs more than `max_bits` bits. The work
/// done is bounded by `max_bits` rather than by `k`.
fn binomial_big_bounded(n: u64, k: u64, max_bits: u64) -> Option<BigUint> {
    if k > n {
        return Some(BigUint::zero());
    }
    let k = k.min(n - k);
    let mut r = BigUint::one();
    for i in 0..k {
        r = r * (n - i) / (i + 1);
        if r.bits() > max_bits {
            return None;
        }
    }
    Some(r)
}

fn binomial_big(n: u64, k: u64) -> BigUint {
    binomial_big_bounded(n, k, u64::MAX).unwrap_or_default()
}

/// The largest `c` in `[lo, hi]` with `fits(c)`, given that `fits(lo)` holds
/// and `fits` is monotone.
fn largest(mut lo: usize, mut hi: usize, fits: impl Fn(usize) -> bool) -> usize {
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if fits(mid) {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    lo
}

/// The widest number of combinations [`Choose`] accepts, in bits.
pub const MAX_COUNT_BITS: u64 = 4096;

/// The combinations of `k` elements chosen from `n`.
///
/// Decoding an index costs `O(k^2 log n)` binomial steps, so `C(n, k)` is
/// limited to [`MAX_COUNT_BITS`] bits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Choose {
    n: usize,
    k: usize,
    count: BigUint,
    long_count: Option<u64>,
}

impl Choose {
    pub fn new(n: usize, k: usize) -> Result<Self, HashError> {
        if k > n {
            return Err(HashError::invalid(format!("cannot choose {} from {}", k, n)));
        }
        let long_count = binomial_u64(n as u64, k as u64);
        let count = match long_count {
            Some(count) => BigUint::from(count),
            None => binomial_big_bounded(n as u64, k as u64, MAX_COUNT_BITS).ok_or_else(|| {
                HashError::invalid(format!(
                    "choosing {} from {} exceeds {} bits of combinations",
                    k, n, MAX_COUNT_BITS
                ))
            })?,
        };
        Ok(Self {
            n,
            k,
            count,
            long_count,
        })
    }

    fn check_combination(&self, combination: &[usize]) -> Result<(), HashError> {
        if combination.len() != self.k {
            return Err(HashError::invalid(format!(
                "combination has {} elements, expected {}",
                combination.len(),
                self.k
            )));
        }
        if combination.windows(2).any(|w| w[0] >= w[1]) {
            return Err(HashError::invalid("combination not strictly ascending"));
        }
        if combination.last().is_some_and(|&c| c >= self.n) {
            return Err(HashError::invalid(format!("combination element not less than {}", self.n)));
        }
        Ok(())
    }
}

impl CombinationIndex for Choose {
    fn n(&self) -> usize {
        self.n
    }

    fn k(&self) -> usize {
        self.k
    }

    fn count(&self) -> BigUint {
        self.count.clone()
    }

    fn decode_big(&self, index: &BigUint) -> Result<Vec<usize>, HashError> {
        if index >= &self.count {
            return Err(HashError::invalid(format!("index {} not less than {}", index, self.count)));
        }
        let mut remaining = index.clone();
        let mut combination = vec![0; self.k];
        let mut upper = self.n;
        for j in (1..=self.k).rev() {
            let c = largest(j - 1, upper - 1, |c| binomial_big(c as u64, j as u64) <= remaining);
            remaining -= binomial_big(c as u64, j as u64);
            combination[j - 1] = c;
            upper = c;
        }
        Ok(combination)
    }

    fn decode_u64(&self, index: u64) -> Result<Vec<usize>, HashError> {
        if self.long_count.is_some_and(|count| index >= count) {
            return Err(HashError::invalid(format!("index {} not less than {}", index, self.count)));
        }
        let mut remaining = index;
        let mut combination = vec![0; self.k];
        let mut upper = self.n;
        for j in (1..=self.k).rev() {
            let fits = |c: usize| binomial_u64(c as u64, j as u64).is_some_and(|b| b <= remaining);
            let c = largest(j - 1, upper - 1, fits);
            // c fits, so its binomial is known to be representable
            remaining -= binomial_u64(c as u64, j as u64).unwrap_or(0);
            combination[j - 1] = c;
            upper = c;
        }
        Ok(combination)
    }

    fn encode(&self, combination: &[usize]) -> Result<BigUint, HashError> {
        self.check_combination(combination)?;
        Ok(combination
            .iter()
            .enumerate()
            .map(|(i, &c)| binomial_big(c as u64, i as u64 + 1))
            .sum())
    }
}
