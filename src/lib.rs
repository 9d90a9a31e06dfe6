//! Hashers whose values can be resized, spread into unbounded streams and
//! chosen as sets of distinct values.
//!
//! Every [`Hasher`] declares the [`HashSize`] of the values it produces and
//! how many values a single hashing yields. New hashers are derived from a
//! shared one through [`HasherExt`]:
//!
//! * [`sized`](HasherExt::sized) folds values into a smaller size, for
//!   example the number of buckets in a table;
//! * [`ints`](HasherExt::ints) and [`longs`](HasherExt::longs) turn one hash
//!   into an endless stream of values by double hashing, as needed by bloom
//!   filters and count-min sketches;
//! * [`distinct`](HasherExt::distinct) produces `k` different values below
//!   `n` by decoding a hash into a `k`-combination.
//!
//! ```
//! use hashsize::{shared, ArcHasher, HashCode, HashSize, Hasher, HasherExt, StandardHasher};
//!
//! let hasher: ArcHasher<str> = shared(StandardHasher::new());
//! let buckets = hasher.longs().sized(&HashSize::from_u32(1000)?);
//! let mut code = buckets.hash("pear tree")?;
//! let indices = code.long_values(4)?;
//! assert!(indices.iter().all(|&i| i < 1000));
//! # Ok::<(), hashsize::HashError>(())
//! ```

mod choose;
mod code;
mod distinct;
mod double_hash;
mod error;
mod hasher;
mod size;
mod sized;
mod source;

pub use choose::{Choose, CombinationIndex, MAX_COUNT_BITS};
pub use code::{HashCode, HashValue, SingleHashCode, ValuesHashCode};
pub use error::HashError;
pub use hasher::{shared, ArcHasher, Hasher, HasherExt, UNBOUNDED};
pub use size::HashSize;
pub use source::{DigestHasher, IntHasher, PrngHasher, StandardHasher};

pub use num_bigint::BigUint;
