//! The seeded universal hash family shared by every signature.
//!
//! Hash function `i` is `h_i(x) = ((a_i * x + b_i) mod P) mod N`. Coefficients are drawn once
//! from a seeded generator, so the same seed always yields the same family and index `i` means
//! the same function for every document.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};

/// Size of the hash output domain, `N = 2^32`.
pub const DEFAULT_DOMAIN: u64 = 1 << 32;

/// Smallest prime greater than [`DEFAULT_DOMAIN`].
pub const DEFAULT_PRIME: u64 = 4_294_967_311;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 42;

/// Largest accepted modulus. Primality is checked by trial division, which stays under
/// 2^17 steps below this bound.
pub const MAX_PRIME: u64 = 1 << 33;

/// `((a * x + b) mod p) mod n`, 2-universal for `x < p`.
///
/// Intermediates are widened to `u128`, so any 64-bit inputs are safe.
#[inline]
pub fn universal_hash(x: u64, a: u64, b: u64, p: u64, n: u64) -> u64 {
    let v = (a as u128 * x as u128 + b as u128) % p as u128;
    (v % n as u128) as u64
}

/// Smallest prime strictly greater than `n`.
///
/// Trial division: intended for moduli up to [`MAX_PRIME`].
pub fn next_prime(n: u64) -> u64 {
    let mut c = n.saturating_add(1).max(2);
    while !is_prime(c) {
        c += 1;
    }
    c
}

fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3u64;
    while d.saturating_mul(d) <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

/// An immutable set of `(a, b)` coefficient pairs plus the shared modulus and domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashFunctionFamily {
    coeffs: Vec<(u64, u64)>,
    prime: u64,
    domain: u64,
    seed: u64,
}

impl HashFunctionFamily {
    /// Generate `num_hashes` functions over the default domain and prime.
    pub fn new(num_hashes: usize, seed: u64) -> Result<Self> {
        Self::with_params(num_hashes, DEFAULT_DOMAIN, DEFAULT_PRIME, seed)
    }

    /// Generate `num_hashes` functions with `a ∈ [1, prime]`, `b ∈ [0, prime]`.
    pub fn with_params(num_hashes: usize, domain: u64, prime: u64, seed: u64) -> Result<Self> {
        if num_hashes == 0 {
            return Err(Error::InvalidParam("num_hashes must be >= 1"));
        }
        if domain == 0 {
            return Err(Error::InvalidParam("domain must be >= 1"));
        }
        if prime > MAX_PRIME {
            return Err(Error::InvalidParam("prime must be <= 2^33"));
        }
        if prime <= domain || !is_prime(prime) {
            return Err(Error::InvalidParam("prime must be a prime greater than domain"));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let coeffs = (0..num_hashes)
            .map(|_| (rng.random_range(1..=prime), rng.random_range(0..=prime)))
            .collect();
        Ok(Self {
            coeffs,
            prime,
            domain,
            seed,
        })
    }

    /// Evaluate hash function `i` on `x`.
    ///
    /// Panics if `i >= self.len()`.
    #[inline]
    pub fn hash(&self, i: usize, x: u64) -> u64 {
        let (a, b) = self.coeffs[i];
        universal_hash(x, a, b, self.prime, self.domain)
    }

    /// The coefficient pairs, in hash-function order.
    pub fn coeffs(&self) -> &[(u64, u64)] {
        &self.coeffs
    }

    /// Number of hash functions.
    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    /// Always false for a constructed family.
    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// The modulus `P`.
    pub fn prime(&self) -> u64 {
        self.prime
    }

    /// The output domain size `N`.
    pub fn domain(&self) -> u64 {
        self.domain
    }

    /// Seed the coefficients were drawn from.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}
