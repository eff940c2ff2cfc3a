//! MinHash signatures over shingle sets.
//!
//! For hash function \(h_i\), \(\text{sig}_i(S) = \min_{x \in S} h_i(x)\). Two sets agree at
//! position \(i\) with probability equal to their Jaccard similarity
//! \(J(A,B) = |A ∩ B| / |A ∪ B|\), which is what the banding stage relies on.

use crate::hash::{universal_hash, HashFunctionFamily};
use crate::shingle::ShingleSet;

/// Signature value used for every position when the shingle set is empty.
///
/// Outside every hash domain, so it never equals a real minimum.
pub const EMPTY_SENTINEL: u64 = u64::MAX;

/// Computes signatures with a borrowed hash family.
#[derive(Debug, Clone, Copy)]
pub struct MinHasher<'a> {
    family: &'a HashFunctionFamily,
}

impl<'a> MinHasher<'a> {
    /// Bind a minhasher to `family`.
    pub fn new(family: &'a HashFunctionFamily) -> Self {
        Self { family }
    }

    /// Signature length (number of hash functions).
    pub fn num_hashes(&self) -> usize {
        self.family.len()
    }

    /// Compute the signature of `shingles`.
    ///
    /// One pass over the set per hash function, keeping a scalar running minimum.
    pub fn signature(&self, shingles: &ShingleSet) -> MinHashSignature {
        let p = self.family.prime();
        let n = self.family.domain();
        let values = self
            .family
            .coeffs()
            .iter()
            .map(|&(a, b)| {
                let mut min = EMPTY_SENTINEL;
                for &s in shingles {
                    let h = universal_hash(s as u64, a, b, p, n);
                    if h < min {
                        min = h;
                    }
                }
                min
            })
            .collect();
        MinHashSignature { values }
    }
}

/// A MinHash signature (fingerprint) of a shingle set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinHashSignature {
    /// The minimum hash value for each hash function.
    pub values: Vec<u64>,
}

impl MinHashSignature {
    /// Estimate Jaccard similarity as the fraction of agreeing positions.
    ///
    /// Zero for signatures of different or zero length.
    pub fn jaccard(&self, other: &Self) -> f64 {
        if self.values.len() != other.values.len() || self.values.is_empty() {
            return 0.0;
        }
        let matches = self.values.len() - self.hamming_distance(other);
        matches as f64 / self.values.len() as f64
    }

    /// Hamming distance between signatures (positions where values differ).
    pub fn hamming_distance(&self, other: &Self) -> usize {
        self.values
            .iter()
            .zip(other.values.iter())
            .filter(|(a, b)| a != b)
            .count()
    }

    /// True if this is the signature of an empty shingle set.
    pub fn is_degenerate(&self) -> bool {
        self.values.iter().all(|&v| v == EMPTY_SENTINEL)
    }

    /// Length of the signature.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the signature is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
