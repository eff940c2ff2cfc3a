//! Jaccard similarity, exact and estimated.
//!
//! Empty inputs are handled differently on purpose:
//! - [`jaccard`] treats two empty shingle sets as identical (`1.0`), so two degenerate documents
//!   that land together are still reported as duplicates of each other.
//! - [`sequence_jaccard`] returns `None` for two empty sequences; the ratio is undefined there
//!   and callers decide what it means.

use std::collections::HashSet;
use std::hash::Hash;

use crate::error::{Error, Result};
use crate::minhash::MinHashSignature;

/// `|a ∩ b| / |a ∪ b|`, or `1.0` when both sets are empty.
pub fn jaccard<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let intersection = small.iter().filter(|x| large.contains(*x)).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        1.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Fraction of positions where two signatures agree.
///
/// Unbiased for the true Jaccard similarity; only used as a cheap filter.
pub fn estimate_jaccard(a: &MinHashSignature, b: &MinHashSignature) -> Result<f64> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch {
            expected: a.len(),
            got: b.len(),
        });
    }
    Ok(a.jaccard(b))
}

/// Jaccard similarity of the distinct elements of two sequences.
///
/// `None` when both sequences are empty.
pub fn sequence_jaccard<T, A, B>(a: A, b: B) -> Option<f64>
where
    T: Eq + Hash,
    A: IntoIterator<Item = T>,
    B: IntoIterator<Item = T>,
{
    let a: HashSet<T> = a.into_iter().collect();
    let b: HashSet<T> = b.into_iter().collect();
    if a.is_empty() && b.is_empty() {
        return None;
    }
    Some(jaccard(&a, &b))
}
