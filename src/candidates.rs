//! Candidate-pair generation from per-band bucket memberships.
//!
//! Documents are identified by a dense `usize` handle (their position in the input). Every band
//! has its own bucket table; two documents become a candidate pair if they share a bucket in
//! at least one band.

use std::collections::{BTreeSet, HashMap};

use tracing::warn;

use crate::error::{Error, Result};

/// An unordered pair of distinct documents, stored with `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CandidatePair {
    /// Smaller document handle.
    pub a: usize,
    /// Larger document handle.
    pub b: usize,
}

impl CandidatePair {
    /// Normalize `(x, y)` into a pair; `None` when `x == y`.
    pub fn new(x: usize, y: usize) -> Option<Self> {
        match x.cmp(&y) {
            std::cmp::Ordering::Less => Some(Self { a: x, b: y }),
            std::cmp::Ordering::Greater => Some(Self { a: y, b: x }),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Candidate pairs plus what had to be skipped to produce them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidates {
    /// Deduplicated pairs in ascending order.
    pub pairs: Vec<CandidatePair>,
    /// Buckets dropped for exceeding the size cap.
    pub oversized_buckets: usize,
}

/// One bucket table per band.
#[derive(Debug, Clone)]
pub struct CandidateGenerator {
    buckets: Vec<HashMap<u32, Vec<usize>>>,
    max_bucket_size: Option<usize>,
    documents: usize,
}

impl CandidateGenerator {
    /// Create an empty generator for `bands` bands.
    pub fn new(bands: usize) -> Result<Self> {
        if bands == 0 {
            return Err(Error::InvalidParam("bands must be >= 1"));
        }
        Ok(Self {
            buckets: (0..bands).map(|_| HashMap::new()).collect(),
            max_bucket_size: None,
            documents: 0,
        })
    }

    /// Skip buckets holding more than `cap` documents when generating pairs.
    pub fn with_max_bucket_size(mut self, cap: Option<usize>) -> Self {
        self.max_bucket_size = cap;
        self
    }

    /// Number of bands.
    pub fn bands(&self) -> usize {
        self.buckets.len()
    }

    /// Number of registered documents.
    pub fn len(&self) -> usize {
        self.documents
    }

    /// True if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.documents == 0
    }

    /// Record `doc` in the bucket `bucket_ids[i]` of every band `i`.
    pub fn register(&mut self, doc: usize, bucket_ids: &[u32]) -> Result<()> {
        if bucket_ids.len() != self.buckets.len() {
            return Err(Error::DimensionMismatch {
                expected: self.buckets.len(),
                got: bucket_ids.len(),
            });
        }
        for (band, &bucket) in self.buckets.iter_mut().zip(bucket_ids) {
            band.entry(bucket).or_default().push(doc);
        }
        self.documents += 1;
        Ok(())
    }

    /// Fold in a generator built over a disjoint set of documents.
    pub fn merge(&mut self, other: CandidateGenerator) -> Result<()> {
        if other.buckets.len() != self.buckets.len() {
            return Err(Error::DimensionMismatch {
                expected: self.buckets.len(),
                got: other.buckets.len(),
            });
        }
        for (mine, theirs) in self.buckets.iter_mut().zip(other.buckets) {
            for (bucket, docs) in theirs {
                mine.entry(bucket).or_default().extend(docs);
            }
        }
        self.documents += other.documents;
        Ok(())
    }

    /// All pairs sharing a bucket in at least one band, each reported once.
    pub fn candidate_pairs(&self) -> Candidates {
        let mut pairs: BTreeSet<CandidatePair> = BTreeSet::new();
        let mut oversized_buckets = 0;

        for (band_idx, band) in self.buckets.iter().enumerate() {
            for (&bucket, docs) in band {
                if docs.len() < 2 {
                    continue;
                }
                if let Some(cap) = self.max_bucket_size {
                    if docs.len() > cap {
                        warn!(
                            band = band_idx,
                            bucket,
                            size = docs.len(),
                            cap,
                            "skipping oversized bucket"
                        );
                        oversized_buckets += 1;
                        continue;
                    }
                }
                for i in 0..docs.len() {
                    for j in (i + 1)..docs.len() {
                        if let Some(pair) = CandidatePair::new(docs[i], docs[j]) {
                            pairs.insert(pair);
                        }
                    }
                }
            }
        }

        Candidates {
            pairs: pairs.into_iter().collect(),
            oversized_buckets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_is_normalized() {
        assert_eq!(CandidatePair::new(5, 2), Some(CandidatePair { a: 2, b: 5 }));
        assert_eq!(CandidatePair::new(2, 5), CandidatePair::new(5, 2));
        assert_eq!(CandidatePair::new(3, 3), None);
    }

    #[test]
    fn shared_bucket_becomes_candidate() {
        let mut g = CandidateGenerator::new(2).unwrap();
        g.register(0, &[1, 2]).unwrap();
        g.register(1, &[1, 3]).unwrap();
        g.register(2, &[4, 5]).unwrap();
        let c = g.candidate_pairs();
        assert_eq!(c.pairs, vec![CandidatePair { a: 0, b: 1 }]);
    }

    #[test]
    fn multi_band_collision_reported_once() {
        let mut g = CandidateGenerator::new(3).unwrap();
        g.register(0, &[7, 7, 7]).unwrap();
        g.register(1, &[7, 7, 7]).unwrap();
        assert_eq!(g.candidate_pairs().pairs.len(), 1);
    }

    #[test]
    fn bucket_of_three_yields_three_pairs() {
        let mut g = CandidateGenerator::new(1).unwrap();
        for doc in 0..3 {
            g.register(doc, &[0]).unwrap();
        }
        let c = g.candidate_pairs();
        assert_eq!(c.pairs.len(), 3);
        assert!(c.pairs.iter().all(|p| p.a < p.b));
    }

    #[test]
    fn oversized_buckets_are_skipped() {
        let mut g = CandidateGenerator::new(2)
            .unwrap()
            .with_max_bucket_size(Some(2));
        for doc in 0..3 {
            g.register(doc, &[0, doc as u32]).unwrap();
        }
        let c = g.candidate_pairs();
        assert!(c.pairs.is_empty());
        assert_eq!(c.oversized_buckets, 1);
    }

    #[test]
    fn merge_equals_single_pass() {
        let docs: Vec<(usize, [u32; 2])> = vec![(0, [1, 2]), (1, [1, 9]), (2, [3, 2]), (3, [4, 4])];

        let mut single = CandidateGenerator::new(2).unwrap();
        for (d, ids) in &docs {
            single.register(*d, ids).unwrap();
        }

        let mut left = CandidateGenerator::new(2).unwrap();
        let mut right = CandidateGenerator::new(2).unwrap();
        for (d, ids) in &docs {
            if d % 2 == 0 {
                left.register(*d, ids).unwrap();
            } else {
                right.register(*d, ids).unwrap();
            }
        }
        left.merge(right).unwrap();

        assert_eq!(left.len(), 4);
        assert_eq!(left.candidate_pairs(), single.candidate_pairs());
    }

    #[test]
    fn length_mismatch_rejected() {
        let mut g = CandidateGenerator::new(2).unwrap();
        assert!(g.register(0, &[1]).is_err());
        assert!(g.merge(CandidateGenerator::new(3).unwrap()).is_err());
        assert!(CandidateGenerator::new(0).is_err());
    }
}
