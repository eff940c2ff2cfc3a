//! `sketchdedup`: near-duplicate text detection with MinHash + banded LSH.
//!
//! Documents are shingled into sets of 32-bit fingerprints, summarized as MinHash signatures
//! under a seeded universal hash family, and split into bands; documents sharing a band bucket
//! become candidate pairs, which are verified with exact Jaccard similarity.
//!
//! - [`tuning`]: pick bands/rows from similarity and probability targets
//! - [`hash`]: the universal hash family
//! - [`shingle`]: text normalization and shingling
//! - [`minhash`]: signatures
//! - [`lsh`]: banding and bucket ids
//! - [`candidates`]: bucket tables and candidate pairs
//! - [`similarity`]: exact and estimated Jaccard
//! - [`pipeline`]: the batch driver tying them together
//!
//! Reading the corpus and storing results are left to the caller.

#![warn(missing_docs)]

pub mod candidates;
pub mod config;
pub mod error;
pub mod hash;
pub mod lsh;
pub mod minhash;
pub mod pipeline;
pub mod shingle;
pub mod similarity;
pub mod tuning;

pub use candidates::{CandidateGenerator, CandidatePair, Candidates};
pub use config::DedupConfig;
pub use error::{Error, Result};
pub use hash::{universal_hash, HashFunctionFamily};
pub use lsh::LshBander;
pub use minhash::{MinHashSignature, MinHasher};
pub use pipeline::{
    DedupOutput, Deduplicator, Document, DuplicatePair, RawRecord, Record, RunReport,
};
pub use shingle::{ShingleSet, Shingler};
pub use similarity::{estimate_jaccard, jaccard, sequence_jaccard};
pub use tuning::{collision_probability, tune, CollisionCurve, Thresholds, TuningResult};
