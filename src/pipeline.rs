//! End-to-end near-duplicate detection over a batch of records.
//!
//! ```text
//! (id, text) -> shingles -> signature -> bucket ids -> candidate pairs -> exact Jaccard
//! ```
//!
//! Shingling, minhashing and banding run per document on the rayon pool with no shared
//! mutable state; bucket registration is a single-threaded reduction afterwards. A record
//! without an id or text is skipped and recorded in the [`RunReport`], never aborting the batch.
//!
//! # Example
//!
//! ```rust
//! use sketchdedup::{DedupConfig, Deduplicator, Document};
//!
//! let dedup = Deduplicator::new(DedupConfig::default()).unwrap();
//! let out = dedup
//!     .run(vec![
//!         Document::new("a", "the quick brown fox jumps over the lazy dog"),
//!         Document::new("b", "The quick brown fox jumps over the lazy dog!"),
//!         Document::new("c", "an entirely unrelated sentence about databases"),
//!     ])
//!     .unwrap();
//! assert_eq!(out.pairs.len(), 1);
//! assert_eq!((out.pairs[0].id_a.as_str(), out.pairs[0].id_b.as_str()), ("a", "b"));
//! ```

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::candidates::{CandidateGenerator, CandidatePair};
use crate::config::DedupConfig;
use crate::error::{Error, Result};
use crate::hash::HashFunctionFamily;
use crate::lsh::LshBander;
use crate::minhash::{MinHashSignature, MinHasher};
use crate::shingle::{ShingleSet, Shingler};
use crate::similarity::jaccard;
use crate::tuning::{tune, CollisionCurve, TuningResult};

/// Anything exposing an identifier and a text body.
pub trait Record {
    /// Document identifier, if present.
    fn id(&self) -> Option<&str>;
    /// Raw text, if present.
    fn text(&self) -> Option<&str>;
}

/// A validated input document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// External identifier.
    pub id: String,
    /// Raw text content.
    pub text: String,
}

impl Document {
    /// Build a document from an id and its text.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

impl Record for Document {
    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn text(&self) -> Option<&str> {
        Some(&self.text)
    }
}

/// A record as it arrives from a parser, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Identifier field.
    pub id: Option<String>,
    /// Text field.
    pub text: Option<String>,
}

impl Record for RawRecord {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

impl Record for (String, String) {
    fn id(&self) -> Option<&str> {
        Some(&self.0)
    }

    fn text(&self) -> Option<&str> {
        Some(&self.1)
    }
}

impl Record for (&str, &str) {
    fn id(&self) -> Option<&str> {
        Some(self.0)
    }

    fn text(&self) -> Option<&str> {
        Some(self.1)
    }
}

/// A verified near-duplicate pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicatePair {
    /// Id of the earlier document in input order.
    pub id_a: String,
    /// Id of the later document in input order.
    pub id_b: String,
    /// Exact Jaccard similarity of their shingle sets.
    pub similarity: f64,
}

/// Counters and per-document errors from one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// Documents that entered the pipeline.
    pub documents: usize,
    /// Records skipped as malformed, with the reason.
    pub skipped: Vec<Error>,
    /// Documents shorter than the shingle size (empty shingle set).
    pub degenerate: usize,
    /// Distinct candidate pairs produced by banding.
    pub candidates: usize,
    /// Buckets skipped for exceeding `max_bucket_size`.
    pub oversized_buckets: usize,
    /// Candidates dropped by the signature prefilter.
    pub prefiltered: usize,
    /// Pairs reported.
    pub reported: usize,
}

/// Pairs plus the run report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DedupOutput {
    /// Verified pairs, ordered by input position of `(id_a, id_b)`.
    pub pairs: Vec<DuplicatePair>,
    /// Run counters.
    pub report: RunReport,
}

struct Processed {
    shingles: ShingleSet,
    signature: Option<MinHashSignature>,
    buckets: Vec<u32>,
}

/// A configured detector: tuned banding, hash family, shingler and bander.
#[derive(Debug, Clone)]
pub struct Deduplicator {
    config: DedupConfig,
    tuning: TuningResult,
    family: HashFunctionFamily,
    shingler: Shingler,
    bander: LshBander,
}

impl Deduplicator {
    /// Validate `config`, tune `(b, r)` and generate the hash family.
    ///
    /// Fails with [`Error::Configuration`] when no banding satisfies the thresholds.
    pub fn new(config: DedupConfig) -> Result<Self> {
        config.validate()?;
        let tuning = tune(
            &config.band_candidates(),
            &config.row_candidates(),
            &config.thresholds,
        )?;
        info!(
            bands = tuning.bands,
            rows = tuning.rows,
            num_hashes = tuning.num_hashes(),
            p_at_high = tuning.p_at_high,
            p_at_low = tuning.p_at_low,
            "tuned LSH parameters"
        );

        let family = HashFunctionFamily::with_params(
            tuning.num_hashes(),
            config.domain_size,
            config.prime,
            config.seed,
        )?;
        let shingler = Shingler::new(config.shingle_size)?;
        let bander = LshBander::new(tuning.bands, tuning.rows, config.bucket_size)?;

        Ok(Self {
            config,
            tuning,
            family,
            shingler,
            bander,
        })
    }

    /// The configuration this detector was built from.
    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    /// The chosen banding.
    pub fn tuning(&self) -> &TuningResult {
        &self.tuning
    }

    /// The shared hash family.
    pub fn family(&self) -> &HashFunctionFamily {
        &self.family
    }

    /// Collision-probability curve of the chosen banding, for inspection.
    pub fn curve(&self) -> CollisionCurve {
        CollisionCurve::new(self.tuning.bands, self.tuning.rows, self.config.thresholds)
    }

    /// Signature of a single text under this detector's family.
    pub fn signature(&self, text: &str) -> MinHashSignature {
        MinHasher::new(&self.family).signature(&self.shingler.shingles(text))
    }

    /// Run detection and collect every reported pair.
    pub fn run<I, R>(&self, records: I) -> Result<DedupOutput>
    where
        I: IntoIterator<Item = R>,
        R: Record,
    {
        let mut pairs = Vec::new();
        let report = self.run_with_sink(records, |p| pairs.push(p))?;
        Ok(DedupOutput { pairs, report })
    }

    /// Run detection, handing each reported pair to `sink` in input order.
    #[instrument(skip_all, fields(bands = self.tuning.bands, rows = self.tuning.rows))]
    pub fn run_with_sink<I, R, F>(&self, records: I, mut sink: F) -> Result<RunReport>
    where
        I: IntoIterator<Item = R>,
        R: Record,
        F: FnMut(DuplicatePair),
    {
        let mut report = RunReport::default();

        let mut ids = Vec::new();
        let mut texts = Vec::new();
        for (index, record) in records.into_iter().enumerate() {
            match validate(index, &record) {
                Ok((id, text)) => {
                    ids.push(id.to_owned());
                    texts.push(text.to_owned());
                }
                Err(e) => {
                    warn!(error = %e, "skipping record");
                    report.skipped.push(e);
                }
            }
        }
        report.documents = ids.len();

        let keep_signatures = self.config.prefilter_threshold.is_some();
        let minhasher = MinHasher::new(&self.family);
        let processed: Vec<Processed> = texts
            .into_par_iter()
            .map(|text| -> Result<Processed> {
                let shingles = self.shingler.shingles(&text);
                let signature = minhasher.signature(&shingles);
                let buckets = self.bander.bucket_ids(&signature)?;
                Ok(Processed {
                    shingles,
                    signature: keep_signatures.then_some(signature),
                    buckets,
                })
            })
            .collect::<Result<_>>()?;

        let mut generator = CandidateGenerator::new(self.bander.bands())?
            .with_max_bucket_size(self.config.max_bucket_size);
        for (doc, p) in processed.iter().enumerate() {
            if p.shingles.is_empty() {
                debug!(id = %ids[doc], "document shorter than shingle size");
                report.degenerate += 1;
            }
            generator.register(doc, &p.buckets)?;
        }

        let candidates = generator.candidate_pairs();
        report.candidates = candidates.pairs.len();
        report.oversized_buckets = candidates.oversized_buckets;

        let scored: Vec<Option<(CandidatePair, f64)>> = candidates
            .pairs
            .par_iter()
            .map(|&pair| self.score(&processed, pair))
            .collect();

        let floor = self.config.report_threshold();
        for scored in scored {
            let Some((pair, similarity)) = scored else {
                report.prefiltered += 1;
                continue;
            };
            if similarity < floor {
                continue;
            }
            report.reported += 1;
            sink(DuplicatePair {
                id_a: ids[pair.a].clone(),
                id_b: ids[pair.b].clone(),
                similarity,
            });
        }

        info!(
            documents = report.documents,
            skipped = report.skipped.len(),
            degenerate = report.degenerate,
            candidates = report.candidates,
            reported = report.reported,
            "dedup run finished"
        );
        Ok(report)
    }

    fn score(&self, processed: &[Processed], pair: CandidatePair) -> Option<(CandidatePair, f64)> {
        let (a, b) = (&processed[pair.a], &processed[pair.b]);
        if let (Some(floor), Some(sa), Some(sb)) = (
            self.config.prefilter_threshold,
            a.signature.as_ref(),
            b.signature.as_ref(),
        ) {
            if sa.jaccard(sb) < floor {
                return None;
            }
        }
        Some((pair, jaccard(&a.shingles, &b.shingles)))
    }
}

fn validate<R: Record>(index: usize, record: &R) -> Result<(&str, &str)> {
    let id = match record.id() {
        Some(id) if !id.trim().is_empty() => id,
        _ => {
            return Err(Error::MalformedDocument {
                index,
                reason: "missing id",
            })
        }
    };
    let text = record.text().ok_or(Error::MalformedDocument {
        index,
        reason: "missing text",
    })?;
    Ok((id, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_missing_fields() {
        let no_id = RawRecord {
            id: None,
            text: Some("x".into()),
        };
        let blank_id = RawRecord {
            id: Some("  ".into()),
            text: Some("x".into()),
        };
        let no_text = RawRecord {
            id: Some("1".into()),
            text: None,
        };
        assert_eq!(
            validate(3, &no_id).unwrap_err(),
            Error::MalformedDocument {
                index: 3,
                reason: "missing id"
            }
        );
        assert!(validate(0, &blank_id).is_err());
        assert_eq!(
            validate(1, &no_text).unwrap_err(),
            Error::MalformedDocument {
                index: 1,
                reason: "missing text"
            }
        );
        assert_eq!(validate(0, &("a", "")).unwrap(), ("a", ""));
    }

    #[test]
    fn detector_uses_tuned_sizes() {
        let d = Deduplicator::new(DedupConfig::default()).unwrap();
        assert_eq!((d.tuning().bands, d.tuning().rows), (13, 11));
        assert_eq!(d.family().len(), 143);
        assert_eq!(d.signature("some reasonably long text").len(), 143);
    }

    #[test]
    fn infeasible_config_is_fatal() {
        let cfg = DedupConfig {
            band_range: 1..=2,
            row_range: 1..=2,
            ..Default::default()
        };
        assert!(matches!(
            Deduplicator::new(cfg),
            Err(Error::Configuration { .. })
        ));
    }
}
