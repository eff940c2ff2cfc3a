//! Tunable constants for a detection run.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hash::{DEFAULT_DOMAIN, DEFAULT_PRIME, DEFAULT_SEED, MAX_PRIME};
use crate::lsh::DEFAULT_BUCKET_SIZE;
use crate::shingle::DEFAULT_SHINGLE_SIZE;
use crate::tuning::Thresholds;

/// Configuration for [`crate::Deduplicator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Shingle length in characters (`k`).
    pub shingle_size: usize,
    /// Hash output domain (`N`).
    pub domain_size: u64,
    /// Prime modulus (`P`), must exceed `domain_size` and be at most 2^33.
    pub prime: u64,
    /// Buckets per band.
    pub bucket_size: u32,
    /// Candidate band counts searched by the tuner.
    pub band_range: RangeInclusive<usize>,
    /// Candidate rows-per-band searched by the tuner.
    pub row_range: RangeInclusive<usize>,
    /// Tuning thresholds.
    pub thresholds: Thresholds,
    /// Seed for the hash coefficients.
    pub seed: u64,
    /// Buckets with more members than this are skipped during pair generation.
    pub max_bucket_size: Option<usize>,
    /// Drop candidates whose signature estimate is below this before exact scoring.
    pub prefilter_threshold: Option<f64>,
    /// Only report pairs with exact similarity at or above this; `None` uses `thresholds.s_low`.
    pub min_similarity: Option<f64>,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            shingle_size: DEFAULT_SHINGLE_SIZE,
            domain_size: DEFAULT_DOMAIN,
            prime: DEFAULT_PRIME,
            bucket_size: DEFAULT_BUCKET_SIZE,
            band_range: 1..=19,
            row_range: 1..=19,
            thresholds: Thresholds::default(),
            seed: DEFAULT_SEED,
            max_bucket_size: None,
            prefilter_threshold: None,
            min_similarity: None,
        }
    }
}

impl DedupConfig {
    /// Find more near-duplicates at the cost of more false candidates.
    pub fn high_recall() -> Self {
        Self {
            thresholds: Thresholds {
                s_high: 0.80,
                s_low: 0.50,
                p_min: 0.95,
                p_max: 0.10,
            },
            ..Default::default()
        }
    }

    /// Fewer, tighter candidates.
    pub fn high_precision() -> Self {
        Self {
            thresholds: Thresholds {
                s_high: 0.90,
                s_low: 0.70,
                p_min: 0.90,
                p_max: 0.02,
            },
            ..Default::default()
        }
    }

    /// Check every field before anything is built.
    pub fn validate(&self) -> Result<()> {
        if self.shingle_size == 0 {
            return Err(Error::InvalidParam("shingle_size must be >= 1"));
        }
        if self.domain_size == 0 || self.domain_size > DEFAULT_DOMAIN {
            return Err(Error::InvalidParam("domain_size must be in [1, 2^32]"));
        }
        if self.prime <= self.domain_size {
            return Err(Error::InvalidParam("prime must be greater than domain_size"));
        }
        if self.prime > MAX_PRIME {
            return Err(Error::InvalidParam("prime must be <= 2^33"));
        }
        if self.bucket_size == 0 {
            return Err(Error::InvalidParam("bucket_size must be >= 1"));
        }
        if self.band_range.is_empty() || self.row_range.is_empty() {
            return Err(Error::InvalidParam("band_range and row_range must not be empty"));
        }
        if *self.band_range.start() == 0 || *self.row_range.start() == 0 {
            return Err(Error::InvalidParam("band_range and row_range must start at >= 1"));
        }
        if self.max_bucket_size.is_some_and(|cap| cap < 2) {
            return Err(Error::InvalidParam("max_bucket_size must be >= 2"));
        }
        self.thresholds.validate()?;
        if let Some(t) = self.prefilter_threshold {
            check_unit("prefilter_threshold", t)?;
        }
        if let Some(t) = self.min_similarity {
            check_unit("min_similarity", t)?;
        }
        Ok(())
    }

    /// Reporting floor for exact similarity.
    pub fn report_threshold(&self) -> f64 {
        self.min_similarity.unwrap_or(self.thresholds.s_low)
    }

    pub(crate) fn band_candidates(&self) -> Vec<usize> {
        self.band_range.clone().collect()
    }

    pub(crate) fn row_candidates(&self) -> Vec<usize> {
        self.row_range.clone().collect()
    }
}

fn check_unit(name: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidThreshold { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        DedupConfig::default().validate().unwrap();
        DedupConfig::high_recall().validate().unwrap();
        DedupConfig::high_precision().validate().unwrap();
    }

    #[test]
    fn rejects_bad_fields() {
        let bad = [
            DedupConfig {
                shingle_size: 0,
                ..Default::default()
            },
            DedupConfig {
                prime: DEFAULT_DOMAIN,
                ..Default::default()
            },
            DedupConfig {
                prime: u64::MAX - 58,
                ..Default::default()
            },
            DedupConfig {
                bucket_size: 0,
                ..Default::default()
            },
            DedupConfig {
                band_range: 0..=5,
                ..Default::default()
            },
            DedupConfig {
                max_bucket_size: Some(1),
                ..Default::default()
            },
            DedupConfig {
                min_similarity: Some(1.5),
                ..Default::default()
            },
            DedupConfig {
                prefilter_threshold: Some(-0.1),
                ..Default::default()
            },
        ];
        for cfg in bad {
            assert!(cfg.validate().is_err(), "{cfg:?}");
        }
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: DedupConfig =
            serde_json::from_str(r#"{"shingle_size": 5, "max_bucket_size": 1000}"#).unwrap();
        assert_eq!(cfg.shingle_size, 5);
        assert_eq!(cfg.max_bucket_size, Some(1000));
        assert_eq!(cfg.bucket_size, DEFAULT_BUCKET_SIZE);
        assert_eq!(cfg.thresholds, Thresholds::default());
        assert_eq!(cfg.report_threshold(), 0.60);
    }
}
