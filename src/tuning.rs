//! Choosing the LSH banding parameters.
//!
//! Two documents with Jaccard similarity \(s\) share at least one identical band with probability
//! \(P(s) = 1 - (1 - s^r)^b\), where \(b\) is the number of bands and \(r\) the rows per band.
//! The tuner picks the cheapest `(b, r)` (fewest hash functions, `b * r`) whose curve is steep
//! enough: at least `p_min` at `s_high`, at most `p_max` at `s_low`.
//!
//! The search order is part of the contract: `b` ascending, then `r` ascending, first feasible
//! pair kept, replaced only by a strictly smaller `b * r` or an equal `b * r` with a smaller `b`.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Probability that two documents of similarity `similarity` collide in at least one band.
pub fn collision_probability(similarity: f64, bands: usize, rows: usize) -> f64 {
    let s = similarity;
    let r = rows as f64;
    let b = bands as f64;
    1.0 - (1.0 - s.powf(r)).powf(b)
}

/// Similarity and probability targets for the tuner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Similarity at which pairs must be found (`s_high`).
    pub s_high: f64,
    /// Similarity at which pairs should mostly be ignored (`s_low`).
    pub s_low: f64,
    /// Minimum collision probability at `s_high`.
    pub p_min: f64,
    /// Maximum collision probability at `s_low`.
    pub p_max: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            s_high: 0.85,
            s_low: 0.60,
            p_min: 0.90,
            p_max: 0.05,
        }
    }
}

impl Thresholds {
    /// Check every value is within `[0, 1]` and `s_high > s_low`.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("s_high", self.s_high),
            ("s_low", self.s_low),
            ("p_min", self.p_min),
            ("p_max", self.p_max),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidThreshold { name, value });
            }
        }
        if self.s_high <= self.s_low {
            return Err(Error::InvalidParam("s_high must be greater than s_low"));
        }
        Ok(())
    }

    /// True if `(bands, rows)` meets both probability constraints.
    pub fn is_feasible(&self, bands: usize, rows: usize) -> bool {
        collision_probability(self.s_high, bands, rows) >= self.p_min
            && collision_probability(self.s_low, bands, rows) <= self.p_max
    }
}

/// The banding parameters chosen by [`tune`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TuningResult {
    /// Number of bands (`b`).
    pub bands: usize,
    /// Rows per band (`r`).
    pub rows: usize,
    /// Collision probability at `s_high`.
    pub p_at_high: f64,
    /// Collision probability at `s_low`.
    pub p_at_low: f64,
}

impl TuningResult {
    /// Total number of hash functions, `b * r`.
    pub fn num_hashes(&self) -> usize {
        self.bands * self.rows
    }
}

/// Search `bands × rows` for the cheapest feasible banding.
///
/// Both candidate lists are visited in ascending order regardless of how they are passed in.
pub fn tune(bands: &[usize], rows: &[usize], thresholds: &Thresholds) -> Result<TuningResult> {
    thresholds.validate()?;
    let bands = ascending(bands)?;
    let rows = ascending(rows)?;

    let mut best: Option<(usize, usize)> = None;
    for &b in &bands {
        for &r in &rows {
            if !thresholds.is_feasible(b, r) {
                continue;
            }
            let replace = match best {
                None => true,
                Some(current) => cheaper((b, r), current),
            };
            if replace {
                debug!(bands = b, rows = r, cost = b * r, "feasible banding");
                best = Some((b, r));
            }
        }
    }

    let (b, r) = best.ok_or(Error::Configuration {
        s_high: thresholds.s_high,
        s_low: thresholds.s_low,
        p_min: thresholds.p_min,
        p_max: thresholds.p_max,
    })?;
    Ok(TuningResult {
        bands: b,
        rows: r,
        p_at_high: collision_probability(thresholds.s_high, b, r),
        p_at_low: collision_probability(thresholds.s_low, b, r),
    })
}

/// Fewer total hashes wins; on equal cost, fewer bands.
fn cheaper((b, r): (usize, usize), (best_b, best_r): (usize, usize)) -> bool {
    b * r < best_b * best_r || (b * r == best_b * best_r && b < best_b)
}

fn ascending(values: &[usize]) -> Result<Vec<usize>> {
    if values.is_empty() {
        return Err(Error::InvalidParam("search ranges must not be empty"));
    }
    if values.contains(&0) {
        return Err(Error::InvalidParam("bands and rows must be >= 1"));
    }
    let mut v = values.to_vec();
    v.sort_unstable();
    v.dedup();
    Ok(v)
}

/// The theoretical collision-probability curve for one banding, for inspection.
///
/// Purely diagnostic: nothing in tuning or detection reads it.
#[derive(Debug, Clone)]
pub struct CollisionCurve {
    bands: usize,
    rows: usize,
    thresholds: Thresholds,
    points: Vec<(f64, f64)>,
}

impl CollisionCurve {
    /// Sample `P(s)` at `s = 0.01, 0.02, ..., 0.99`.
    pub fn new(bands: usize, rows: usize, thresholds: Thresholds) -> Self {
        let points = (1..100)
            .map(|i| {
                let s = i as f64 / 100.0;
                (s, collision_probability(s, bands, rows))
            })
            .collect();
        Self {
            bands,
            rows,
            thresholds,
            points,
        }
    }

    /// `(similarity, probability)` samples in ascending similarity.
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// The thresholds drawn as markers.
    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }
}

impl fmt::Display for CollisionCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const WIDTH: usize = 50;
        let t = &self.thresholds;
        writeln!(
            f,
            "expected LSH collision probability for b={}, r={}",
            self.bands, self.rows
        )?;
        writeln!(
            f,
            "markers: s_high={:.2} (p>={:.2})  s_low={:.2} (p<={:.2})",
            t.s_high, t.p_min, t.s_low, t.p_max
        )?;
        for &(s, p) in self.points.iter().skip(4).step_by(5) {
            let filled = (p * WIDTH as f64).round() as usize;
            let marker = if (s - t.s_high).abs() < 0.025 {
                " <- s_high"
            } else if (s - t.s_low).abs() < 0.025 {
                " <- s_low"
            } else {
                ""
            };
            writeln!(
                f,
                "{:>4.2} |{}{}| {:.4}{}",
                s,
                "#".repeat(filled),
                " ".repeat(WIDTH - filled.min(WIDTH)),
                p,
                marker
            )?;
        }
        Ok(())
    }
}
