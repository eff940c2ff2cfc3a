//! Banding: cutting signatures into bands and hashing each band to a bucket.
//!
//! A signature of `b * r` values is split into `b` contiguous, non-overlapping bands of `r`
//! values. Each band is encoded as its decimal values joined by commas and hashed with 32-bit
//! MurmurHash3, modulo the bucket table size. The encoding depends only on the values, so equal
//! bands always land in the same bucket.

use mur3::murmurhash3_x86_32;

use crate::error::{Error, Result};
use crate::minhash::MinHashSignature;

/// Default number of buckets per band.
pub const DEFAULT_BUCKET_SIZE: u32 = 100_000;

/// Maps signatures to per-band bucket ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LshBander {
    bands: usize,
    rows_per_band: usize,
    bucket_size: u32,
}

impl LshBander {
    /// Create a bander for `bands` bands of `rows_per_band` values.
    pub fn new(bands: usize, rows_per_band: usize, bucket_size: u32) -> Result<Self> {
        if bands == 0 || rows_per_band == 0 {
            return Err(Error::InvalidParam("bands and rows_per_band must be >= 1"));
        }
        if bucket_size == 0 {
            return Err(Error::InvalidParam("bucket_size must be >= 1"));
        }
        Ok(Self {
            bands,
            rows_per_band,
            bucket_size,
        })
    }

    /// Number of bands (`b`).
    pub fn bands(&self) -> usize {
        self.bands
    }

    /// Rows per band (`r`).
    pub fn rows_per_band(&self) -> usize {
        self.rows_per_band
    }

    /// Buckets per band.
    pub fn bucket_size(&self) -> u32 {
        self.bucket_size
    }

    /// Expected signature length, `b * r`.
    pub fn signature_len(&self) -> usize {
        self.bands * self.rows_per_band
    }

    /// The bands of `signature`, in positional order.
    pub fn split<'s>(&self, signature: &'s MinHashSignature) -> Result<std::slice::Chunks<'s, u64>> {
        self.check_len(signature)?;
        Ok(signature.values.chunks(self.rows_per_band))
    }

    /// One bucket id per band, each in `[0, bucket_size)`.
    pub fn bucket_ids(&self, signature: &MinHashSignature) -> Result<Vec<u32>> {
        let mut buf = String::with_capacity(self.rows_per_band * 11);
        Ok(self
            .split(signature)?
            .map(|band| hash_band(band, &mut buf) % self.bucket_size)
            .collect())
    }

    fn check_len(&self, signature: &MinHashSignature) -> Result<()> {
        if signature.len() != self.signature_len() {
            return Err(Error::DimensionMismatch {
                expected: self.signature_len(),
                got: signature.len(),
            });
        }
        Ok(())
    }
}

/// MurmurHash3 of `"v0,v1,...,vr-1"`.
fn hash_band(values: &[u64], buf: &mut String) -> u32 {
    buf.clear();
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            buf.push(',');
        }
        buf.push_str(&v.to_string());
    }
    murmurhash3_x86_32(buf.as_bytes(), 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(values: Vec<u64>) -> MinHashSignature {
        MinHashSignature { values }
    }

    #[test]
    fn bands_partition_signature() {
        let bander = LshBander::new(4, 3, 100).unwrap();
        let s = sig((0..12).collect());
        let bands: Vec<&[u64]> = bander.split(&s).unwrap().collect();
        assert_eq!(bands.len(), 4);
        assert!(bands.iter().all(|b| b.len() == 3));
        assert_eq!(bands.concat(), s.values);
    }

    #[test]
    fn bucket_ids_in_range() {
        let bander = LshBander::new(5, 2, 7).unwrap();
        let s = sig(vec![u64::MAX, 0, 1, 2, 3, 4, 5, 6, 7, 8]);
        let ids = bander.bucket_ids(&s).unwrap();
        assert_eq!(ids.len(), 5);
        assert!(ids.iter().all(|&id| id < 7));
    }

    #[test]
    fn equal_bands_share_buckets() {
        let bander = LshBander::new(2, 2, DEFAULT_BUCKET_SIZE).unwrap();
        let a = bander.bucket_ids(&sig(vec![1, 2, 3, 4])).unwrap();
        let b = bander.bucket_ids(&sig(vec![9, 9, 3, 4])).unwrap();
        assert_eq!(a[1], b[1]);
    }

    #[test]
    fn band_encoding_is_comma_joined_decimal() {
        let mut buf = String::new();
        let h = hash_band(&[17, 4, 99], &mut buf);
        assert_eq!(buf, "17,4,99");
        assert_eq!(h, murmurhash3_x86_32(b"17,4,99", 0));

        // The buffer is reused across bands.
        hash_band(&[u64::MAX, 0], &mut buf);
        assert_eq!(buf, "18446744073709551615,0");
        hash_band(&[5], &mut buf);
        assert_eq!(buf, "5");
    }

    #[test]
    fn wrong_length_is_rejected() {
        let bander = LshBander::new(2, 2, 10).unwrap();
        let err = bander.bucket_ids(&sig(vec![1, 2, 3])).unwrap_err();
        assert_eq!(
            err,
            Error::DimensionMismatch {
                expected: 4,
                got: 3
            }
        );
    }

    #[test]
    fn rejects_zero_params() {
        assert!(LshBander::new(0, 1, 10).is_err());
        assert!(LshBander::new(1, 0, 10).is_err());
        assert!(LshBander::new(1, 1, 0).is_err());
    }
}
