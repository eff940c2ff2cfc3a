//! Character shingling.
//!
//! Text is lower-cased and stripped of punctuation (whitespace is kept), then every window of
//! exactly `k` characters is fingerprinted with 32-bit MurmurHash3.
//!
//! Windows are over Unicode scalar values (`char`), not bytes.

use std::collections::HashSet;

use mur3::murmurhash3_x86_32;

use crate::error::{Error, Result};

/// Default shingle length `k`.
pub const DEFAULT_SHINGLE_SIZE: usize = 9;

/// Distinct 32-bit shingle fingerprints of one document.
pub type ShingleSet = HashSet<u32>;

/// Symbols removed in addition to ASCII punctuation.
const EXTRA_SYMBOLS: [char; 5] = ['«', '»', '—', 'º', 'ª'];

/// Lower-case `text` and drop punctuation, keeping whitespace.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_ascii_punctuation() && !EXTRA_SYMBOLS.contains(c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Stable 32-bit fingerprint of a shingle (MurmurHash3 x86_32, seed 0).
#[inline]
pub fn fingerprint(shingle: &str) -> u32 {
    murmurhash3_x86_32(shingle.as_bytes(), 0)
}

/// Extracts shingle sets from raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shingler {
    size: usize,
}

impl Default for Shingler {
    fn default() -> Self {
        Self {
            size: DEFAULT_SHINGLE_SIZE,
        }
    }
}

impl Shingler {
    /// Create a shingler for windows of `size` characters.
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidParam("shingle size must be >= 1"));
        }
        Ok(Self { size })
    }

    /// Shingle length `k`.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Fingerprints of every `k`-character window of the normalized text.
    ///
    /// Empty when the normalized text is shorter than `k`.
    pub fn shingles(&self, text: &str) -> ShingleSet {
        let chars: Vec<char> = normalize(text).chars().collect();
        if chars.len() < self.size {
            return ShingleSet::new();
        }
        let mut buf = String::with_capacity(self.size * 4);
        chars
            .windows(self.size)
            .map(|w| {
                buf.clear();
                buf.extend(w);
                fingerprint(&buf)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation_and_lowercases() {
        assert_eq!(normalize("Hello, World!"), "hello world");
        assert_eq!(normalize("«Olá» — nº 1ª"), "olá  n 1");
        assert_eq!(normalize("tabs\tand\nnewlines"), "tabs\tand\nnewlines");
    }

    #[test]
    fn window_count() {
        let s = Shingler::new(3).unwrap();
        // abc bcd cde def
        assert_eq!(s.shingles("abcdef").len(), 4);
    }

    #[test]
    fn repeated_windows_collapse() {
        let s = Shingler::new(2).unwrap();
        // aa only
        assert_eq!(s.shingles("aaaaaa").len(), 1);
    }

    #[test]
    fn short_text_is_empty() {
        let s = Shingler::default();
        assert!(s.shingles("short").is_empty());
        assert!(s.shingles("").is_empty());
        // 9 chars only after punctuation is removed
        assert!(s.shingles("a.b.c.d.e.f.g.h").is_empty());
        assert_eq!(s.shingles("abcdefghi").len(), 1);
    }

    #[test]
    fn case_and_punctuation_do_not_matter() {
        let s = Shingler::new(4).unwrap();
        assert_eq!(
            s.shingles("The Quick, Brown Fox!"),
            s.shingles("the quick brown fox")
        );
    }

    #[test]
    fn fingerprint_is_stable() {
        assert_eq!(fingerprint("hello wor"), fingerprint("hello wor"));
        assert_ne!(fingerprint("hello wor"), fingerprint("hello wos"));
    }

    #[test]
    fn zero_size_rejected() {
        assert!(Shingler::new(0).is_err());
    }
}
