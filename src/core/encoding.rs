//! Hash-based basin encoding
//!
//! Implements feature hashing over SHA-256: each token lands in a bucket
//! chosen by its hash, with a hash-derived sign. No ML model dependencies -
//! fully deterministic. Bucket collisions are expected and not corrected.

use sha2::{Digest, Sha256};

/// Default basin dimension
pub const BASIN_DIM: usize = 64;

/// Deterministic text-to-basin encoder.
///
/// Output is either the all-zero vector (no tokens) or L2-normalized.
/// The same text always produces the same vector.
#[derive(Debug, Clone)]
pub struct BasinEncoder {
    dim: usize,
}

impl Default for BasinEncoder {
    fn default() -> Self {
        Self { dim: BASIN_DIM }
    }
}

impl BasinEncoder {
    /// Create an encoder with the given dimension
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    /// Embedding dimension
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Encode text into a basin vector.
    ///
    /// Tokenizes on non-alphanumeric boundaries (lowercased), hashes each
    /// token, and accumulates a signed unit contribution into the bucket
    /// selected by the hash. The accumulator is L2-normalized unless it is
    /// entirely zero (empty or non-alphanumeric input).
    pub fn encode(&self, text: &str) -> Vec<f32> {
        let mut vec = vec![0.0f32; self.dim];

        for token in tokenize(text) {
            let digest = Sha256::digest(token.as_bytes());
            let bucket =
                u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]) as usize
                    % self.dim;
            let sign = if digest[4] & 1 == 0 { 1.0 } else { -1.0 };
            vec[bucket] += sign;
        }

        let norm = l2_norm(&vec);
        if norm > 0.0 {
            for v in &mut vec {
                *v = (f64::from(*v) / norm) as f32;
            }
        }
        vec
    }

    /// Encode a batch of texts, preserving order.
    pub fn encode_batch<'a, I>(&self, texts: I) -> Vec<Vec<f32>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        texts.into_iter().map(|t| self.encode(t)).collect()
    }
}

/// Lowercased alphanumeric tokens, split on everything else
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

pub(crate) fn l2_norm(v: &[f32]) -> f64 {
    v.iter().map(|x| f64::from(*x) * f64::from(*x)).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_zero_vector() {
        let encoder = BasinEncoder::default();
        let basin = encoder.encode("");
        assert_eq!(basin.len(), BASIN_DIM);
        assert!(basin.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_non_alphanumeric_text_is_zero_vector() {
        let encoder = BasinEncoder::default();
        let basin = encoder.encode("!!! --- ...");
        assert!(basin.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_nonempty_text_is_unit_norm() {
        let encoder = BasinEncoder::default();
        let basin = encoder.encode("quantum information geometry");
        let norm = l2_norm(&basin);
        assert!((norm - 1.0).abs() < 1e-5, "norm was {norm}");
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let encoder = BasinEncoder::default();
        assert_eq!(
            encoder.encode("stable basin vectors"),
            encoder.encode("stable basin vectors")
        );
    }

    #[test]
    fn test_case_and_punctuation_insensitive() {
        let encoder = BasinEncoder::default();
        assert_eq!(
            encoder.encode("Rust, Async! Runtime?"),
            encoder.encode("rust async runtime")
        );
    }

    #[test]
    fn test_custom_dimension() {
        let encoder = BasinEncoder::new(32);
        assert_eq!(encoder.encode("git commit workflow").len(), 32);
    }

    #[test]
    fn test_batch_encode_preserves_order() {
        let encoder = BasinEncoder::default();
        let batch = encoder.encode_batch(["alpha", "beta"]);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], encoder.encode("alpha"));
        assert_eq!(batch[1], encoder.encode("beta"));
    }
}
