//! Local feature-hashing embedder
//!
//! Character n-grams of the compacted text are hashed into a fixed number of
//! signed buckets and the result is L2-normalised. Needs no model files, and
//! the same text always yields the same vector across processes.

use super::{Embedder, Embedding};
use crate::catalog::compact;
use crate::error::RouterError;
use crate::Result;
use sha2::{Digest, Sha256};

const MAX_NGRAM: usize = 3;

#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(RouterError::EmbeddingError(
                "embedding dimension must be positive".to_string(),
            ));
        }
        Ok(Self { dimension })
    }

    fn bucket(&self, gram: &str) -> (usize, f32) {
        let digest = Sha256::digest(gram.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);

        let index = (u64::from_le_bytes(head) % self.dimension as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        (index, sign)
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dimension: super::DEFAULT_DIMENSION,
        }
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, text: &str) -> Result<Embedding> {
        let chars: Vec<char> = compact(text).chars().collect();
        let mut vector = vec![0.0f32; self.dimension];

        for n in 1..=MAX_NGRAM {
            // longer grams carry more phrase information
            let weight = n as f32;
            for window in chars.windows(n) {
                let gram: String = window.iter().collect();
                let (index, sign) = self.bucket(&gram);
                vector[index] += sign * weight;
            }
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            vector.iter_mut().for_each(|v| *v /= norm);
        }

        Ok(vector)
    }

    fn model_name(&self) -> &str {
        "hashed-char-ngram"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
