//! Embedding classifier (stage 2)
//!
//! Each intent with example utterances gets one reference vector, the mean
//! of its example embeddings. A query is assigned to the reference with the
//! highest cosine similarity, if that similarity clears the threshold.

use crate::catalog::IntentCatalog;
use crate::error::RouterError;
use crate::extractor::ParameterExtractor;
use crate::models::{ClassificationMethod, ClassificationResult};
use crate::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

pub mod hashing;
pub use hashing::HashingEmbedder;

pub const DEFAULT_DIMENSION: usize = 256;

pub type Embedding = Vec<f32>;

/// Synchronous text embedding backend
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Embedding>;

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    fn model_name(&self) -> &str;

    fn dimension(&self) -> usize;
}

pub type SharedEmbedder = Arc<dyn Embedder>;

/// Cosine similarity; 0.0 for mismatched, empty or zero-magnitude vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let (mut dot, mut mag_a, mut mag_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }
    let denom = mag_a.sqrt() * mag_b.sqrt();
    if denom < f64::EPSILON {
        0.0
    } else {
        (dot / denom).clamp(-1.0, 1.0)
    }
}

struct ReferenceEmbedding {
    intent_id: String,
    vector: Embedding,
}

pub struct EmbeddingClassifier {
    embedder: SharedEmbedder,
    catalog: Arc<IntentCatalog>,
    extractor: ParameterExtractor,
    /// Catalog order, intents without examples omitted
    references: Vec<ReferenceEmbedding>,
}

impl EmbeddingClassifier {
    /// Embeds every example utterance once and averages per intent
    pub fn new(embedder: SharedEmbedder, catalog: Arc<IntentCatalog>) -> Result<Self> {
        let dimension = embedder.dimension();
        let mut references = Vec::new();

        for intent in catalog.intents().filter(|i| !i.examples.is_empty()) {
            let examples: Vec<&str> = intent.examples.iter().map(String::as_str).collect();
            let vectors = embedder.embed_batch(&examples)?;

            if vectors.len() != examples.len() {
                return Err(RouterError::EmbeddingError(format!(
                    "expected {} embeddings for '{}', got {}",
                    examples.len(),
                    intent.id,
                    vectors.len()
                )));
            }

            references.push(ReferenceEmbedding {
                intent_id: intent.id.clone(),
                vector: mean_vector(&vectors, dimension)?,
            });
        }

        info!(
            model = embedder.model_name(),
            intents = references.len(),
            "Reference embeddings ready"
        );

        Ok(Self {
            extractor: ParameterExtractor::new(catalog.clone()),
            embedder,
            catalog,
            references,
        })
    }

    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    pub fn has_reference(&self, intent_id: &str) -> bool {
        self.references.iter().any(|r| r.intent_id == intent_id)
    }

    /// Best reference above `threshold`, or `None`
    pub fn classify(&self, query: &str, threshold: f64) -> Option<ClassificationResult> {
        if self.references.is_empty() {
            return None;
        }

        let start = Instant::now();

        let query_vector = match self.embedder.embed(query) {
            Ok(vector) => vector,
            Err(e) => {
                warn!("Query embedding failed: {}", e);
                return None;
            }
        };

        let mut best: Option<(&ReferenceEmbedding, f64)> = None;
        for reference in &self.references {
            let similarity = cosine_similarity(&query_vector, &reference.vector);
            if best.map_or(true, |(_, top)| similarity > top) {
                best = Some((reference, similarity));
            }
        }

        let (reference, similarity) = best?;
        if similarity < threshold {
            debug!(
                intent = %reference.intent_id,
                similarity,
                threshold,
                "Embedding similarity below threshold"
            );
            return None;
        }

        let intent = self.catalog.get(&reference.intent_id)?;
        let parameters = self.extractor.extract(query, &intent.id);

        Some(ClassificationResult::resolved(
            intent,
            similarity,
            ClassificationMethod::Embedding,
            parameters,
            start.elapsed().as_secs_f64() * 1000.0,
        ))
    }
}

fn mean_vector(vectors: &[Embedding], dimension: usize) -> Result<Embedding> {
    let mut sum = vec![0.0f32; dimension];

    for vector in vectors {
        if vector.len() != dimension {
            return Err(RouterError::EmbeddingError(format!(
                "embedding has dimension {}, expected {}",
                vector.len(),
                dimension
            )));
        }
        for (acc, value) in sum.iter_mut().zip(vector) {
            *acc += value;
        }
    }

    let count = vectors.len().max(1) as f32;
    Ok(sum.into_iter().map(|v| v / count).collect())
}
