use std::hash::{Hash, Hasher};

use bookrag_core::error::{Error, Result};
use bookrag_core::traits::EmbeddingProvider;
use twox_hash::XxHash64;

/// Bag-of-tokens embedder: each lowercased whitespace token is hashed into a
/// bucket and the result is L2-normalized. Same text, same vector.
pub struct HashingEmbedder {
    dim: usize,
    id: String,
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim, id: format!("hashing:xxh64:d{}", dim) }
    }
}

impl EmbeddingProvider for HashingEmbedder {
    fn embedder_id(&self) -> &str {
        &self.id
    }

    fn dim(&self) -> Option<usize> {
        Some(self.dim)
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.dim == 0 {
            return Err(Error::Embedding("hashing embedder configured with dim 0".into()));
        }
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.to_lowercase().split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm == 0.0 {
            // Blank input has no tokens to place.
            return Ok(Vec::new());
        }
        for x in &mut v {
            *x /= norm;
        }
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_embeds_to_empty_vector() {
        let embedder = HashingEmbedder::new(16);
        assert!(embedder.embed("   ").expect("embed").is_empty());
    }

    #[test]
    fn case_does_not_change_the_vector() {
        let embedder = HashingEmbedder::new(32);
        let a = embedder.embed("Humanoid Balance").expect("embed");
        let b = embedder.embed("humanoid balance").expect("embed");
        assert_eq!(a, b);
    }
}
