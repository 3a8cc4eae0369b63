//! Embedding provider trait and vector codecs.
//!
//! Concrete providers (OpenAI, disabled) live in the `news-harness`
//! application crate; the core only needs the trait plus the BLOB
//! codecs shared with the SQLite store.

use async_trait::async_trait;

use crate::error::Result;

/// An external service that converts text to a fixed-length dense
/// vector.
///
/// Calls may fail or be rate-limited; implementations are expected to
/// bound each call with a timeout and surface exhaustion as an error
/// rather than hanging. Retry policy, if any, belongs here — the
/// retrieval core never retries.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text. Repeated calls on identical text must yield
    /// comparable vectors (exact reproducibility is not required).
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Returns the model identifier (e.g. `"text-embedding-3-small"`).
    fn model_name(&self) -> &str;

    /// Returns the embedding vector dimensionality (e.g. `1536`).
    fn dims(&self) -> usize;
}

/// Encode a float vector as a BLOB (little-endian f32 bytes).
///
/// Each `f32` is stored as 4 bytes in little-endian order, producing
/// a BLOB of `vec.len() × 4` bytes.
///
/// # Example
///
/// ```rust
/// use news_harness_core::embedding::{vec_to_blob, blob_to_vec};
///
/// let v = vec![1.0f32, -2.5, 3.125];
/// let blob = vec_to_blob(&v);
/// assert_eq!(blob.len(), 12); // 3 × 4 bytes
/// assert_eq!(blob_to_vec(&blob), v);
/// ```
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vec.len() * 4);
    for &v in vec {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decode a BLOB back into a float vector.
///
/// Reverses [`vec_to_blob`]: reads 4-byte little-endian `f32` values
/// from the byte slice.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_blob_roundtrip() {
        let vec = vec![1.0f32, -2.5, 3.125, 0.0, -0.001];
        let blob = vec_to_blob(&vec);
        let restored = blob_to_vec(&blob);
        assert_eq!(vec, restored);
    }

    #[test]
    fn test_blob_ignores_trailing_bytes() {
        let mut blob = vec_to_blob(&[1.0f32]);
        blob.push(0xff);
        assert_eq!(blob_to_vec(&blob), vec![1.0f32]);
    }
}
