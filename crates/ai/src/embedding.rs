//! Text embedding providers.

use crate::config::ProviderConfig;
use crate::http::HttpClient;
use crate::retry::CancelToken;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use slidekit_core::{Error, Result};
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// Turns text into a fixed-dimension vector.
pub trait EmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

impl<T: EmbeddingProvider + ?Sized> EmbeddingProvider for &T {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text)
    }
}

impl<T: EmbeddingProvider + ?Sized> EmbeddingProvider for Box<T> {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text)
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: [&'a str; 1],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Embeddings from an OpenAI-compatible `/embeddings` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddings {
    http: HttpClient,
    model: String,
}

impl OpenAiEmbeddings {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        log::info!("Embedding client: {} at {}", config.embedding_model, config.base_url);
        Ok(Self {
            http: HttpClient::new(config)?,
            model: config.embedding_model.clone(),
        })
    }

    /// Abort in-flight retries when `cancel` fires.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.http.set_cancel_token(cancel);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl EmbeddingProvider for OpenAiEmbeddings {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: [text],
        };
        let response: EmbeddingResponse = self.http.post_json("embeddings", &request)?;
        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| Error::permanent(None, "Embedding response contained no data"))
    }
}

/// Memoizes another provider's vectors by exact text.
pub struct CachedEmbedder<E> {
    inner: E,
    cache: Mutex<LruCache<String, Vec<f32>>>,
}

impl<E: EmbeddingProvider> CachedEmbedder<E> {
    pub fn new(inner: E, capacity: NonZeroUsize) -> Self {
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: EmbeddingProvider> EmbeddingProvider for CachedEmbedder<E> {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if let Ok(mut cache) = self.cache.lock() {
            if let Some(hit) = cache.get(text) {
                log::debug!("Embedding cache hit ({} chars)", text.len());
                return Ok(hit.clone());
            }
        }

        let vector = self.inner.embed(text)?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(text.to_string(), vector.clone());
        }
        Ok(vector)
    }
}
