//! Token counting with a fixed BPE encoding.

use slidekit_core::{Error, Result};
use tiktoken_rs::CoreBPE;

/// Counts tokens with the `cl100k_base` encoding.
pub struct TokenCounter {
    bpe: CoreBPE,
}

impl TokenCounter {
    /// Load the `cl100k_base` encoding.
    pub fn cl100k() -> Result<Self> {
        let bpe = tiktoken_rs::cl100k_base()
            .map_err(|e| Error::DependencyMissing(format!("Failed to load tokenizer: {}", e)))?;
        Ok(Self { bpe })
    }

    /// Number of tokens in `text`. Special-token markers are counted as plain text.
    pub fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}

impl std::fmt::Debug for TokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCounter").field("encoding", &"cl100k_base").finish()
    }
}
