//! Remote model providers: embeddings, chat completions, image text
//! recognition, plus local token counting.
//!
//! Every network-facing type sits behind a small trait so callers can swap
//! in their own implementation.

pub mod chat;
pub mod config;
pub mod embedding;
mod http;
pub mod ocr;
pub mod retry;
pub mod tokens;

pub use chat::{ChatClient, ChatMessage, ChatProvider, OpenAiChat, Role};
pub use config::ProviderConfig;
pub use embedding::{CachedEmbedder, EmbeddingProvider, OpenAiEmbeddings};
pub use ocr::{image_extractor, ImageTextExtractor, TesseractOcr, VisionChartExtractor};
pub use retry::{CancelToken, RetryPolicy};
pub use tokens::TokenCounter;
