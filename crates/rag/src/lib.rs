//! Extraction, summarization and question answering over presentations.
//!
//! An [`Extractor`] produces a [`Document`](slidekit_core::Document); a
//! [`Summarizer`] borrows it and a [`Retriever`] owns it.

mod blob;
pub mod extractor;
pub mod retriever;
pub mod summarizer;

pub use extractor::Extractor;
pub use retriever::{qna_prompt, RetrievalMode, Retriever, DEFAULT_MIN_SIMILARITY, DEFAULT_TOP_K};
pub use summarizer::{
    deck_prompt, Summaries, Summarizer, Summary, SummaryMode, DEFAULT_SYSTEM_PROMPT,
};
