//! Core domain types, error taxonomy, grid rendering and similarity
//! for slide-deck extraction and retrieval.

pub mod error;
pub mod export;
pub mod grid;
pub mod normalize;
pub mod similarity;
pub mod types;

pub use error::{Error, Result};
pub use grid::Grid;
pub use normalize::TextNormalizer;
pub use similarity::cosine_similarity;
pub use types::{
    BoundingBox, Document, DocumentMetadata, Entity, EntityKind, ExtractionConfig,
    ExtractionMethod, Slide,
};
