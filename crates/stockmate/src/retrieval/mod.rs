//! Similarity search over the precomputed policy-document index

pub mod faiss;
pub mod search;

pub use faiss::{FlatIndex, Metric, Neighbor};
pub use search::ChunkRetriever;
