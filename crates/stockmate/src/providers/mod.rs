//! Provider abstractions for embeddings and text completion

pub mod completion;
pub mod embedding;
pub mod onnx;
pub mod together;

pub use completion::{CompletionOutcome, CompletionProvider};
pub use embedding::EmbeddingProvider;
pub use onnx::OnnxEmbedder;
pub use together::CompletionClient;
