//! Reference text chunks served by the vector index

use serde::{Deserialize, Serialize};

/// A retrieved unit of reference text
///
/// Chunks are produced when the index is built and only read here. The
/// position of a chunk in the metadata file is its vector id in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk text
    pub content: String,
    /// Identifier of the originating document
    pub source: String,
}

impl Chunk {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
        }
    }
}

/// Join chunk contents into the context passed to the answer prompt
pub fn build_context(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(|c| c.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
