//! Top-k chunk retrieval over the prebuilt index

use std::path::Path;
use std::sync::Arc;

use crate::config::RetrievalConfig;
use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::types::Chunk;

use super::faiss::FlatIndex;

/// Embeds questions and looks up the closest chunks
pub struct ChunkRetriever {
    index: FlatIndex,
    chunks: Vec<Chunk>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl ChunkRetriever {
    /// Load the index and metadata files named in the config
    pub fn load(config: &RetrievalConfig, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        let index = FlatIndex::read(&config.index_path)?;
        let chunks = load_metadata(&config.metadata_path)?;

        if index.len() != chunks.len() {
            tracing::warn!(
                "Index holds {} vectors but metadata has {} chunks; extra ids are ignored",
                index.len(),
                chunks.len()
            );
        }
        if index.dimensions() != embedder.dimensions() {
            return Err(Error::Config(format!(
                "Index has {} dimensions but embedder '{}' produces {}",
                index.dimensions(),
                embedder.name(),
                embedder.dimensions()
            )));
        }

        tracing::info!(
            "Loaded vector index {} ({} vectors, {:?}) and {} chunks",
            config.index_path.display(),
            index.len(),
            index.metric(),
            chunks.len()
        );

        Ok(Self::from_parts(index, chunks, embedder))
    }

    pub fn from_parts(
        index: FlatIndex,
        chunks: Vec<Chunk>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            index,
            chunks,
            embedder,
        }
    }

    /// Number of chunks in the metadata store
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Embed `query` and return up to `top_k` chunks, most similar first
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<Chunk>> {
        let embedding = self.embedder.embed(query).await?;
        let neighbors = self.index.search(&embedding, top_k)?;

        Ok(neighbors
            .into_iter()
            .filter_map(|n| self.chunks.get(n.id).cloned())
            .collect())
    }
}

fn load_metadata(path: &Path) -> Result<Vec<Chunk>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::index(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| Error::index(format!("Invalid metadata in {}: {}", path.display(), e)))
}
