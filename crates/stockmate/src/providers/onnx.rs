//! Local sentence-transformers embeddings through ONNX Runtime
//!
//! Runs all-MiniLM-L6-v2 with mean pooling and L2 normalization, matching
//! the embeddings the vector index was built with.

use async_trait::async_trait;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use tokenizers::Tokenizer;

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;

/// ONNX model session plus tokenizer
struct OnnxModel {
    session: Session,
    tokenizer: Tokenizer,
    max_length: usize,
}

/// ONNX-based query embedder
pub struct OnnxEmbedder {
    model: Arc<Mutex<OnnxModel>>,
    dimensions: usize,
}

impl OnnxEmbedder {
    /// Load the model, downloading model and tokenizer files on first use
    pub async fn new(config: &EmbeddingConfig) -> Result<Self> {
        tracing::info!("Loading embedding model: {}", config.model);

        let model_dir = config.cache_dir.join(&config.model);
        std::fs::create_dir_all(&model_dir).map_err(|e| {
            Error::Config(format!("Failed to create cache directory: {}", e))
        })?;

        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        if !model_path.exists() {
            download(&config.model, "onnx/model.onnx", &model_path).await?;
        }
        if !tokenizer_path.exists() {
            download(&config.model, "tokenizer.json", &tokenizer_path).await?;
        }

        let session = Session::builder()
            .map_err(|e| Error::embedding(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| Error::embedding(format!("Failed to set optimization level: {}", e)))?
            .with_intra_threads(4)
            .map_err(|e| Error::embedding(format!("Failed to set threads: {}", e)))?
            .commit_from_file(&model_path)
            .map_err(|e| Error::embedding(format!("Failed to load model: {}", e)))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| Error::embedding(format!("Failed to load tokenizer: {}", e)))?;

        tracing::info!("Embedding model loaded ({} dimensions)", config.dimensions);

        Ok(Self {
            model: Arc::new(Mutex::new(OnnxModel {
                session,
                tokenizer,
                max_length: config.max_length,
            })),
            dimensions: config.dimensions,
        })
    }
}

impl OnnxModel {
    fn embed(&mut self, text: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| Error::embedding(format!("Tokenization failed: {}", e)))?;

        let len = encoding.get_ids().len().min(self.max_length);
        let to_i64 = |values: &[u32]| -> Vec<i64> {
            values.iter().take(len).map(|&v| v as i64).collect()
        };
        let input_ids = to_i64(encoding.get_ids());
        let attention_mask = to_i64(encoding.get_attention_mask());
        let token_type_ids = to_i64(encoding.get_type_ids());

        let tensor = |data: Vec<i64>| {
            Tensor::from_array((vec![1usize, len], data.into_boxed_slice()))
                .map_err(|e| Error::embedding(format!("Tensor creation failed: {}", e)))
        };

        let inputs = vec![
            ("input_ids", tensor(input_ids)?.into_dyn()),
            ("attention_mask", tensor(attention_mask.clone())?.into_dyn()),
            ("token_type_ids", tensor(token_type_ids)?.into_dyn()),
        ];

        let outputs = self
            .session
            .run(inputs)
            .map_err(|e| Error::embedding(format!("Inference failed: {}", e)))?;

        let output_iter: Vec<_> = outputs.iter().collect();
        let output = output_iter
            .iter()
            .find(|(name, _)| *name == "last_hidden_state")
            .or_else(|| output_iter.first())
            .map(|(_, v)| v)
            .ok_or_else(|| Error::embedding("No output tensor"))?;

        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::embedding(format!("Failed to extract tensor: {}", e)))?;

        let dims: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
        let hidden = dims
            .get(2)
            .copied()
            .ok_or_else(|| Error::embedding(format!("Unexpected output shape {:?}", dims)))?;

        Ok(mean_pool(data, &attention_mask, hidden))
    }
}

/// Attention-masked mean over token states, then L2 normalization
fn mean_pool(hidden_states: &[f32], attention_mask: &[i64], hidden: usize) -> Vec<f32> {
    let mut pooled = vec![0.0f32; hidden];
    let mut count = 0.0f32;

    for (token, &mask) in attention_mask.iter().enumerate() {
        if mask == 0 {
            continue;
        }
        let offset = token * hidden;
        if let Some(state) = hidden_states.get(offset..offset + hidden) {
            for (acc, value) in pooled.iter_mut().zip(state) {
                *acc += value;
            }
            count += 1.0;
        }
    }

    if count > 0.0 {
        pooled.iter_mut().for_each(|v| *v /= count);
    }

    let norm: f32 = pooled.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        pooled.iter_mut().for_each(|v| *v /= norm);
    }

    pooled
}

#[async_trait]
impl EmbeddingProvider for OnnxEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        // Inference is CPU bound, keep it off the async workers
        let model = Arc::clone(&self.model);
        let text = text.to_string();
        tokio::task::spawn_blocking(move || model.lock().embed(&text))
            .await
            .map_err(|e| Error::internal(format!("Task join error: {}", e)))?
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "onnx"
    }
}

/// Download one file of a sentence-transformers model from HuggingFace
async fn download(model_name: &str, file: &str, path: &Path) -> Result<()> {
    let url = format!(
        "https://huggingface.co/sentence-transformers/{}/resolve/main/{}",
        model_name, file
    );

    tracing::info!("Downloading {}", url);

    let response = reqwest::get(&url)
        .await
        .map_err(|e| Error::embedding(format!("Failed to download {}: {}", file, e)))?;

    if !response.status().is_success() {
        return Err(Error::embedding(format!(
            "Download of {} failed: HTTP {}",
            file,
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::embedding(format!("Failed to read {}: {}", file, e)))?;

    tokio::fs::write(path, &bytes).await?;

    tracing::info!("Saved {} ({} bytes)", path.display(), bytes.len());

    Ok(())
}
