//! Application state for the chatbot server

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

use crate::chat::{Orchestrator, SessionStore};
use crate::config::StockmateConfig;
use crate::database::runner_from_config;
use crate::error::Result;
use crate::feedback::FeedbackLog;
use crate::providers::{CompletionClient, EmbeddingProvider, OnnxEmbedder};
use crate::retrieval::ChunkRetriever;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: StockmateConfig,
    /// Turn pipeline
    orchestrator: Orchestrator,
    /// Live chat sessions
    sessions: SessionStore,
    /// Durable feedback log
    feedback: FeedbackLog,
    /// Ready state
    ready: RwLock<bool>,
}

impl AppState {
    /// Create new application state
    ///
    /// Retrieval failures are not fatal: the server then answers without
    /// policy context.
    pub async fn new(config: StockmateConfig) -> Result<Self> {
        tracing::info!(
            "Initializing StockMate (database backend: {:?})...",
            config.database.backend
        );

        let retriever = match load_retriever(&config).await {
            Ok(retriever) => Some(Arc::new(retriever)),
            Err(e) => {
                tracing::warn!("Retrieval unavailable: {}", e);
                None
            }
        };

        let completion = Arc::new(CompletionClient::new(&config.completion)?);
        tracing::info!("Completion client ready (model: {})", config.completion.model);

        let runner = runner_from_config(&config.database)?;
        tracing::info!("Query runner: {}", runner.name());

        let orchestrator = Orchestrator::new(&config, completion, retriever, runner)?;
        let feedback = FeedbackLog::open(&config.feedback.log_path)?;

        let state = Self::from_parts(config, orchestrator, feedback);
        state.set_ready(true);

        tracing::info!("StockMate initialized");
        Ok(state)
    }

    /// Assemble state from already built components
    pub fn from_parts(
        config: StockmateConfig,
        orchestrator: Orchestrator,
        feedback: FeedbackLog,
    ) -> Self {
        let sessions = SessionStore::new(Duration::from_secs(config.session.idle_ttl_secs));
        Self {
            inner: Arc::new(AppStateInner {
                config,
                orchestrator,
                sessions,
                feedback,
                ready: RwLock::new(false),
            }),
        }
    }

    pub fn config(&self) -> &StockmateConfig {
        &self.inner.config
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.inner.orchestrator
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    pub fn feedback(&self) -> &FeedbackLog {
        &self.inner.feedback
    }

    /// Check if ready
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Set ready state
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }
}

async fn load_retriever(config: &StockmateConfig) -> Result<ChunkRetriever> {
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OnnxEmbedder::new(&config.embeddings).await?);
    ChunkRetriever::load(&config.retrieval, embedder)
}
