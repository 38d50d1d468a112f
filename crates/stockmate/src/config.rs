//! Configuration for the chatbot

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable naming a TOML configuration file
pub const CONFIG_PATH_ENV: &str = "STOCKMATE_CONFIG";

/// Environment variable holding the completion API key
pub const API_KEY_ENV: &str = "TOGETHER_API_KEY";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StockmateConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Embedding model configuration
    pub embeddings: EmbeddingConfig,
    /// Vector index and metadata locations
    pub retrieval: RetrievalConfig,
    /// Remote completion endpoint configuration
    pub completion: CompletionConfig,
    /// Natural-language-to-SQL configuration
    pub sql: SqlConfig,
    /// Inventory database configuration
    pub database: DatabaseConfig,
    /// Feedback log configuration
    pub feedback: FeedbackConfig,
    /// Small-talk patterns and canned reply
    pub small_talk: SmallTalkConfig,
    /// Chat session lifecycle
    pub session: SessionConfig,
}

impl StockmateConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Load configuration from `STOCKMATE_CONFIG` (or defaults) and apply
    /// environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(PathBuf::from(path))?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.completion.api_key = Some(key);
            }
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// sentence-transformers model name
    pub model: String,
    /// Embedding dimensions (384 for MiniLM)
    pub dimensions: usize,
    /// Maximum sequence length
    pub max_length: usize,
    /// Cache directory for model and tokenizer files
    pub cache_dir: PathBuf,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "all-MiniLM-L6-v2".to_string(),
            dimensions: 384,
            max_length: 256,
            cache_dir: dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("stockmate")
                .join("models"),
        }
    }
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// FAISS flat index file
    pub index_path: PathBuf,
    /// JSON array of `{content, source}` chunks, aligned with index ids
    pub metadata_path: PathBuf,
    /// Chunks retrieved per question
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from("faissindexIDB.index"),
            metadata_path: PathBuf::from("metadataIDB.json"),
            top_k: 3,
        }
    }
}

/// Decoding parameters for one kind of completion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecodingParams {
    /// Upper bound on generated tokens
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

/// Remote completion endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Base URL; requests go to `{api_base}/completions`
    pub api_base: String,
    /// Bearer token (usually supplied through `TOGETHER_API_KEY`)
    pub api_key: Option<String>,
    /// Model name sent with every request
    pub model: String,
    /// Request timeout in seconds; unset means wait indefinitely
    pub timeout_secs: Option<u64>,
    /// Decoding for SQL generation
    pub sql: DecodingParams,
    /// Decoding for policy answers
    pub answer: DecodingParams,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.together.xyz/v1".to_string(),
            api_key: None,
            model: "mistralai/Mixtral-8x7B-Instruct-v0.1".to_string(),
            timeout_secs: None,
            sql: DecodingParams {
                max_tokens: 150,
                temperature: 0.3,
            },
            answer: DecodingParams {
                max_tokens: 800,
                temperature: 0.7,
            },
        }
    }
}

/// A question rewrite applied before SQL prompt construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRewrite {
    /// Lower-case phrase that triggers the rewrite
    pub contains: String,
    /// Replacement for the whole question
    pub replacement: String,
}

/// Natural-language-to-SQL configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlConfig {
    /// Rewrites checked in order; the first match wins
    pub rewrites: Vec<QueryRewrite>,
}

impl Default for SqlConfig {
    fn default() -> Self {
        Self {
            rewrites: vec![QueryRewrite {
                contains: "who are the employees".to_string(),
                replacement: "who are all the employees in the warehouse".to_string(),
            }],
        }
    }
}

/// Database backend selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    /// SQLite file opened read-only; generated T-SQL such as `TOP` fails here
    Sqlite,
    /// Microsoft SQL Server (requires the `mssql` feature)
    #[default]
    Mssql,
}

/// Inventory database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Backend used by the query runner
    pub backend: DatabaseBackend,
    /// SQLite database file
    pub sqlite_path: PathBuf,
    /// ADO.NET connection string for SQL Server
    pub connection_string: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::Mssql,
            sqlite_path: PathBuf::from("inventory.db"),
            connection_string:
                "server=tcp:localhost,1433;database=inventory;IntegratedSecurity=true;TrustServerCertificate=true"
                    .to_string(),
        }
    }
}

/// Feedback log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// CSV log file
    pub log_path: PathBuf,
    /// Trailing window covered by the spreadsheet export
    pub export_window_days: i64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("chatbot_logs.csv"),
            export_window_days: 30,
        }
    }
}

/// Small-talk detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmallTalkConfig {
    /// Regular expressions matched against the lower-cased question
    pub patterns: Vec<String>,
    /// Reply sent when any pattern matches
    pub reply: String,
}

impl Default for SmallTalkConfig {
    fn default() -> Self {
        Self {
            patterns: vec![
                r"\b(hi|hello|hey|how are you|how’s it going|what's up|good morning|good evening|how are you doing|how r u|what's new|what's happening|good night)\b".to_string(),
                r"\b(thank(s| you)|bye|see you|take care)\b".to_string(),
                r"\b(what are you doing|did you eat|have you eaten|how's your day|what time is it|who made you)\b".to_string(),
            ],
            reply: "Hello! I'm a chatbot, and I'm here to help! Ask me anything about inventory data or inventory policies.".to_string(),
        }
    }
}

/// Chat session lifecycle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Sessions idle longer than this are discarded
    pub idle_ttl_secs: u64,
    /// How often expired sessions are swept
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_ttl_secs: 60 * 60,
            sweep_interval_secs: 60,
        }
    }
}
