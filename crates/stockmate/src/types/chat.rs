//! Chat turn types

use serde::{Deserialize, Serialize};

use super::chunk::Chunk;

/// One user/bot exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// The user's question as typed
    pub question: String,
    /// The combined reply
    pub answer: String,
    /// Chunks retrieved for the question (empty for small talk)
    pub chunks: Vec<Chunk>,
}

impl ChatTurn {
    pub fn new(question: impl Into<String>, answer: impl Into<String>, chunks: Vec<Chunk>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            chunks,
        }
    }
}

/// Chat request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The question to answer
    pub question: String,
}

/// Reply to a chat request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Position of the turn in the session history
    pub turn_index: usize,
    /// The recorded turn
    pub turn: ChatTurn,
    /// Queries asked in this session so far
    pub query_count: u64,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}
