//! Core types for the chatbot

pub mod chat;
pub mod chunk;
pub mod feedback;
pub mod table;

pub use chat::{ChatRequest, ChatResponse, ChatTurn};
pub use chunk::Chunk;
pub use feedback::{FeedbackLabel, FeedbackRecord, FeedbackRequest};
pub use table::{CellValue, QueryTable};
