//! stockmate: inventory chatbot over a SQL database and policy documents
//!
//! Each question is answered twice over: a completion model translates it
//! into T-SQL that runs against the inventory database, and the same model
//! answers it from the policy-document chunks closest to the question in a
//! prebuilt vector index. Users rate replies into an append-only CSV log
//! that can be exported as a spreadsheet.

pub mod chat;
pub mod config;
pub mod database;
pub mod error;
pub mod feedback;
pub mod generation;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use config::StockmateConfig;
pub use error::{Error, Result};
pub use types::{
    chat::{ChatRequest, ChatResponse, ChatTurn},
    chunk::Chunk,
    feedback::{FeedbackLabel, FeedbackRecord},
    table::{CellValue, QueryTable},
};
