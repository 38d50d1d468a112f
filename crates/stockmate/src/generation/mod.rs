//! SQL and answer generation through the completion endpoint

pub mod answer;
pub mod prompt;
pub mod sql;

pub use answer::AnswerGenerator;
pub use prompt::PromptBuilder;
pub use sql::{sanitize_sql, SqlGenerator, SqlQueryText};
