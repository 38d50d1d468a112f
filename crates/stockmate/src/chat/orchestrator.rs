//! Per-turn conversation pipeline
//!
//! A turn runs small-talk detection, then retrieval, SQL generation and
//! execution, and the policy answer, in that order. Every failure on the way
//! ends up as text inside the reply.

use std::sync::Arc;
use std::time::Instant;

use crate::config::StockmateConfig;
use crate::database::{QueryError, QueryRunner};
use crate::error::{Error, Result};
use crate::generation::{AnswerGenerator, SqlGenerator};
use crate::providers::CompletionProvider;
use crate::retrieval::ChunkRetriever;
use crate::types::chunk::build_context;
use crate::types::{ChatTurn, Chunk, QueryTable};

use super::session::Session;
use super::small_talk::SmallTalkDetector;

const NO_RECORDS: &str = "ℹ️ No matching records found in the database.";
const NOT_GENERATED: &str = "❌ Could not generate SQL query.";

/// Result of the SQL half of a turn
#[derive(Debug)]
pub enum SqlOutcome {
    /// The query returned rows
    Rows(QueryTable),
    /// The query ran and returned nothing
    Empty,
    /// No SQL could be produced from the question
    NotGenerated,
    /// The database was unreachable
    ConnectionFailed,
    /// The database rejected the statement
    QueryFailed(QueryError),
    /// The bridge failed before a statement was run
    Failed(Error),
}

impl SqlOutcome {
    /// Text of the SQL section of the reply
    pub fn render(&self) -> String {
        match self {
            SqlOutcome::Rows(table) => format!("🗃️ From Database:\n\n{}", table.to_markdown()),
            SqlOutcome::Empty => NO_RECORDS.to_string(),
            SqlOutcome::NotGenerated => NOT_GENERATED.to_string(),
            SqlOutcome::ConnectionFailed => QueryError::Connection.to_string(),
            SqlOutcome::QueryFailed(e) => format!("❌ SQL Error:\n\n{}", e),
            SqlOutcome::Failed(e) => format!("❌ Error running SQL query: {}", e),
        }
    }
}

/// Join the SQL section and the policy answer into one reply
pub fn combine(sql_section: &str, answer: &str) -> String {
    let mut reply = sql_section.to_string();
    if !answer.is_empty() {
        reply.push_str("\n\n📄 From Policy Document:\n\n");
        reply.push_str(answer);
    }
    reply.trim().to_string()
}

/// Runs chat turns
pub struct Orchestrator {
    small_talk: SmallTalkDetector,
    retriever: Option<Arc<ChunkRetriever>>,
    sql: SqlGenerator,
    answers: AnswerGenerator,
    runner: Arc<dyn QueryRunner>,
    top_k: usize,
}

impl Orchestrator {
    /// Build an orchestrator
    ///
    /// `retriever` is `None` when the index could not be loaded; turns then
    /// run without policy context.
    pub fn new(
        config: &StockmateConfig,
        completion: Arc<dyn CompletionProvider>,
        retriever: Option<Arc<ChunkRetriever>>,
        runner: Arc<dyn QueryRunner>,
    ) -> Result<Self> {
        Ok(Self {
            small_talk: SmallTalkDetector::new(&config.small_talk)?,
            retriever,
            sql: SqlGenerator::new(
                Arc::clone(&completion),
                config.completion.sql,
                config.sql.rewrites.clone(),
            ),
            answers: AnswerGenerator::new(completion, config.completion.answer),
            runner,
            top_k: config.retrieval.top_k,
        })
    }

    pub fn retrieval_available(&self) -> bool {
        self.retriever.is_some()
    }

    pub fn runner_name(&self) -> &str {
        self.runner.name()
    }

    /// Count the question, answer it and append the turn to the session
    ///
    /// Returns the index of the new turn.
    pub async fn handle_turn(&self, session: &mut Session, question: &str) -> usize {
        session.query_count += 1;
        let turn = self.reply(question).await;
        session.push_turn(turn)
    }

    /// Answer one question
    pub async fn reply(&self, question: &str) -> ChatTurn {
        let start = Instant::now();

        if self.small_talk.is_small_talk(question) {
            tracing::info!("Small talk detected, sending canned reply");
            return ChatTurn::new(question, self.small_talk.reply(), Vec::new());
        }

        tracing::info!("Processing question: {}", question);

        let chunks = self.retrieve(question).await;
        let context = build_context(&chunks);

        let sql_outcome = self.run_sql(question).await;
        let sql_section = sql_outcome.render();

        let answer = if context.is_empty() {
            String::new()
        } else {
            self.answers.generate_answer(question, &context).await
        };

        tracing::info!(
            "Turn answered in {}ms ({} chunks)",
            start.elapsed().as_millis(),
            chunks.len()
        );

        ChatTurn::new(question, combine(&sql_section, &answer), chunks)
    }

    async fn retrieve(&self, question: &str) -> Vec<Chunk> {
        let Some(retriever) = &self.retriever else {
            tracing::warn!("Retrieval unavailable, answering without policy context");
            return Vec::new();
        };

        match retriever.search(question, self.top_k).await {
            Ok(chunks) => chunks,
            Err(e) => {
                tracing::warn!("Retrieval failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Generate SQL for the question and run it
    pub async fn run_sql(&self, question: &str) -> SqlOutcome {
        let sql = match self.sql.generate_sql(question).await {
            Ok(Some(sql)) => sql,
            Ok(None) => return SqlOutcome::NotGenerated,
            Err(e) => {
                tracing::warn!("SQL generation failed: {}", e);
                return SqlOutcome::Failed(e);
            }
        };

        let start = Instant::now();
        match self.runner.run(sql.as_str()).await {
            Ok(table) if table.is_empty() => SqlOutcome::Empty,
            Ok(table) => {
                tracing::debug!(
                    "Query returned {} rows in {}ms",
                    table.rows.len(),
                    start.elapsed().as_millis()
                );
                SqlOutcome::Rows(table)
            }
            Err(QueryError::Connection) => SqlOutcome::ConnectionFailed,
            Err(e) => {
                tracing::warn!("Query failed: {}", e);
                SqlOutcome::QueryFailed(e)
            }
        }
    }
}
