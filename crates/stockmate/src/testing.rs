//! Stub providers shared by unit tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::DecodingParams;
use crate::database::{QueryError, QueryRunner};
use crate::error::{Error, Result};
use crate::providers::{CompletionOutcome, CompletionProvider, EmbeddingProvider};
use crate::types::QueryTable;

/// Returns the same vector for every text
pub(crate) struct StubEmbedder {
    vector: Vec<f32>,
    fail: bool,
}

impl StubEmbedder {
    pub fn new(vector: Vec<f32>) -> Self {
        Self {
            vector,
            fail: false,
        }
    }

    pub fn failing(dimensions: usize) -> Self {
        Self {
            vector: vec![0.0; dimensions],
            fail: true,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        if self.fail {
            return Err(Error::embedding("stub embedder failure"));
        }
        Ok(self.vector.clone())
    }

    fn dimensions(&self) -> usize {
        self.vector.len()
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// Answers SQL prompts and answer prompts with fixed outcomes
pub(crate) struct ScriptedCompletion {
    sql: CompletionOutcome,
    answer: CompletionOutcome,
    fail: bool,
    prompts: Mutex<Vec<String>>,
}

impl Default for ScriptedCompletion {
    fn default() -> Self {
        Self {
            sql: CompletionOutcome::Text("SELECT item_name, quantity FROM Inventory".into()),
            answer: CompletionOutcome::Text("- Returns are accepted within 30 days".into()),
            fail: false,
            prompts: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedCompletion {
    pub fn with_sql(mut self, outcome: CompletionOutcome) -> Self {
        self.sql = outcome;
        self
    }

    pub fn with_answer(mut self, outcome: CompletionOutcome) -> Self {
        self.answer = outcome;
        self
    }

    /// Every call fails like an unreachable endpoint
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn answer_calls(&self) -> usize {
        self.prompts
            .lock()
            .iter()
            .filter(|p| !p.contains("T-SQL expert"))
            .count()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedCompletion {
    async fn complete(&self, prompt: &str, _params: DecodingParams) -> Result<CompletionOutcome> {
        self.prompts.lock().push(prompt.to_string());
        if self.fail {
            return Err(Error::completion("connection refused"));
        }
        if prompt.contains("T-SQL expert") {
            Ok(self.sql.clone())
        } else {
            Ok(self.answer.clone())
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }
}

/// Returns a fixed result and counts executed statements
pub(crate) struct StubRunner {
    result: std::result::Result<QueryTable, QueryError>,
    calls: AtomicUsize,
    statements: Mutex<Vec<String>>,
}

impl StubRunner {
    pub fn new(result: std::result::Result<QueryTable, QueryError>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
            statements: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().clone()
    }
}

#[async_trait]
impl QueryRunner for StubRunner {
    async fn run(&self, sql: &str) -> std::result::Result<QueryTable, QueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.statements.lock().push(sql.to_string());
        self.result.clone()
    }

    fn name(&self) -> &str {
        "stub"
    }
}
