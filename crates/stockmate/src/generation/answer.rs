//! Context-grounded answer bridge

use std::sync::Arc;

use crate::config::DecodingParams;
use crate::providers::{CompletionOutcome, CompletionProvider};

use super::prompt::PromptBuilder;

/// Answers questions from retrieved policy context
///
/// Never fails: endpoint problems come back as warning text in the answer.
pub struct AnswerGenerator {
    provider: Arc<dyn CompletionProvider>,
    params: DecodingParams,
}

impl AnswerGenerator {
    pub fn new(provider: Arc<dyn CompletionProvider>, params: DecodingParams) -> Self {
        Self { provider, params }
    }

    pub async fn generate_answer(&self, question: &str, context: &str) -> String {
        let prompt = PromptBuilder::build_answer_prompt(question, context);

        match self.provider.complete(&prompt, self.params).await {
            Ok(CompletionOutcome::Text(text)) => {
                PromptBuilder::strip_instruction_echo(&text).trim().to_string()
            }
            Ok(CompletionOutcome::Rejected { status, body }) => {
                tracing::warn!("Answer generation rejected with HTTP {}", status);
                format!("⚠️ Error {}: {}", status, body)
            }
            Err(e) => {
                tracing::warn!("Answer generation failed: {}", e);
                format!("⚠️ Error: {}", e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompletionConfig;
    use crate::testing::ScriptedCompletion;

    fn generator(completion: ScriptedCompletion) -> AnswerGenerator {
        AnswerGenerator::new(Arc::new(completion), CompletionConfig::default().answer)
    }

    #[tokio::test]
    async fn test_answer_strips_echo() {
        let generator = generator(ScriptedCompletion::default().with_answer(
            CompletionOutcome::Text("[INST] ... [/INST]\n- Returns accepted within **30 days**\n".into()),
        ));

        let answer = generator.generate_answer("return window?", "Returns: 30 days").await;
        assert_eq!(answer, "- Returns accepted within **30 days**");
    }

    #[tokio::test]
    async fn test_answer_rejected_becomes_text() {
        let generator = generator(ScriptedCompletion::default().with_answer(
            CompletionOutcome::Rejected {
                status: 500,
                body: "internal failure".into(),
            },
        ));

        let answer = generator.generate_answer("q", "ctx").await;
        assert_eq!(answer, "⚠️ Error 500: internal failure");
    }

    #[tokio::test]
    async fn test_answer_transport_error_becomes_text() {
        let generator = generator(ScriptedCompletion::default().failing());

        let answer = generator.generate_answer("q", "ctx").await;
        assert!(answer.starts_with("⚠️ Error: "));
    }
}
