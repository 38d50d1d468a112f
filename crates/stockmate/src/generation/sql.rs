//! Natural-language-to-SQL bridge

use std::fmt;
use std::sync::Arc;

use crate::config::{DecodingParams, QueryRewrite};
use crate::error::Result;
use crate::providers::{CompletionOutcome, CompletionProvider};

use super::prompt::PromptBuilder;

/// A single sanitized SQL statement
///
/// Never contains `;`, `--` or `#` and is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlQueryText(String);

impl SqlQueryText {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SqlQueryText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SqlQueryText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Turns questions into T-SQL through the completion endpoint
pub struct SqlGenerator {
    provider: Arc<dyn CompletionProvider>,
    params: DecodingParams,
    rewrites: Vec<QueryRewrite>,
}

impl SqlGenerator {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        params: DecodingParams,
        rewrites: Vec<QueryRewrite>,
    ) -> Self {
        Self {
            provider,
            params,
            rewrites,
        }
    }

    /// Lower-case the question and apply the first matching rewrite
    pub fn normalize_question(&self, question: &str) -> String {
        let lowered = question.to_lowercase();
        self.rewrites
            .iter()
            .find(|r| lowered.contains(&r.contains))
            .map(|r| r.replacement.clone())
            .unwrap_or(lowered)
    }

    /// Generate one SQL statement for `question`
    ///
    /// `Ok(None)` when the endpoint rejects the request or the completion
    /// sanitizes to nothing.
    pub async fn generate_sql(&self, question: &str) -> Result<Option<SqlQueryText>> {
        let normalized = self.normalize_question(question);
        let prompt = PromptBuilder::build_sql_prompt(&normalized);

        match self.provider.complete(&prompt, self.params).await? {
            CompletionOutcome::Text(text) => {
                let sql = sanitize_sql(PromptBuilder::strip_instruction_echo(&text));
                match &sql {
                    Some(sql) => tracing::debug!("Generated SQL: {}", sql),
                    None => tracing::warn!("Completion contained no usable SQL"),
                }
                Ok(sql)
            }
            CompletionOutcome::Rejected { status, .. } => {
                tracing::warn!("SQL generation rejected with HTTP {}", status);
                Ok(None)
            }
        }
    }
}

fn cut_at_comment_or_terminator(text: &str) -> &str {
    let end = [";", "--", "#"]
        .iter()
        .filter_map(|marker| text.find(marker))
        .min()
        .unwrap_or(text.len());
    &text[..end]
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || "_.*,()=' \n><%-".contains(c)
}

/// Reduce a raw completion to one SQL statement
pub fn sanitize_sql(raw: &str) -> Option<SqlQueryText> {
    let statement = cut_at_comment_or_terminator(raw.trim());
    let filtered: String = statement
        .chars()
        .filter(|&c| is_allowed(c))
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect();
    // Removing characters can bring two dashes together
    let sql = cut_at_comment_or_terminator(&filtered).trim();

    if sql.is_empty() {
        None
    } else {
        Some(SqlQueryText(sql.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CompletionConfig, SqlConfig};
    use crate::testing::ScriptedCompletion;

    fn generator(completion: Arc<ScriptedCompletion>) -> SqlGenerator {
        SqlGenerator::new(
            completion,
            CompletionConfig::default().sql,
            SqlConfig::default().rewrites,
        )
    }

    #[test]
    fn test_sanitize_cuts_at_first_terminator() {
        let sql = sanitize_sql("SELECT * FROM Inventory; DROP TABLE Inventory").unwrap();
        assert_eq!(sql.as_str(), "SELECT * FROM Inventory");

        let sql = sanitize_sql("SELECT name FROM Inventory -- the names\nWHERE 1=1").unwrap();
        assert_eq!(sql.as_str(), "SELECT name FROM Inventory");

        let sql = sanitize_sql("SELECT 1 # comment").unwrap();
        assert_eq!(sql.as_str(), "SELECT 1");
    }

    #[test]
    fn test_sanitize_strips_characters_and_newlines() {
        let sql = sanitize_sql(
            "```sql\nSELECT TOP 5 item_name, quantity\nFROM Inventory\nWHERE item_category LIKE '%Electronics%'\n```",
        )
        .unwrap();
        assert_eq!(
            sql.as_str(),
            "sql SELECT TOP 5 item_name, quantity FROM Inventory WHERE item_category LIKE '%Electronics%'"
        );
    }

    #[test]
    fn test_sanitize_result_has_no_markers() {
        let sql = sanitize_sql("SELECT a -@- b FROM t").unwrap();
        assert_eq!(sql.as_str(), "SELECT a");
        for raw in ["a;b", "a--b", "a#b", "x - ! - y", "  SELECT [x]  "] {
            if let Some(sql) = sanitize_sql(raw) {
                assert!(!sql.as_str().contains(';'));
                assert!(!sql.as_str().contains("--"));
                assert!(!sql.as_str().contains('#'));
            }
        }
    }

    #[test]
    fn test_sanitize_empty() {
        assert_eq!(sanitize_sql(""), None);
        assert_eq!(sanitize_sql("   \n "), None);
        assert_eq!(sanitize_sql("; SELECT 1"), None);
        assert_eq!(sanitize_sql("```"), None);
    }

    #[test]
    fn test_normalize_question() {
        let generator = generator(Arc::new(ScriptedCompletion::default()));

        assert_eq!(
            generator.normalize_question("Who are the employees?"),
            "who are all the employees in the warehouse"
        );
        assert_eq!(
            generator.normalize_question("How Many Laptops?"),
            "how many laptops?"
        );
    }

    #[tokio::test]
    async fn test_generate_sql_uses_rewritten_question() {
        let completion = Arc::new(ScriptedCompletion::default().with_sql(
            CompletionOutcome::Text("[/INST] SELECT DISTINCT employee_name FROM Inventory;".into()),
        ));
        let generator = generator(completion.clone());

        let sql = generator.generate_sql("Who are the employees").await.unwrap();
        assert_eq!(
            sql.unwrap().as_str(),
            "SELECT DISTINCT employee_name FROM Inventory"
        );

        let prompts = completion.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("### User Question:\nwho are all the employees in the warehouse\n"));
    }

    #[tokio::test]
    async fn test_generate_sql_rejected_is_none() {
        let completion = Arc::new(ScriptedCompletion::default().with_sql(
            CompletionOutcome::Rejected {
                status: 429,
                body: "rate limited".into(),
            },
        ));
        let generator = generator(completion);

        assert_eq!(generator.generate_sql("how many items").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_generate_sql_transport_error() {
        let completion = Arc::new(ScriptedCompletion::default().failing());
        let generator = generator(completion);

        assert!(generator.generate_sql("how many items").await.is_err());
    }
}
