//! Prompt templates for SQL generation and policy answers
//!
//! Both prompts use the Mixtral instruction format (`<s>[INST] ... [/INST]`).

/// Closing tag of an instruction block
pub const INST_END: &str = "[/INST]";

/// Columns of the `Inventory` table described to the model
pub const INVENTORY_COLUMNS: &[&str] = &[
    "entry_id",
    "item_name",
    "item_category",
    "unit_price",
    "quantity",
    "action_type",
    "employee_name",
    "employee_role",
    "shift",
    "log_timestamp",
    "warehouse_location",
    "reason",
    "supplier_name",
    "customer_name",
    "status",
];

const SQL_GUIDELINES: &str = r#"### SQL Query Guidelines:
- Do NOT explain the query.
- Do NOT use markdown or comments.
- Do NOT say "Here is the SQL..."
- Do NOT add anything outside the SQL.
- Use TOP properly after SELECT, NOT after ORDER BY.
- Do NOT use LIMIT. Only use TOP for row limits.
- Do NOT use HAVING unless there's an aggregation.
- Do NOT use the TOP keyword unless it is needed to limit the result set.
- Ensure LIKE '%Electronics%' is used instead of category = 'Consumer Electronics'.
- If fetching the oldest inventory, use ORDER BY date_received ASC with TOP 1."#;

/// Prompt builder for the two completion calls
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the natural-language-to-T-SQL prompt
    ///
    /// `question` is expected to be normalized already (lower-cased, rewritten).
    pub fn build_sql_prompt(question: &str) -> String {
        format!(
            "<s>[INST]\nYou are a T-SQL expert. Generate a valid T-SQL Server query using the table Inventory with the following columns:\n{columns}\n\n{guidelines}\n\n### User Question:\n{question}\n\n### SQL:\n{end}",
            columns = INVENTORY_COLUMNS.join(", "),
            guidelines = SQL_GUIDELINES,
            question = question,
            end = INST_END,
        )
    }

    /// Build the context-grounded answer prompt
    pub fn build_answer_prompt(question: &str, context: &str) -> String {
        format!(
            "<s>[INST] You are a helpful assistant. Use the context to answer user's question.\n- Use markdown and bullet points\n- Be concise and clear\n\nContext:\n{context}\n\nQuestion:\n{question}\n\nAnswer:\n{end}",
            context = context,
            question = question,
            end = INST_END,
        )
    }

    /// Keep only what follows the last `[/INST]`, in case the model echoed the prompt
    pub fn strip_instruction_echo(completion: &str) -> &str {
        completion
            .rsplit(INST_END)
            .next()
            .unwrap_or(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_prompt_describes_schema() {
        let prompt = PromptBuilder::build_sql_prompt("how many laptops are in stock");

        assert!(prompt.starts_with("<s>[INST]\nYou are a T-SQL expert."));
        assert!(prompt.contains("table Inventory"));
        assert!(prompt.contains(
            "entry_id, item_name, item_category, unit_price, quantity, action_type, employee_name, \
             employee_role, shift, log_timestamp, warehouse_location, reason, supplier_name, \
             customer_name, status"
        ));
        assert!(prompt.contains("Do NOT use LIMIT."));
        assert!(prompt.contains("LIKE '%Electronics%'"));
        assert!(prompt.contains("### User Question:\nhow many laptops are in stock\n"));
        assert!(prompt.ends_with("### SQL:\n[/INST]"));
    }

    #[test]
    fn test_answer_prompt_sections() {
        let prompt = PromptBuilder::build_answer_prompt("What is the return window?", "Returns: 30 days");

        assert!(prompt.starts_with("<s>[INST] You are a helpful assistant."));
        assert!(prompt.contains("Context:\nReturns: 30 days\n\n"));
        assert!(prompt.contains("Question:\nWhat is the return window?\n\n"));
        assert!(prompt.ends_with("Answer:\n[/INST]"));
    }

    #[test]
    fn test_strip_instruction_echo() {
        assert_eq!(PromptBuilder::strip_instruction_echo(" SELECT 1"), " SELECT 1");
        assert_eq!(
            PromptBuilder::strip_instruction_echo("[INST] a [/INST] b [/INST] SELECT 2"),
            " SELECT 2"
        );
        assert_eq!(PromptBuilder::strip_instruction_echo("echo [/INST]"), "");
    }
}
