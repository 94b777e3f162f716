//! Stage 2: use cases to SQL queries

use reqsql_client::LanguageModel;
use reqsql_core::domain::query::{SqlQuery, UseCase};
use reqsql_core::error::PipelineError;
use tracing::{debug, error, info, warn};

use crate::prompt;

/// Reply the models are known to give when they have nothing to offer
pub const NO_QUERY_SENTINEL: &str = "Placeholder: No specific P&C SQL generated";

/// How decoration is stripped from a model reply
///
/// Which one applies depends on the model adapter: Cortex replies tend to
/// wrap everything in quotes, Anthropic replies use fenced blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseCleaning {
    /// Removes fences, every backtick and every double quote
    #[default]
    Strict,
    /// Removes `sql` fence openers and backticks, keeps double quotes
    Lenient,
}

impl ResponseCleaning {
    pub fn clean(self, reply: &str) -> String {
        match self {
            ResponseCleaning::Strict => reply
                .trim()
                .replace("```sql", "")
                .replace("```", "")
                .replace('`', "")
                .replace('"', "")
                .trim()
                .to_string(),
            ResponseCleaning::Lenient => reply
                .replace("```sql", "")
                .replace('`', "")
                .trim()
                .to_string(),
        }
    }
}

/// Generates one query per use case, in order, without duplicates
///
/// Never fails as a whole: blank use cases, model errors and empty replies
/// are logged and contribute nothing. All of them failing yields an empty list.
pub async fn synthesize_queries(
    use_cases: &[UseCase],
    model: &dyn LanguageModel,
    cleaning: ResponseCleaning,
    dialect: &str,
) -> Vec<SqlQuery> {
    let mut queries: Vec<SqlQuery> = Vec::new();

    for (index, use_case) in use_cases.iter().enumerate() {
        if use_case.is_blank() {
            warn!("Skipping {}", PipelineError::invalid_item(index, "blank use case"));
            continue;
        }

        let prompt = prompt::query_prompt(use_case.as_str(), dialect);
        let reply = match model.complete(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Query generation failed for use case {}: {}", index, e);
                continue;
            }
        };
        debug!("Query reply for use case {}: {}", index, reply);

        let sql = cleaning.clean(&reply);
        if sql.is_empty() || sql.contains(NO_QUERY_SENTINEL) {
            warn!("No query generated for use case: {}", use_case);
            continue;
        }

        let query = SqlQuery::new(sql);
        if queries.contains(&query) {
            debug!("Dropping duplicate query for use case {}", index);
            continue;
        }
        queries.push(query);
    }

    info!(
        "Synthesized {} queries from {} use cases",
        queries.len(),
        use_cases.len()
    );
    queries
}
