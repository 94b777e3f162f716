//! Stage 1: requirements text to use cases

use reqsql_client::LanguageModel;
use reqsql_core::domain::query::UseCase;
use reqsql_core::error::{PipelineError, Result};
use tracing::{debug, info, warn};

use crate::prompt;

/// Asks the language model for the test use cases in `requirements`
///
/// Makes exactly one model call. The reply must be a JSON array of strings;
/// anything else fails the stage without a partial list.
pub async fn derive_use_cases(requirements: &str, model: &dyn LanguageModel) -> Result<Vec<UseCase>> {
    if requirements.trim().is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let prompt = prompt::use_case_prompt(requirements);
    let reply = model
        .complete(&prompt)
        .await
        .map_err(|e| PipelineError::backend(e.to_string()))?;
    debug!("Use-case reply from {}: {}", model.name(), reply);

    let use_cases = parse_use_cases(&reply)?;
    info!("Derived {} use cases", use_cases.len());
    Ok(use_cases)
}

/// Parses a model reply into use cases
///
/// Blank entries are dropped so every returned use case has text.
pub fn parse_use_cases(reply: &str) -> Result<Vec<UseCase>> {
    let value: serde_json::Value = serde_json::from_str(reply.trim())
        .map_err(|e| PipelineError::malformed(format!("reply is not valid JSON ({})", e)))?;

    let items = value
        .as_array()
        .ok_or_else(|| PipelineError::malformed("reply is not a JSON array"))?;

    let mut use_cases = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let text = item.as_str().ok_or_else(|| {
            PipelineError::malformed(format!("element {} is not a string", index))
        })?;

        if text.trim().is_empty() {
            warn!("{}", PipelineError::invalid_item(index, "blank use case"));
            continue;
        }
        use_cases.push(UseCase::new(text));
    }

    Ok(use_cases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reqsql_client::ClientError;
    use std::sync::Mutex;

    struct OneShot {
        reply: std::result::Result<String, u16>,
        prompts: Mutex<Vec<String>>,
    }

    impl OneShot {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LanguageModel for OneShot {
        fn name(&self) -> &str {
            "one-shot"
        }

        async fn complete(&self, prompt: &str) -> reqsql_client::Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(ClientError::api_error(*status, "unavailable")),
            }
        }
    }

    #[tokio::test]
    async fn test_empty_input_never_calls_model() {
        let model = OneShot::replying("[]");
        let err = derive_use_cases(" \n\t ", &model).await.unwrap_err();
        assert!(matches!(err, PipelineError::EmptyInput));
        assert!(model.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_derives_use_cases_in_order() {
        let model = OneShot::replying(
            "\n[\"Verify totals reconcile.\", \"Check every claim has a policy.\"]\n",
        );
        let use_cases = derive_use_cases("Claims reference policies.", &model).await.unwrap();
        assert_eq!(
            use_cases,
            vec![
                UseCase::from("Verify totals reconcile."),
                UseCase::from("Check every claim has a policy.")
            ]
        );

        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Claims reference policies."));
    }

    #[tokio::test]
    async fn test_backend_failure() {
        let model = OneShot::failing(503);
        let err = derive_use_cases("Claims reference policies.", &model).await.unwrap_err();
        assert!(matches!(err, PipelineError::BackendUnavailable(_)));
    }

    #[test]
    fn test_malformed_replies() {
        for reply in [
            "Here are your use cases: 1. check totals",
            "{\"use_cases\": [\"a\"]}",
            "[\"ok\", 42]",
            "```json\n[\"fenced\"]\n```",
        ] {
            let err = parse_use_cases(reply).unwrap_err();
            assert!(matches!(err, PipelineError::MalformedResponse(_)), "{}", reply);
        }
    }

    #[test]
    fn test_blank_entries_dropped() {
        let use_cases = parse_use_cases("[\"\", \"Validate payments\", \"   \"]").unwrap();
        assert_eq!(use_cases, vec![UseCase::from("Validate payments")]);
        assert!(use_cases.iter().all(|u| !u.is_blank()));
    }

    #[test]
    fn test_empty_array_is_not_malformed() {
        assert!(parse_use_cases("[]").unwrap().is_empty());
    }
}
