//! NarrativeAnalyzer - collected output in, plain-language summary out

use crate::llm_client::{CompletionClient, HttpCompletionClient, LlmConfig};
use crate::prompt::build_prompt;
use crate::types::{CommandOutputs, NarrativeResult};
use anyhow::Result;
use tracing::{error, info};

pub struct NarrativeAnalyzer {
    client: Box<dyn CompletionClient>,
}

impl NarrativeAnalyzer {
    pub fn new(client: Box<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Analyzer backed by the HTTP completion service
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let client = HttpCompletionClient::new(config.clone())?;
        Ok(Self::new(Box::new(client)))
    }

    /// Summarize `outputs`. One request, no retry; failures come back as
    /// the error side of the result.
    pub fn analyze(&self, outputs: &CommandOutputs) -> NarrativeResult {
        let prompt = build_prompt(outputs);
        info!(
            "Requesting analysis of {} command outputs ({} prompt bytes)",
            outputs.len(),
            prompt.as_str().len()
        );

        match self.client.generate(prompt.as_str()) {
            Ok(narrative) => {
                info!("Analysis received ({} bytes)", narrative.len());
                Ok(narrative)
            }
            Err(e) => {
                error!("Error communicating with completion service: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::llm_client::FakeCompletionClient;
    use crate::prompt::ANALYSIS_PREAMBLE;
    use std::sync::Arc;

    struct Shared(Arc<FakeCompletionClient>);

    impl CompletionClient for Shared {
        fn generate(&self, prompt: &str) -> Result<String, AnalysisError> {
            self.0.generate(prompt)
        }
    }

    fn sample_outputs() -> CommandOutputs {
        let mut outputs = CommandOutputs::new();
        outputs.insert("show ip mroute", vec!["(*, 239.1.1.1)".to_string()]);
        outputs
    }

    #[test]
    fn test_success_returns_narrative() {
        let analyzer = NarrativeAnalyzer::new(Box::new(FakeCompletionClient::always(
            "Error-free multicast state",
        )));

        // Narratives starting with "Error" are still successes
        assert_eq!(
            analyzer.analyze(&sample_outputs()),
            Ok("Error-free multicast state".to_string())
        );
    }

    #[test]
    fn test_failure_is_tagged() {
        let analyzer = NarrativeAnalyzer::new(Box::new(FakeCompletionClient::always_error(
            AnalysisError::Service(500),
        )));

        let err = analyzer.analyze(&sample_outputs()).unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_sends_single_composed_prompt() {
        let fake = Arc::new(FakeCompletionClient::always("ok"));
        let analyzer = NarrativeAnalyzer::new(Box::new(Shared(Arc::clone(&fake))));

        analyzer.analyze(&sample_outputs()).unwrap();

        let prompts = fake.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].starts_with(ANALYSIS_PREAMBLE));
        assert!(prompts[0].ends_with("show ip mroute:\n(*, 239.1.1.1)"));
    }
}
