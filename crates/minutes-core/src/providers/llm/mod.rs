use crate::config::{MinutesConfig, ProviderKind};
use crate::errors::ConfigError;
use crate::model::LlmResponse;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub mod fake;
pub mod openai;
pub mod tracing;

/// A JSON schema the provider should constrain its output to.
#[derive(Debug, Clone, Copy)]
pub struct ResponseSchema<'a> {
    pub name: &'a str,
    pub schema: &'a serde_json::Value,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        system: Option<&[String]>,
    ) -> anyhow::Result<LlmResponse>;

    /// Completion constrained to `schema`. Providers without structured
    /// output fall back to a plain completion; callers validate either way.
    async fn complete_structured(
        &self,
        prompt: &str,
        system: Option<&[String]>,
        schema: ResponseSchema<'_>,
    ) -> anyhow::Result<LlmResponse> {
        let _ = schema;
        self.complete(prompt, system).await
    }

    fn provider_name(&self) -> &'static str;
}

/// Which pipeline stage a client serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Generator,
    Judge,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Generator => "generator",
            Stage::Judge => "judge",
        }
    }
}

/// Build the traced client for one stage from config.
pub fn build_stage_client(
    cfg: &MinutesConfig,
    stage: Stage,
) -> Result<Arc<dyn LlmClient>, ConfigError> {
    let (model, temperature, max_tokens) = match stage {
        Stage::Generator => (
            cfg.generator.model.clone(),
            cfg.generator.temperature,
            cfg.generator.max_tokens,
        ),
        Stage::Judge => (
            cfg.judge.model.clone(),
            cfg.judge.temperature,
            cfg.judge.max_tokens,
        ),
    };

    let inner: Arc<dyn LlmClient> = match cfg.provider.kind {
        ProviderKind::Openai => {
            let var = cfg.provider.api_key_env.clone();
            let api_key = std::env::var(&var)
                .ok()
                .filter(|k| !k.trim().is_empty())
                .ok_or(ConfigError::MissingApiKey { var })?;
            let timeout = cfg.provider.timeout_secs.map(Duration::from_secs);
            let client = openai::OpenAIClient::new(model, api_key, temperature, max_tokens)
                .with_base_url(cfg.provider.base_url.clone())
                .with_timeout(timeout)
                .map_err(|e| ConfigError::Client(format!("{e:#}")))?;
            Arc::new(client)
        }
        ProviderKind::Fake => {
            let canned = match stage {
                Stage::Generator => cfg.provider.fake.summary.clone(),
                Stage::Judge => cfg.provider.fake.evaluation.clone(),
            };
            let mut client = fake::FakeClient::new(model);
            if let Some(text) = canned {
                client = client.with_response(text);
            }
            Arc::new(client)
        }
    };

    Ok(Arc::new(tracing::TracingLlmClient::new(inner, stage)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn openai_without_key_is_a_config_error() {
        let mut cfg = MinutesConfig::default();
        cfg.provider.api_key_env = "MINUTES_TEST_UNSET_KEY".to_string();
        std::env::remove_var("MINUTES_TEST_UNSET_KEY");
        let err = build_stage_client(&cfg, Stage::Judge).err().unwrap();
        assert!(matches!(err, ConfigError::MissingApiKey { ref var } if var == "MINUTES_TEST_UNSET_KEY"));
    }

    #[tokio::test]
    async fn fake_stage_client_uses_canned_response() {
        let mut cfg = MinutesConfig::default();
        cfg.provider.kind = ProviderKind::Fake;
        cfg.provider.fake.summary = Some("**Meeting Notes**".to_string());
        let client = build_stage_client(&cfg, Stage::Generator).unwrap();
        let resp = client.complete("anything", None).await.unwrap();
        assert_eq!(resp.text, "**Meeting Notes**");
        assert_eq!(resp.model, "gpt-4o-mini");
        assert_eq!(client.provider_name(), "fake");
    }
}
