use super::{LlmClient, ResponseSchema};
use crate::model::LlmResponse;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum FakeReply {
    Text(String),
    Error(String),
}

/// Offline client: replays a script, then falls back to a fixed response.
#[derive(Debug)]
pub struct FakeClient {
    model: String,
    fixed_response: Option<String>,
    script: Mutex<VecDeque<FakeReply>>,
    prompts: Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            fixed_response: None,
            script: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.fixed_response = Some(response.into());
        self
    }

    pub fn with_script(self, replies: impl IntoIterator<Item = FakeReply>) -> Self {
        self.script
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .extend(replies);
        self
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    fn next_reply(&self, prompt: &str) -> anyhow::Result<String> {
        self.prompts
            .lock()
            .map_err(|_| anyhow::anyhow!("fake client prompt log poisoned"))?
            .push(prompt.to_string());
        let scripted = self
            .script
            .lock()
            .map_err(|_| anyhow::anyhow!("fake client script poisoned"))?
            .pop_front();
        match scripted {
            Some(FakeReply::Text(text)) => Ok(text),
            Some(FakeReply::Error(msg)) => anyhow::bail!("{}", msg),
            None => self
                .fixed_response
                .clone()
                .ok_or_else(|| anyhow::anyhow!("fake provider has no response configured")),
        }
    }
}

#[async_trait]
impl LlmClient for FakeClient {
    async fn complete(
        &self,
        prompt: &str,
        _system: Option<&[String]>,
    ) -> anyhow::Result<LlmResponse> {
        let text = self.next_reply(prompt)?;
        Ok(LlmResponse {
            text,
            provider: "fake".to_string(),
            model: self.model.clone(),
            meta: serde_json::json!({}),
        })
    }

    async fn complete_structured(
        &self,
        prompt: &str,
        system: Option<&[String]>,
        schema: ResponseSchema<'_>,
    ) -> anyhow::Result<LlmResponse> {
        let mut resp = self.complete(prompt, system).await?;
        resp.meta = serde_json::json!({ "response_schema": schema.name });
        Ok(resp)
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn script_runs_before_fixed_response() {
        let client = FakeClient::new("m")
            .with_response("fixed")
            .with_script([
                FakeReply::Text("first".into()),
                FakeReply::Error("provider down".into()),
            ]);
        assert_eq!(client.complete("a", None).await.unwrap().text, "first");
        let err = client.complete("b", None).await.unwrap_err();
        assert_eq!(err.to_string(), "provider down");
        assert_eq!(client.complete("c", None).await.unwrap().text, "fixed");
        assert_eq!(client.prompts(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn unconfigured_client_errors() {
        let client = FakeClient::new("m");
        assert!(client.complete("a", None).await.is_err());
        assert_eq!(client.calls(), 1);
    }
}
