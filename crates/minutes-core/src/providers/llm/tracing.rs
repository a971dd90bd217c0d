use super::{LlmClient, ResponseSchema, Stage};
use crate::model::LlmResponse;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tracing::{info_span, Instrument};

/// Wraps a client in an `llm.request` span. Prompt text is never recorded,
/// only its length.
pub struct TracingLlmClient {
    inner: Arc<dyn LlmClient>,
    stage: Stage,
}

impl TracingLlmClient {
    pub fn new(inner: Arc<dyn LlmClient>, stage: Stage) -> Self {
        Self { inner, stage }
    }

    async fn traced<F>(
        &self,
        prompt: &str,
        structured: bool,
        call: F,
    ) -> anyhow::Result<LlmResponse>
    where
        F: Future<Output = anyhow::Result<LlmResponse>> + Send,
    {
        let span = info_span!(
            "llm.request",
            "minutes.stage" = self.stage.as_str(),
            "minutes.provider" = self.inner.provider_name(),
            "llm.structured" = structured,
            "llm.prompt_chars" = prompt.chars().count(),
            "llm.request.model" = tracing::field::Empty,
            "llm.usage.input_tokens" = tracing::field::Empty,
            "llm.usage.output_tokens" = tracing::field::Empty,
            "latency_ms" = tracing::field::Empty,
            "error" = tracing::field::Empty,
            "error.message" = tracing::field::Empty
        );

        async move {
            let start = std::time::Instant::now();
            let result = call.await;
            let span = tracing::Span::current();
            span.record("latency_ms", start.elapsed().as_millis() as u64);

            match &result {
                Ok(resp) => {
                    span.record("llm.request.model", resp.model.as_str());
                    if let Some(usage) = resp.meta.get("usage") {
                        if let Some(i) = usage.get("input_tokens").and_then(|v| v.as_u64()) {
                            span.record("llm.usage.input_tokens", i);
                        }
                        if let Some(o) = usage.get("output_tokens").and_then(|v| v.as_u64()) {
                            span.record("llm.usage.output_tokens", o);
                        }
                    }
                    tracing::debug!(
                        response_chars = resp.text.chars().count(),
                        "llm call finished"
                    );
                }
                Err(e) => {
                    span.record("error", true);
                    span.record("error.message", e.to_string().as_str());
                    tracing::warn!(error = %e, "llm call failed");
                }
            }

            result
        }
        .instrument(span)
        .await
    }
}

#[async_trait]
impl LlmClient for TracingLlmClient {
    async fn complete(
        &self,
        prompt: &str,
        system: Option<&[String]>,
    ) -> anyhow::Result<LlmResponse> {
        self.traced(prompt, false, self.inner.complete(prompt, system))
            .await
    }

    async fn complete_structured(
        &self,
        prompt: &str,
        system: Option<&[String]>,
        schema: ResponseSchema<'_>,
    ) -> anyhow::Result<LlmResponse> {
        self.traced(
            prompt,
            true,
            self.inner.complete_structured(prompt, system, schema),
        )
        .await
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::llm::fake::{FakeClient, FakeReply};

    #[tokio::test]
    async fn passes_results_and_errors_through() {
        let inner = Arc::new(FakeClient::new("gpt-4o").with_script([
            FakeReply::Text("ok".into()),
            FakeReply::Error("boom".into()),
        ]));
        let client = TracingLlmClient::new(inner.clone(), Stage::Judge);
        assert_eq!(client.complete("p", None).await.unwrap().text, "ok");
        assert_eq!(client.complete("p", None).await.unwrap_err().to_string(), "boom");
        assert_eq!(client.provider_name(), "fake");
        assert_eq!(inner.calls(), 2);
    }
}
