//! Question-answering passthrough to a hosted language model.
//!
//! Opaque external call with a fixed request/response contract. Failures are
//! absorbed: `None` means "no answer", and the HTTP layer substitutes an
//! apology rather than surfacing a server fault.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait Assistant: Send + Sync {
    /// Answer a free-form question, or `None` when the provider cannot.
    async fn ask(&self, query: &str) -> Option<String>;

    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

pub type DynAssistant = Arc<dyn Assistant>;

const API_URL: &str = "https://api-inference.huggingface.co/models/HuggingFaceH4/zephyr-7b-beta";

/// Hugging Face Inference API provider. Requires an API token.
pub struct HuggingFaceAssistant {
    http: reqwest::Client,
    token: String,
}

impl HuggingFaceAssistant {
    pub fn new(token: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("finnews-sentiment/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client");
        Self {
            http,
            token: token.into(),
        }
    }
}

#[async_trait]
impl Assistant for HuggingFaceAssistant {
    async fn ask(&self, query: &str) -> Option<String> {
        #[derive(Serialize)]
        struct Params {
            max_new_tokens: u32,
            temperature: f32,
            return_full_text: bool,
        }
        #[derive(Serialize)]
        struct Req {
            inputs: String,
            parameters: Params,
        }
        #[derive(Deserialize)]
        struct Generation {
            generated_text: String,
        }

        let req = Req {
            inputs: format!(
                "<|system|>You are a helpful financial assistant.<|user|>{query}<|assistant|>"
            ),
            parameters: Params {
                max_new_tokens: 100,
                temperature: 0.7,
                return_full_text: false,
            },
        };

        let resp = match self
            .http
            .post(API_URL)
            .bearer_auth(&self.token)
            .json(&req)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, "hugging face request failed");
                return None;
            }
        };

        if !resp.status().is_success() {
            tracing::error!(status = %resp.status(), "hugging face api error");
            return None;
        }

        let body: Vec<Generation> = resp.json().await.ok()?;
        let answer = body.first()?.generated_text.trim().to_string();
        (!answer.is_empty()).then_some(answer)
    }

    fn provider_name(&self) -> &'static str {
        "huggingface"
    }
}

/// Never answers. Stands in when no token is configured.
pub struct DisabledAssistant;

#[async_trait]
impl Assistant for DisabledAssistant {
    async fn ask(&self, _query: &str) -> Option<String> {
        None
    }

    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Fixed-answer provider for tests and local runs without a token.
#[derive(Clone)]
pub struct MockAssistant {
    pub fixed: String,
}

#[async_trait]
impl Assistant for MockAssistant {
    async fn ask(&self, _query: &str) -> Option<String> {
        Some(self.fixed.clone())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
