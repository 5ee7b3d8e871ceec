// src/ingest/newsapi.rs
// NewsAPI top-headlines client. The caller never sees a panic: transport
// failures, non-success statuses, and responses without an article list all
// come back as `FetchError`.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::error::FetchError;
use crate::ingest::types::HeadlineSource;

const BASE_URL: &str = "https://newsapi.org/v2/top-headlines";

pub struct NewsApiClient {
    http: reqwest::Client,
    api_key: String,
    language: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct HeadlinesResponse {
    status: String,
    code: Option<String>,
    message: Option<String>,
    articles: Option<Vec<Article>>,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: Option<String>,
}

impl NewsApiClient {
    pub fn new(api_key: impl Into<String>, language: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("finnews-sentiment/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key: api_key.into(),
            language: language.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the client at a different endpoint (local stub servers in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_titles(&self, params: &[(&str, &str)]) -> Result<Vec<String>, FetchError> {
        let resp = self
            .http
            .get(&self.base_url)
            .header("X-Api-Key", &self.api_key)
            .query(params)
            .send()
            .await?
            .error_for_status()?;

        let body: HeadlinesResponse = resp.json().await?;
        if body.status != "ok" {
            return Err(FetchError::Api {
                code: body.code.unwrap_or_else(|| "unknown".to_string()),
                message: body.message.unwrap_or_default(),
            });
        }

        let articles = body.articles.ok_or(FetchError::MissingArticles)?;
        Ok(articles.into_iter().filter_map(|a| a.title).collect())
    }
}

#[async_trait]
impl HeadlineSource for NewsApiClient {
    async fn top_headlines(&self, source: &str) -> Result<Vec<String>, FetchError> {
        self.get_titles(&[("sources", source), ("language", &self.language)])
            .await
    }

    async fn category_headlines(
        &self,
        category: &str,
        country: &str,
    ) -> Result<Vec<String>, FetchError> {
        self.get_titles(&[
            ("category", category),
            ("country", country),
            ("language", &self.language),
        ])
        .await
    }
}
