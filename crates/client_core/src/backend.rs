use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    error::ApiError,
    protocol::{
        GenerateRequest, GenerateResponse, IncorporateFeedbackRequest,
        IncorporateFeedbackResponse, SubmitFeedbackRequest, SubmitFeedbackResponse,
    },
};
use tracing::debug;
use url::Url;

/// The three calls the review workflow makes against its backend.
#[async_trait]
pub trait ReviewBackend: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse>;
    async fn submit_feedback(
        &self,
        request: &SubmitFeedbackRequest,
    ) -> Result<SubmitFeedbackResponse>;
    async fn incorporate_feedback(
        &self,
        request: &IncorporateFeedbackRequest,
    ) -> Result<IncorporateFeedbackResponse>;
}

/// JSON-over-HTTP backend rooted at a server URL.
pub struct HttpBackend {
    http: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(server_url: &str) -> Result<Self> {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(server_url.trim())
            .with_context(|| format!("invalid server url '{server_url}'"))?;
        if base_url.cannot_be_a_base() {
            bail!("server url '{server_url}' cannot be used as a base url");
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp>
    where
        Req: Serialize + Sync + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = self
            .base_url
            .join(path)
            .with_context(|| format!("failed to build url for {path}"))?;
        debug!(%url, "posting backend request");

        let res = self
            .http
            .post(url.clone())
            .json(body)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;

        let status = res.status();
        if !status.is_success() {
            let raw = res.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<ApiError>(&raw) {
                Ok(api_error) => anyhow!(api_error).context(format!("{path} returned {status}")),
                Err(_) => anyhow!("{path} returned {status}"),
            });
        }

        res.json::<Resp>()
            .await
            .with_context(|| format!("invalid response body from {path}"))
    }
}

#[async_trait]
impl ReviewBackend for HttpBackend {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        self.post_json("generate", request).await
    }

    async fn submit_feedback(
        &self,
        request: &SubmitFeedbackRequest,
    ) -> Result<SubmitFeedbackResponse> {
        self.post_json("submit_feedback", request).await
    }

    async fn incorporate_feedback(
        &self,
        request: &IncorporateFeedbackRequest,
    ) -> Result<IncorporateFeedbackResponse> {
        self.post_json("incorporate_feedback", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash_so_joins_append() {
        let backend = HttpBackend::new("http://127.0.0.1:5000/review").expect("backend");
        assert_eq!(backend.base_url().as_str(), "http://127.0.0.1:5000/review/");
        assert_eq!(
            backend.base_url().join("generate").expect("join").as_str(),
            "http://127.0.0.1:5000/review/generate"
        );
    }

    #[test]
    fn rejects_unparseable_server_url() {
        assert!(HttpBackend::new("not a url").is_err());
        assert!(HttpBackend::new("mailto:someone@example.com").is_err());
    }
}
