//! HTTP client for the external price-quote service.
//!
//! The service answers simple-price queries keyed by token identifier. Calls
//! are authenticated with an API key header; credential presence is checked by
//! the facade before any request is issued, so this client assumes a key.
//! Failures propagate as-is — no retries.

use std::collections::HashMap;
use url::Url;

/// Quote lookup failed.
#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("quote endpoint URL is invalid: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("no USD quote for token id {0}")]
    UnknownToken(String),
}

/// Client for the price-quote service.
#[derive(Debug, Clone)]
pub struct QuoteClient {
    http: reqwest::Client,
    base_url: Url,
}

impl QuoteClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// `tokenQuote(tokenId, apiKey)` — the current USD price of one token.
    pub async fn token_quote(&self, token_id: &str, api_key: &str) -> Result<f64, QuoteError> {
        let url = self.base_url.join("simple/price")?;
        tracing::debug!(%token_id, "fetching token quote");
        let response = self
            .http
            .get(url)
            .query(&[("ids", token_id), ("vs_currencies", "usd")])
            .header("x-api-key", api_key)
            .send()
            .await?
            .error_for_status()?;
        let body: HashMap<String, HashMap<String, f64>> = response.json().await?;
        body.get(token_id)
            .and_then(|quotes| quotes.get("usd"))
            .copied()
            .ok_or_else(|| QuoteError::UnknownToken(token_id.to_string()))
    }

    /// `tokenToUSD(amount, tokenId, apiKey)` — the USD value of a token amount.
    pub async fn token_to_usd(
        &self,
        amount: f64,
        token_id: &str,
        api_key: &str,
    ) -> Result<f64, QuoteError> {
        let quote = self.token_quote(token_id, api_key).await?;
        Ok(amount * quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn quote_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .and(query_param("ids", "storage-token"))
            .and(query_param("vs_currencies", "usd"))
            .and(header("x-api-key", "test-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "storage-token": { "usd": 0.042 } })),
            )
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn fetches_usd_quote() {
        let server = quote_server().await;
        let client = QuoteClient::new(server.uri().parse::<Url>().unwrap().join("/").unwrap());
        let quote = client.token_quote("storage-token", "test-key").await.unwrap();
        assert_eq!(quote, 0.042);
    }

    #[tokio::test]
    async fn converts_amount_to_usd() {
        let server = quote_server().await;
        let client = QuoteClient::new(server.uri().parse::<Url>().unwrap().join("/").unwrap());
        let usd = client
            .token_to_usd(100.0, "storage-token", "test-key")
            .await
            .unwrap();
        assert!((usd - 4.2).abs() < 1e-9);
    }

    #[tokio::test]
    async fn missing_token_id_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "other-token": { "usd": 1.0 } })),
            )
            .mount(&server)
            .await;
        let client = QuoteClient::new(server.uri().parse::<Url>().unwrap().join("/").unwrap());
        let err = client.token_quote("storage-token", "test-key").await;
        assert!(matches!(err, Err(QuoteError::UnknownToken(id)) if id == "storage-token"));
    }

    #[tokio::test]
    async fn http_failure_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let client = QuoteClient::new(server.uri().parse::<Url>().unwrap().join("/").unwrap());
        let err = client.token_quote("storage-token", "test-key").await;
        assert!(matches!(err, Err(QuoteError::Http(_))));
    }
}
