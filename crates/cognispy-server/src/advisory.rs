//! Remote advisory-text service.
//!
//! Fetches a short congratulation for a finished stage. Every failure,
//! including a timeout, is reported as an `AdvisoryError`; callers keep the
//! canned message in that case.

use async_trait::async_trait;
use cognispy_core::{AdvisoryError, AdvisoryRequest};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

#[async_trait]
pub trait AdvisoryService: Send + Sync {
    async fn congratulate(&self, request: &AdvisoryRequest) -> Result<String, AdvisoryError>;
}

#[derive(Debug, Serialize)]
struct CongratulateBody<'a> {
    prompt: String,
    locale: &'a str,
    username: &'a str,
    stage_label: &'a str,
    score: u32,
}

#[derive(Debug, Deserialize)]
struct CongratulateResponse {
    text: String,
}

/// Posts the request as JSON and expects `{"text": "..."}` back
#[derive(Clone)]
pub struct HttpAdvisory {
    client: Client,
    url: String,
}

impl HttpAdvisory {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl AdvisoryService for HttpAdvisory {
    async fn congratulate(&self, request: &AdvisoryRequest) -> Result<String, AdvisoryError> {
        let body = CongratulateBody {
            prompt: request.prompt(),
            locale: request.locale.code(),
            username: &request.username,
            stage_label: &request.stage_label,
            score: request.score,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AdvisoryError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdvisoryError::Unavailable(format!("status {}", status)));
        }

        let parsed = response
            .json::<CongratulateResponse>()
            .await
            .map_err(|e| AdvisoryError::Unavailable(format!("bad response: {}", e)))?;
        Ok(parsed.text)
    }
}

/// Ask the service, giving up after `limit`. Blank text counts as a failure.
pub async fn fetch_with_timeout(
    service: &dyn AdvisoryService,
    request: &AdvisoryRequest,
    limit: Duration,
) -> Result<String, AdvisoryError> {
    let text = match timeout(limit, service.congratulate(request)).await {
        Ok(result) => result?,
        Err(_) => return Err(AdvisoryError::Timeout),
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(AdvisoryError::Empty);
    }
    debug!(chars = text.len(), "advisory text received");
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cognispy_core::Locale;

    struct Fixed(&'static str);

    #[async_trait]
    impl AdvisoryService for Fixed {
        async fn congratulate(&self, _request: &AdvisoryRequest) -> Result<String, AdvisoryError> {
            Ok(self.0.to_string())
        }
    }

    struct Slow;

    #[async_trait]
    impl AdvisoryService for Slow {
        async fn congratulate(&self, _request: &AdvisoryRequest) -> Result<String, AdvisoryError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("too late".to_string())
        }
    }

    struct Down;

    #[async_trait]
    impl AdvisoryService for Down {
        async fn congratulate(&self, _request: &AdvisoryRequest) -> Result<String, AdvisoryError> {
            Err(AdvisoryError::Unavailable("connection refused".to_string()))
        }
    }

    fn request() -> AdvisoryRequest {
        AdvisoryRequest {
            score: 60,
            stage_label: "Umbrella".to_string(),
            username: "Ann".to_string(),
            locale: Locale::En,
        }
    }

    #[tokio::test]
    async fn test_text_is_trimmed() {
        let service = Fixed("  Lovely work, Ann!\n");
        let text = fetch_with_timeout(&service, &request(), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(text, "Lovely work, Ann!");
    }

    #[tokio::test]
    async fn test_blank_text_is_rejected() {
        let result = fetch_with_timeout(&Fixed("   "), &request(), Duration::from_secs(1)).await;
        assert_eq!(result, Err(AdvisoryError::Empty));
    }

    #[tokio::test]
    async fn test_slow_service_times_out() {
        let result = fetch_with_timeout(&Slow, &request(), Duration::from_millis(100)).await;
        assert_eq!(result, Err(AdvisoryError::Timeout));
    }

    #[tokio::test]
    async fn test_service_errors_propagate() {
        let result = fetch_with_timeout(&Down, &request(), Duration::from_secs(1)).await;
        assert!(matches!(result, Err(AdvisoryError::Unavailable(_))));
    }
}
