//! Queued, style-driven image client
//!
//! Two-phase protocol: submit a job, then poll its status on a fixed
//! interval until it completes, fails, or the attempt budget runs out.
//! Transient errors during a single poll (network blips, malformed status
//! payloads, failed result downloads) are logged and tolerated; only an
//! explicit "failed" status or budget exhaustion terminates the attempt.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{ProviderClient, ProviderOutput};
use crate::config::ServiceConfig;
use crate::error::{ProviderError, Result};
use crate::types::{AssetRequest, ProviderId};

/// Client for the queued generation service
pub struct MidjourneyClient {
    http: reqwest::Client,
    config: ServiceConfig,
}

#[derive(Deserialize)]
struct ImagineResponse {
    job_id: String,
}

#[derive(Deserialize)]
struct JobStatusResponse {
    status: String,
    #[serde(default)]
    image_url: Option<String>,
}

/// Outcome of a single poll attempt
enum JobPoll {
    InProgress,
    Completed { image_url: String },
    Failed,
}

impl MidjourneyClient {
    /// Create a client from service configuration
    pub fn new(http: reqwest::Client, config: ServiceConfig) -> Self {
        Self { http, config }
    }

    /// Submit the generation job, returning the provider's job handle
    async fn submit(&self, request: &AssetRequest) -> Result<String> {
        let payload = serde_json::json!({
            "prompt": format!(
                "{} --style {} --ar {}:{} --v 6",
                request.prompt, request.style, request.width, request.height
            ),
            "quality": 1,
            "fast": true,
        });

        let response = self
            .http
            .post(format!("{}/imagine", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status {
                provider: self.id(),
                status: response.status().as_u16(),
            }
            .into());
        }

        let body: ImagineResponse = response.json().await?;
        Ok(body.job_id)
    }

    /// One poll of the job's status endpoint
    async fn poll_job(&self, job_id: &str) -> Result<JobPoll> {
        let response = self
            .http
            .get(format!("{}/jobs/{}", self.config.base_url, job_id))
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status {
                provider: self.id(),
                status: response.status().as_u16(),
            }
            .into());
        }

        let body: JobStatusResponse = response.json().await?;
        match body.status.as_str() {
            "completed" => match body.image_url {
                Some(image_url) => Ok(JobPoll::Completed { image_url }),
                None => Err(ProviderError::Malformed {
                    provider: self.id(),
                    reason: "completed job carries no image_url".to_string(),
                }
                .into()),
            },
            "failed" => Ok(JobPoll::Failed),
            _ => Ok(JobPoll::InProgress),
        }
    }

    /// Download the finished artifact from the URL the job reported
    async fn fetch_result(&self, image_url: &str) -> Result<Vec<u8>> {
        let response = self.http.get(image_url).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::Status {
                provider: self.id(),
                status: response.status().as_u16(),
            }
            .into());
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl ProviderClient for MidjourneyClient {
    fn id(&self) -> ProviderId {
        ProviderId::Midjourney
    }

    async fn generate(&self, request: &AssetRequest) -> Result<ProviderOutput> {
        let job_id = self.submit(request).await?;
        tracing::debug!(provider = %self.id(), job_id = %job_id, "job submitted, polling");

        let interval = Duration::from_secs(self.config.poll_interval_secs);
        for attempt in 1..=self.config.max_poll_attempts {
            tokio::time::sleep(interval).await;

            match self.poll_job(&job_id).await {
                Ok(JobPoll::Completed { image_url }) => {
                    match self.fetch_result(&image_url).await {
                        Ok(bytes) => {
                            return Ok(ProviderOutput {
                                bytes,
                                format: "png".to_string(),
                            });
                        }
                        Err(e) => tracing::warn!(
                            provider = %self.id(),
                            job_id = %job_id,
                            attempt,
                            error = %e,
                            "result download failed, retrying on next poll"
                        ),
                    }
                }
                Ok(JobPoll::Failed) => {
                    return Err(ProviderError::JobFailed {
                        provider: self.id(),
                        job_id,
                    }
                    .into());
                }
                Ok(JobPoll::InProgress) => {}
                Err(e) => tracing::warn!(
                    provider = %self.id(),
                    job_id = %job_id,
                    attempt,
                    error = %e,
                    "poll attempt failed, continuing"
                ),
            }
        }

        Err(ProviderError::Timeout {
            provider: self.id(),
            job_id,
            attempts: self.config.max_poll_attempts,
        }
        .into())
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::providers::test_helpers::{image_request, test_service};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_submit(server: &MockServer, job_id: &str) {
        Mock::given(method("POST"))
            .and(path("/imagine"))
            .and(body_partial_json(serde_json::json!({
                "prompt": "neon alley --style cyberpunk --ar 512:512 --v 6",
                "fast": true,
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "job_id": job_id })),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_submit_poll_fetch_happy_path() {
        let server = MockServer::start().await;
        let image_bytes = b"queued render".to_vec();
        mount_submit(&server, "job-7").await;

        // First poll still in progress, second completed
        Mock::given(method("GET"))
            .and(path("/jobs/job-7"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "status": "processing" })),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/jobs/job-7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "completed",
                "image_url": format!("{}/results/job-7.png", server.uri()),
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/results/job-7.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(image_bytes.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let client = MidjourneyClient::new(reqwest::Client::new(), test_service(&server.uri()));
        let output = client.generate(&image_request("ui")).await.unwrap();

        assert_eq!(output.bytes, image_bytes);
        assert_eq!(output.format, "png");
    }

    #[tokio::test]
    async fn test_failed_status_terminates_without_spending_budget() {
        let server = MockServer::start().await;
        mount_submit(&server, "job-9").await;

        // Exactly one poll must happen: an explicit failure ends the job
        // immediately, no matter how much budget remains.
        Mock::given(method("GET"))
            .and(path("/jobs/job-9"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "status": "failed" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut service = test_service(&server.uri());
        service.max_poll_attempts = 30;
        let client = MidjourneyClient::new(reqwest::Client::new(), service);
        let err = client.generate(&image_request("ui")).await.unwrap_err();

        match err {
            Error::Provider(ProviderError::JobFailed { job_id, .. }) => {
                assert_eq!(job_id, "job-9");
            }
            other => panic!("expected job failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_budget_exhaustion_is_timeout() {
        let server = MockServer::start().await;
        mount_submit(&server, "job-3").await;

        Mock::given(method("GET"))
            .and(path("/jobs/job-3"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "status": "queued" })),
            )
            .expect(3)
            .mount(&server)
            .await;

        let client = MidjourneyClient::new(reqwest::Client::new(), test_service(&server.uri()));
        let err = client.generate(&image_request("ui")).await.unwrap_err();

        match err {
            Error::Provider(ProviderError::Timeout { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transient_poll_error_is_tolerated() {
        let server = MockServer::start().await;
        let image_bytes = b"eventually fine".to_vec();
        mount_submit(&server, "job-5").await;

        // First poll blows up server-side; polling must continue
        Mock::given(method("GET"))
            .and(path("/jobs/job-5"))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/jobs/job-5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "completed",
                "image_url": format!("{}/results/job-5.png", server.uri()),
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/results/job-5.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(image_bytes.clone()))
            .mount(&server)
            .await;

        let client = MidjourneyClient::new(reqwest::Client::new(), test_service(&server.uri()));
        let output = client.generate(&image_request("icon")).await.unwrap();
        assert_eq!(output.bytes, image_bytes);
    }

    #[tokio::test]
    async fn test_submit_failure_aborts_before_polling() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/imagine"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = MidjourneyClient::new(reqwest::Client::new(), test_service(&server.uri()));
        let err = client.generate(&image_request("ui")).await.unwrap_err();

        match err {
            Error::Provider(ProviderError::Status { status, .. }) => assert_eq!(status, 403),
            other => panic!("expected status error, got {other:?}"),
        }
    }
}
