//! WakaTime API client
//!
//! Every call is a single attempt: a non-200 answer or a transport failure is
//! reported to the caller, which decides how the request fails.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::{
    config::WakaTimeConfig,
    constants::wakatime_paths,
    models::wakatime::{AccessToken, DailySummary, Envelope, Profile},
};

/// Why an upstream call failed
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected upstream payload: {0}")]
    Decode(String),
}

/// The time-tracking service the leaderboard is computed from
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TimeTracker: Send + Sync {
    /// Trade an authorization code for an access token
    async fn exchange_code(&self, code: &str) -> Result<AccessToken, UpstreamError>;

    /// Profile of the account owning `access_token`
    async fn current_user(&self, access_token: &str) -> Result<Profile, UpstreamError>;

    /// Daily activity between two `%m/%d/%Y` dates, inclusive
    async fn summaries(
        &self,
        access_token: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<DailySummary>, UpstreamError>;
}

/// reqwest-backed WakaTime client
pub struct WakaTimeClient {
    client: Client,
    config: WakaTimeConfig,
}

impl WakaTimeClient {
    pub fn new(config: WakaTimeConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn read<T: DeserializeOwned>(response: Response, call: &str) -> Result<T, UpstreamError> {
        let status = response.status();
        tracing::debug!(call, status = status.as_u16(), "WakaTime responded");

        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(call, status = status.as_u16(), body = %body, "WakaTime call failed");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}

#[async_trait]
impl TimeTracker for WakaTimeClient {
    async fn exchange_code(&self, code: &str) -> Result<AccessToken, UpstreamError> {
        let response = self
            .client
            .post(self.endpoint(wakatime_paths::TOKEN))
            .header(header::ACCEPT, "application/json")
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Token exchange transport failure"))?;

        Self::read(response, "token").await
    }

    async fn current_user(&self, access_token: &str) -> Result<Profile, UpstreamError> {
        let response = self
            .client
            .get(self.endpoint(wakatime_paths::CURRENT_USER))
            .header(header::ACCEPT, "application/json")
            .bearer_auth(access_token)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Profile transport failure"))?;

        let envelope: Envelope<Profile> = Self::read(response, "current_user").await?;
        Ok(envelope.data)
    }

    async fn summaries(
        &self,
        access_token: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<DailySummary>, UpstreamError> {
        let response = self
            .client
            .get(self.endpoint(wakatime_paths::SUMMARIES))
            .header(header::ACCEPT, "application/json")
            .query(&[("start", start), ("end", end), ("token", access_token)])
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Summaries transport failure"))?;

        let envelope: Envelope<Vec<DailySummary>> = Self::read(response, "summaries").await?;
        Ok(envelope.data)
    }
}
