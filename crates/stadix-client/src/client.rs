//! HTTP transport for the statistics service

use std::future::Future;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde_json::Value;
use stadix_io::UploadFile;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::operation::{Operation, UploadKind};
use crate::request::StatRequest;
use crate::response::StatResponse;

/// Anything that can answer statistics requests.
///
/// View-models are generic over this so they can run against a fake.
pub trait StatsService {
    fn send(&self, request: &StatRequest) -> impl Future<Output = ClientResult<StatResponse>> + Send;

    fn upload(
        &self,
        kind: UploadKind,
        file: &UploadFile,
    ) -> impl Future<Output = ClientResult<StatResponse>> + Send;
}

/// Client for the statistics service.
///
/// Each call is exactly one HTTP round trip. Failures are returned to the
/// caller as-is; nothing is retried.
#[derive(Debug, Clone)]
pub struct StatsClient {
    http: reqwest::Client,
    base_url: Url,
    config: ClientConfig,
}

impl StatsClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let base_url = config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    pub fn builder() -> StatsClientBuilder {
        StatsClientBuilder::default()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Absolute URL of an operation, keeping any path prefix of the base URL
    pub fn endpoint(&self, operation: Operation) -> ClientResult<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{}", operation.path()))?)
    }

    /// Send a JSON request
    pub async fn send(&self, request: &StatRequest) -> ClientResult<StatResponse> {
        request.validate()?;

        let operation = request.operation();
        let url = self.endpoint(operation)?;
        debug!(%operation, %url, "sending request");

        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(ClientError::from_transport)?;

        let mut result = self.finish(operation, response).await?;

        if let (StatRequest::Regression(sent), StatResponse::Regression(fit)) =
            (request, &mut result)
        {
            if fit.raw_x.is_none() && fit.raw_y.is_none() {
                fit.raw_x = Some(sent.x_data.clone());
                fit.raw_y = Some(sent.y_data.clone());
            }
        }

        Ok(result)
    }

    /// Upload a spreadsheet as multipart field `file`
    pub async fn upload(&self, kind: UploadKind, file: &UploadFile) -> ClientResult<StatResponse> {
        let operation = kind.operation();
        let url = self.endpoint(operation)?;
        debug!(%operation, %url, file = %file.file_name, bytes = file.len(), "uploading file");

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(file.format.mime_type())?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(ClientError::from_transport)?;

        self.finish(operation, response).await
    }

    async fn finish(
        &self,
        operation: Operation,
        response: reqwest::Response,
    ) -> ClientResult<StatResponse> {
        let status = response.status();
        let body = response.text().await.map_err(ClientError::from_transport)?;

        if !status.is_success() {
            let detail = error_detail(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
            warn!(%operation, status = status.as_u16(), %detail, "service rejected request");
            return Err(ClientError::service(status.as_u16(), detail));
        }

        let result = StatResponse::parse(operation, &body);
        if let Err(e) = &result {
            warn!(%operation, error = %e, "malformed response");
        }
        result
    }
}

impl StatsService for StatsClient {
    fn send(&self, request: &StatRequest) -> impl Future<Output = ClientResult<StatResponse>> + Send {
        StatsClient::send(self, request)
    }

    fn upload(
        &self,
        kind: UploadKind,
        file: &UploadFile,
    ) -> impl Future<Output = ClientResult<StatResponse>> + Send {
        StatsClient::upload(self, kind, file)
    }
}

/// Server-supplied error text: the JSON `detail` field (stringified when it
/// is not a string), or the raw body.
fn error_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => match map.get("detail") {
            Some(Value::String(detail)) => Some(detail.clone()),
            Some(other) => Some(other.to_string()),
            None => Some(trimmed.to_string()),
        },
        _ => Some(trimmed.to_string()),
    }
}

/// Builder for [`StatsClient`]
#[derive(Debug, Default)]
pub struct StatsClientBuilder {
    config: ClientConfig,
}

impl StatsClientBuilder {
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> ClientResult<StatsClient> {
        StatsClient::new(self.config)
    }
}
