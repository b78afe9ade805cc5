//! Placid-style REST render service and media uploader.

use crate::http;
use async_trait::async_trait;
use reqwest::{Client, multipart};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tessera_core::{JobId, PollReport, PropertyMap, RenderStatus};
use tessera_error::TesseraResult;
use tessera_interface::{MediaUploader, RenderBackend};
use tessera_rate_limit::ModelSettings;

const SERVICE: &str = "placid";

/// Environment variable holding the API token.
pub const PLACID_API_TOKEN: &str = "PLACID_API_TOKEN";

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitResponse {
    pub id: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub errors: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MediaResponse {
    #[serde(default)]
    pub media: Vec<MediaEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MediaEntry {
    pub file_id: Option<String>,
}

/// Job id from a submission response; numeric ids become strings.
pub(crate) fn job_id(response: SubmitResponse) -> TesseraResult<JobId> {
    match response.id {
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::String(s)) if !s.is_empty() => Ok(s),
        _ => Err(http::invalid(SERVICE, "Submission response has no id").into()),
    }
}

/// Poll report from an image status response.
///
/// Anything other than "finished" or "error" counts as still pending.
pub(crate) fn poll_report(response: ImageResponse) -> PollReport {
    let status = match response.status.as_deref() {
        Some("finished") => RenderStatus::Finished,
        Some("error") => RenderStatus::Error,
        _ => RenderStatus::Pending,
    };
    let error = match response.errors {
        Some(Value::Array(items)) if !items.is_empty() => Some(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("; "),
        ),
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Null) | Some(Value::Array(_)) | Some(Value::String(_)) | None => None,
        Some(other) => Some(other.to_string()),
    };
    PollReport::new(status, response.image_url, error)
}

/// Hosted URL from a media upload response.
pub(crate) fn media_url(response: MediaResponse) -> TesseraResult<String> {
    response
        .media
        .into_iter()
        .next()
        .and_then(|entry| entry.file_id)
        .ok_or_else(|| http::invalid(SERVICE, "Media response has no file_id").into())
}

/// Client for the render REST API.
///
/// Jobs are submitted to `<base>/<template_id>` and polled at
/// `<base>/images/<id>`; media goes to `<base>/media`.
#[derive(Debug, Clone)]
pub struct PlacidClient {
    client: Client,
    api_token: String,
    base_url: String,
}

impl PlacidClient {
    /// Client configured from `settings`, reading the token from `PLACID_API_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError` if the token is missing or the HTTP client
    /// cannot be built.
    #[tracing::instrument(skip_all)]
    pub fn from_settings(settings: &ModelSettings) -> TesseraResult<Self> {
        let api_token = http::credential(SERVICE, PLACID_API_TOKEN)?;
        Self::with_token(api_token, settings)
    }

    /// Client with an explicit API token.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError` if the HTTP client cannot be built.
    pub fn with_token(api_token: String, settings: &ModelSettings) -> TesseraResult<Self> {
        let client = http::client(
            SERVICE,
            Duration::from_secs(*settings.request_timeout_secs()),
        )?;
        Ok(Self {
            client,
            api_token,
            base_url: settings.placid_base_url().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RenderBackend for PlacidClient {
    #[tracing::instrument(skip(self, properties), fields(layers = properties.len()))]
    async fn submit(&self, template_id: &str, properties: &PropertyMap) -> TesseraResult<JobId> {
        let url = format!("{}/{}", self.base_url, template_id);
        let payload = json!({
            "create_now": false,
            "layers": properties.to_json(),
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| http::transport(SERVICE, e))?;
        let response = http::check(SERVICE, response).await?;
        let body: SubmitResponse = response
            .json()
            .await
            .map_err(|e| http::invalid(SERVICE, format!("Failed to parse submission: {}", e)))?;
        job_id(body)
    }

    #[tracing::instrument(skip(self))]
    async fn poll(&self, job_id: &str) -> TesseraResult<PollReport> {
        let url = format!("{}/images/{}", self.base_url, job_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| http::transport(SERVICE, e))?;
        let response = http::check(SERVICE, response).await?;
        let body: ImageResponse = response
            .json()
            .await
            .map_err(|e| http::invalid(SERVICE, format!("Failed to parse image status: {}", e)))?;
        Ok(poll_report(body))
    }
}

#[async_trait]
impl MediaUploader for PlacidClient {
    #[tracing::instrument(skip(self, image), fields(bytes = image.len()))]
    async fn upload(&self, image: &[u8], filename: &str) -> TesseraResult<String> {
        let url = format!("{}/media", self.base_url);
        let part = multipart::Part::bytes(image.to_vec())
            .file_name(filename.to_string())
            .mime_str("image/png")
            .map_err(|e| http::invalid(SERVICE, format!("Invalid upload part: {}", e)))?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| http::transport(SERVICE, e))?;
        let response = http::check(SERVICE, response).await?;
        let body: MediaResponse = response
            .json()
            .await
            .map_err(|e| http::invalid(SERVICE, format!("Failed to parse media response: {}", e)))?;
        media_url(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(body: &str) -> ImageResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_numeric_job_id() {
        let response: SubmitResponse = serde_json::from_str(r#"{"id": 1042, "status": "queued"}"#).unwrap();
        assert_eq!(job_id(response).unwrap(), "1042");
    }

    #[test]
    fn test_missing_job_id() {
        let response: SubmitResponse = serde_json::from_str(r#"{"status": "queued"}"#).unwrap();
        assert!(job_id(response).is_err());
    }

    #[test]
    fn test_poll_statuses() {
        assert_eq!(
            poll_report(image(r#"{"status": "queued"}"#)),
            PollReport::pending()
        );
        assert_eq!(
            poll_report(image(r#"{"status": "finished", "image_url": "https://cdn.test/1.png"}"#)),
            PollReport::finished("https://cdn.test/1.png")
        );
        assert_eq!(
            poll_report(image(r#"{"status": "error", "errors": ["Layer missing", "Bad font"]}"#)),
            PollReport::failed("Layer missing; Bad font")
        );
    }

    #[test]
    fn test_finished_without_url() {
        let report = poll_report(image(r#"{"status": "finished", "image_url": null}"#));
        assert_eq!(*report.status(), RenderStatus::Finished);
        assert!(report.url().is_none());
    }

    #[test]
    fn test_media_url() {
        let response: MediaResponse = serde_json::from_str(
            r#"{"media": [{"file_key": "file", "file_id": "https://media.test/abc.png"}]}"#,
        )
        .unwrap();
        assert_eq!(media_url(response).unwrap(), "https://media.test/abc.png");

        let empty: MediaResponse = serde_json::from_str(r#"{"media": []}"#).unwrap();
        assert!(media_url(empty).is_err());
    }
}
