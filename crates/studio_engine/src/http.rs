use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use studio_core::{
    ArticleItem, ContentKind, EntityRef, JobId, JobStatus, SubmitReceipt, UploadPayload, VideoItem,
};
use studio_logging::studio_debug;
use url::Url;

use crate::{ApiError, FailureKind, StudioApi};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub base_url: String,
    pub auth_token: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            auth_token: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// JSON-over-HTTP implementation of the studio collaborators.
#[derive(Debug, Clone)]
pub struct ReqwestApi {
    client: reqwest::Client,
    base: Url,
    auth_token: Option<String>,
}

impl ReqwestApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot be a base url", settings.base_url),
            ));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            client,
            base,
            auth_token: settings.auth_token,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.endpoint(segments);
        studio_debug!("{} {}", method, url);
        let request = self.client.request(method, url);
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::GET, segments)).await?;
        response.json::<T>().await.map_err(map_reqwest_error)
    }
}

fn like_segment(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Video => "videos",
        ContentKind::Article => "articles",
    }
}

#[async_trait::async_trait]
impl StudioApi for ReqwestApi {
    async fn submit_job(&self, payload: &UploadPayload) -> Result<SubmitReceipt, ApiError> {
        let media = tokio::fs::read(&payload.media_path).await.map_err(|err| {
            ApiError::new(
                FailureKind::InvalidPayload,
                format!("{}: {err}", payload.media_path.display()),
            )
        })?;
        let file_name = payload
            .media_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".to_string());

        let mut form = Form::new()
            .text("title", payload.title.clone())
            .part("file", Part::bytes(media).file_name(file_name));
        if let Some(description) = &payload.description {
            form = form.text("description", description.clone());
        }

        let request = self
            .request(Method::POST, &["videos", "upload"])
            .multipart(form);
        let response = self.send(request).await?;
        response
            .json::<SubmitReceipt>()
            .await
            .map_err(map_reqwest_error)
    }

    async fn get_job_status(&self, job_id: &JobId) -> Result<JobStatus, ApiError> {
        self.get_json(&["jobs", job_id.0.as_str()]).await
    }

    async fn toggle_like(&self, target: &EntityRef) -> Result<(), ApiError> {
        let request = self.request(
            Method::POST,
            &[like_segment(target.kind), target.id.as_str(), "like"],
        );
        self.send(request).await.map(|_| ())
    }

    async fn fetch_videos(&self) -> Result<Vec<VideoItem>, ApiError> {
        self.get_json(&["videos"]).await
    }

    async fn fetch_articles(&self) -> Result<Vec<ArticleItem>, ApiError> {
        self.get_json(&["articles"]).await
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::Decode, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
