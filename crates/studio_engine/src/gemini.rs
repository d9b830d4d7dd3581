use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use studio_logging::{studio_debug, studio_info};
use url::Url;

use crate::{
    BackendError, BackendSettings, GenerationBackend, ImageInput, JobHandle, JobResult,
    JobSnapshot, VideoRequest,
};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP backend speaking the Generative Language REST API.
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    settings: BackendSettings,
    client: reqwest::Client,
}

impl GeminiBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| BackendError::Network(err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        let base = self.settings.base_url.trim_end_matches('/');
        Url::parse(&format!("{base}/v1beta/{path}"))
            .map_err(|err| BackendError::InvalidUrl(err.to_string()))
    }

    async fn post_json<B, R>(&self, url: Url, body: &B) -> Result<R, BackendError>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.settings.api_key)
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        decode_json(response).await
    }

    async fn generate_content(&self, parts: Vec<Part>) -> Result<String, BackendError> {
        let url = self.endpoint(&format!(
            "models/{}:generateContent",
            self.settings.text_model
        ))?;
        let body = GenerateContentRequest {
            contents: vec![Content { parts }],
        };
        let response: GenerateContentResponse = self.post_json(url, &body).await?;
        response.text().ok_or_else(|| {
            BackendError::InvalidResponse("response contained no text candidates".to_string())
        })
    }
}

#[async_trait::async_trait]
impl GenerationBackend for GeminiBackend {
    async fn generate_text(&self, prompt: &str) -> Result<String, BackendError> {
        self.generate_content(vec![Part::text(prompt)]).await
    }

    async fn describe_image(
        &self,
        prompt: &str,
        image: &ImageInput,
    ) -> Result<String, BackendError> {
        self.generate_content(vec![Part::text(prompt), Part::inline(image)])
            .await
    }

    async fn submit_video(&self, request: &VideoRequest) -> Result<JobHandle, BackendError> {
        let url = self.endpoint(&format!("models/{}:predictLongRunning", request.model))?;
        let body = PredictRequest {
            instances: vec![VideoInstance {
                prompt: request.prompt.clone(),
                image: request.image.as_ref().map(|image| EncodedImage {
                    bytes_base64_encoded: BASE64.encode(&image.bytes),
                    mime_type: image.mime_type.clone(),
                }),
            }],
            parameters: VideoParameters {
                sample_count: request.video_count,
            },
        };
        let operation: Operation = self.post_json(url, &body).await?;
        studio_info!("Video operation {} accepted", operation.name);
        Ok(JobHandle::new(operation.name))
    }

    async fn check_status(&self, handle: &JobHandle) -> Result<JobSnapshot, BackendError> {
        let url = self.endpoint(handle.as_str())?;
        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.settings.api_key)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let operation: Operation = decode_json(response).await?;
        Ok(operation.into_snapshot())
    }

    async fn download(&self, artifact_uri: &str) -> Result<Bytes, BackendError> {
        let mut url =
            Url::parse(artifact_uri).map_err(|err| BackendError::InvalidUrl(err.to_string()))?;
        url.query_pairs_mut().append_pair("key", &self.settings.api_key);

        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;
        let response = check_status(response)?;

        let max_bytes = self.settings.max_download_bytes;
        if let Some(len) = response.content_length() {
            if len > max_bytes {
                return Err(BackendError::InvalidResponse(format!(
                    "artifact too large ({len} > {max_bytes} bytes)"
                )));
            }
        }

        let mut buffer = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            if buffer.len() as u64 + chunk.len() as u64 > max_bytes {
                return Err(BackendError::InvalidResponse(format!(
                    "artifact exceeds {max_bytes} bytes"
                )));
            }
            buffer.extend_from_slice(&chunk);
        }
        studio_debug!("Downloaded artifact ({} bytes)", buffer.len());
        Ok(buffer.freeze())
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(BackendError::HttpStatus {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
    })
}

async fn decode_json<R>(response: reqwest::Response) -> Result<R, BackendError>
where
    R: for<'de> Deserialize<'de>,
{
    let response = check_status(response)?;
    let body = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&body).map_err(|err| BackendError::InvalidResponse(err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        return BackendError::Timeout(err.to_string());
    }
    BackendError::Network(err.to_string())
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            inline_data: None,
        }
    }

    fn inline(image: &ImageInput) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: image.mime_type.clone(),
                data: BASE64.encode(&image.bytes),
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<VideoInstance>,
    parameters: VideoParameters,
}

#[derive(Debug, Serialize)]
struct VideoInstance {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<EncodedImage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EncodedImage {
    bytes_base64_encoded: String,
    mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoParameters {
    sample_count: u8,
}

#[derive(Debug, Deserialize)]
struct Operation {
    name: String,
    #[serde(default)]
    done: bool,
    response: Option<OperationResponse>,
}

impl Operation {
    fn into_snapshot(self) -> JobSnapshot {
        let result = self.response.map(|response| JobResult {
            artifact_uri: response
                .generate_video_response
                .and_then(|videos| videos.generated_samples.into_iter().next())
                .and_then(|sample| sample.video)
                .and_then(|video| video.uri),
        });
        JobSnapshot {
            done: self.done,
            result,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponse {
    #[serde(default)]
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSample {
    video: Option<VideoFile>,
}

#[derive(Debug, Deserialize)]
struct VideoFile {
    uri: Option<String>,
}
