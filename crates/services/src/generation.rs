use std::collections::HashSet;
use std::env;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use url::Url;

use mpt_core::model::{Question, QuestionId};

use crate::error::GenerationError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(150);
const GENERATE_PATH: &str = "/api/generate-mcqs";

/// Difficulty label sent to the generation endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// Body of a question-generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct McqRequest {
    pub subject: String,
    pub count: u32,
    pub difficulty: Difficulty,
    pub pakistan_only: bool,
}

/// Response of the generation endpoint. Only `questions` is consumed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McqResponse {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub pakistan_only: Option<bool>,
    #[serde(default)]
    pub questions: Option<Vec<QuestionPayload>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPayload {
    pub id: i64,
    pub statement: String,
    pub options: Vec<String>,
    pub correct_option_index: usize,
}

impl McqResponse {
    /// Validate the payload into domain questions.
    ///
    /// A missing question list is an empty set.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::InvalidQuestion` for a question whose correct
    /// index is out of range and `GenerationError::DuplicateQuestion` when two
    /// questions share an id.
    pub fn into_questions(self) -> Result<Vec<Question>, GenerationError> {
        let payloads = self.questions.unwrap_or_default();
        let mut seen = HashSet::with_capacity(payloads.len());
        let mut out = Vec::with_capacity(payloads.len());
        for payload in payloads {
            let id = QuestionId::new(payload.id);
            if !seen.insert(id) {
                return Err(GenerationError::DuplicateQuestion(id));
            }
            out.push(Question::new(
                id,
                payload.statement,
                payload.options,
                payload.correct_option_index,
            )?);
        }
        Ok(out)
    }
}

/// Anything that can produce a question set for a request.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch and validate a question set.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` when the request fails or the response is malformed.
    async fn generate(&self, request: &McqRequest) -> Result<Vec<Question>, GenerationError>;
}

#[derive(Clone, Debug)]
pub struct GenerationConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GenerationConfig {
    /// Read `MPT_API_BASE_URL` and `MPT_API_TIMEOUT_SECS`, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = env::var("MPT_API_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let timeout = env::var("MPT_API_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_TIMEOUT, Duration::from_secs);
        Self { base_url, timeout }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Full URL of the generation route.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::InvalidBaseUrl` if `base_url` is not a valid URL.
    pub fn endpoint(&self) -> Result<Url, GenerationError> {
        let base = self.base_url.trim().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{GENERATE_PATH}"))?)
    }
}

/// `QuestionSource` backed by the remote MCQ generation endpoint.
#[derive(Clone)]
pub struct HttpQuestionSource {
    client: Client,
    endpoint: Url,
    timeout: Duration,
}

impl HttpQuestionSource {
    /// Build a client for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` if the base URL is invalid or the HTTP client
    /// cannot be constructed.
    pub fn new(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint()?,
            timeout: config.timeout,
        })
    }
}

#[async_trait]
impl QuestionSource for HttpQuestionSource {
    async fn generate(&self, request: &McqRequest) -> Result<Vec<Question>, GenerationError> {
        debug!("requesting {} questions for {:?}", request.count, request.subject);

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        if !response.status().is_success() {
            return Err(GenerationError::HttpStatus(response.status()));
        }

        let body: McqResponse = response.json().await.map_err(|e| self.map_transport(e))?;
        body.into_questions()
    }
}

impl HttpQuestionSource {
    fn map_transport(&self, err: reqwest::Error) -> GenerationError {
        if err.is_timeout() {
            GenerationError::Timeout(self.timeout)
        } else {
            GenerationError::Http(err)
        }
    }
}
