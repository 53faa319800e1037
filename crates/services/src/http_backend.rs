use std::env;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use quiz_core::model::{AnswerOutcome, TestId};

use crate::backend::{BackendEnvelope, QuizBackend};
use crate::error::BackendError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpBackendConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl HttpBackendConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
        }
    }

    /// Reads `QUIZ_BACKEND_URL` and the optional `QUIZ_BACKEND_API_KEY`.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("QUIZ_BACKEND_URL").ok()?;
        if base_url.trim().is_empty() {
            return None;
        }
        let api_key = env::var("QUIZ_BACKEND_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        Some(Self { base_url, api_key })
    }

    /// Appends `segments` to the base url, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| BackendError::InvalidUrl(format!("{}: {err}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| BackendError::InvalidUrl(format!("{} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Backend reached over HTTP with JSON envelopes.
///
/// `POST {base}/sessions` opens a session; answers go to
/// `POST {base}/sessions/{session}/answers`.
pub struct HttpQuizBackend {
    client: Client,
    config: Option<HttpBackendConfig>,
    session: Mutex<Option<String>>,
}

impl HttpQuizBackend {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(HttpBackendConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<HttpBackendConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
            session: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Session key issued by the last successful `start_session`.
    #[must_use]
    pub fn session_key(&self) -> Option<String> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn post<T: Serialize + Sync>(
        &self,
        config: &HttpBackendConfig,
        segments: &[&str],
        body: &T,
    ) -> Result<BackendEnvelope, BackendError> {
        let url = config.endpoint(segments)?;
        debug!(%url, "backend request");
        let mut request = self.client.post(url.clone()).json(body);
        if let Some(key) = &config.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            warn!(%url, status = %response.status(), "backend returned an error status");
            return Err(BackendError::HttpStatus(response.status()));
        }
        Ok(response.json().await?)
    }
}

#[derive(Debug, Serialize)]
struct StartRequest<'a> {
    test_id: &'a str,
}

#[derive(Debug, Serialize)]
struct AnswerRequest {
    result: &'static str,
}

#[async_trait]
impl QuizBackend for HttpQuizBackend {
    async fn start_session(&self, test_id: &TestId) -> Result<BackendEnvelope, BackendError> {
        let config = self.config.as_ref().ok_or(BackendError::Disabled)?;
        let envelope = self
            .post(
                config,
                &["sessions"],
                &StartRequest {
                    test_id: test_id.as_str(),
                },
            )
            .await?;

        if envelope.success {
            let key = envelope
                .data
                .as_ref()
                .and_then(|data| {
                    data.extra
                        .get("session_id")
                        .or_else(|| data.extra.get("sessionId"))
                })
                .and_then(Value::as_str)
                .map_or_else(|| test_id.as_str().to_string(), str::to_string);
            *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(key);
        }
        Ok(envelope)
    }

    async fn submit_answer_result(
        &self,
        outcome: AnswerOutcome,
    ) -> Result<BackendEnvelope, BackendError> {
        let config = self.config.as_ref().ok_or(BackendError::Disabled)?;
        let key = self.session_key().ok_or(BackendError::NotStarted)?;
        self.post(
            config,
            &["sessions", key.as_str(), "answers"],
            &AnswerRequest {
                result: outcome.as_str(),
            },
        )
        .await
    }
}
