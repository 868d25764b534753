//! Backend REST client.
//!
//! Thin blocking wrapper over the interview backend: JSON bodies for reads,
//! multipart forms for interview setup and audio/resume uploads. Identity is
//! explicit configuration attached per request, never process-global state.
//! Callers treat failures as retryable; the in-memory transcript is never
//! discarded because a request failed.

use crate::audio::AudioBlob;
use crate::feedback::FeedbackPayload;
use reqwest::blocking::{multipart, Client, RequestBuilder};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

const USER_ID_HEADER: &str = "X-User-Id";
const USER_EMAIL_HEADER: &str = "X-User-Email";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status}: {detail}")]
    Status { status: StatusCode, detail: String },
}

/// Explicit client settings; replaces the old global default-headers setup.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    pub timeout_ms: u64,
}

pub struct ApiClient {
    http: Client,
    cfg: ApiConfig,
}

impl ApiClient {
    pub fn new(cfg: ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms.max(1)))
            .build()?;
        Ok(Self { http, cfg })
    }

    fn endpoint(&self, path: &str) -> String {
        join_endpoint(&self.cfg.base_url, path)
    }

    fn with_identity(&self, request: RequestBuilder) -> RequestBuilder {
        let mut request = request;
        if let Some(user_id) = &self.cfg.user_id {
            request = request.header(USER_ID_HEADER, user_id);
        }
        if let Some(email) = &self.cfg.user_email {
            request = request.header(USER_EMAIL_HEADER, email);
        }
        request
    }

    fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        let response = self.with_identity(self.http.get(self.endpoint(path))).send()?;
        read_json(response)
    }

    /// Register a session with the backend before the first question.
    pub fn setup_interview(
        &self,
        role: &str,
        interview_type: &str,
        custom_round: Option<&str>,
    ) -> Result<Value, ApiError> {
        let mut form = multipart::Form::new()
            .text("role", role.to_string())
            .text("interview_type", interview_type.to_string());
        if let Some(round) = custom_round {
            form = form.text("custom_round", round.to_string());
        }
        let response = self
            .with_identity(self.http.post(self.endpoint("/api/setup")))
            .multipart(form)
            .send()?;
        read_json(response)
    }

    /// Upload one recorded answer together with the self-reported focus
    /// score.
    pub fn send_audio(&self, audio: &AudioBlob, focus_score: f32) -> Result<Value, ApiError> {
        let part = multipart::Part::bytes(audio.as_bytes().to_vec())
            .file_name("audio.wav")
            .mime_str("audio/wav")?;
        let form = multipart::Form::new()
            .part("audio", part)
            .text("focus_score", focus_score.to_string());
        let response = self
            .with_identity(self.http.post(self.endpoint("/api/audio")))
            .multipart(form)
            .send()?;
        read_json(response)
    }

    pub fn parse_resume(&self, file_name: &str, bytes: Vec<u8>) -> Result<Value, ApiError> {
        let part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = multipart::Form::new().part("resume", part);
        let response = self
            .with_identity(self.http.post(self.endpoint("/api/parse-resume")))
            .multipart(form)
            .send()?;
        read_json(response)
    }

    /// Feedback for the active session, decoded at the boundary.
    pub fn fetch_feedback(&self) -> Result<FeedbackPayload, ApiError> {
        Ok(FeedbackPayload::decode(self.get_json("/api/feedback")?))
    }

    /// A past interview by id, same decoding as live feedback.
    pub fn fetch_interview(&self, interview_id: &str) -> Result<FeedbackPayload, ApiError> {
        let path = format!("/api/interviews/{interview_id}");
        Ok(FeedbackPayload::decode(self.get_json(&path)?))
    }

    pub fn interview_history(&self) -> Result<Value, ApiError> {
        self.get_json("/api/interviews")
    }

    pub fn coding_problem(&self) -> Result<Value, ApiError> {
        self.get_json("/api/coding-problem")
    }

    pub fn submit_code(&self, code: &str) -> Result<Value, ApiError> {
        let response = self
            .with_identity(self.http.post(self.endpoint("/api/submit-code")))
            .json(&json!({ "code": code }))
            .send()?;
        read_json(response)
    }

    pub fn send_code_explanation(&self, audio: &AudioBlob) -> Result<Value, ApiError> {
        let part = multipart::Part::bytes(audio.as_bytes().to_vec())
            .file_name("explanation.wav")
            .mime_str("audio/wav")?;
        let form = multipart::Form::new().part("audio", part);
        let response = self
            .with_identity(self.http.post(self.endpoint("/api/code-explanation")))
            .multipart(form)
            .send()?;
        read_json(response)
    }

    pub fn user_profile(&self) -> Result<Value, ApiError> {
        self.get_json("/api/user/profile")
    }

    pub fn update_user_profile(&self, profile: &Value) -> Result<Value, ApiError> {
        let response = self
            .with_identity(self.http.put(self.endpoint("/api/user/profile")))
            .json(profile)
            .send()?;
        read_json(response)
    }

    pub fn dashboard_stats(&self) -> Result<Value, ApiError> {
        self.get_json("/api/dashboard/stats")
    }
}

fn join_endpoint(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

fn read_json(response: reqwest::blocking::Response) -> Result<Value, ApiError> {
    let status = response.status();
    if !status.is_success() {
        // The backend puts human-readable errors under `detail`.
        let detail = response
            .json::<Value>()
            .ok()
            .and_then(|body| {
                body.get("detail")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        return Err(ApiError::Status { status, detail });
    }
    Ok(response.json()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_join_without_duplicate_slashes() {
        assert_eq!(
            join_endpoint("http://localhost:8000", "/api/setup"),
            "http://localhost:8000/api/setup"
        );
        assert_eq!(
            join_endpoint("http://localhost:8000/", "/api/setup"),
            "http://localhost:8000/api/setup"
        );
        assert_eq!(
            join_endpoint("http://localhost:8000", "api/setup"),
            "http://localhost:8000/api/setup"
        );
    }

    #[test]
    fn client_builds_from_explicit_config() {
        let client = ApiClient::new(ApiConfig {
            base_url: "http://localhost:8000".to_string(),
            user_id: Some("user_1".to_string()),
            user_email: None,
            timeout_ms: 5_000,
        })
        .expect("client builds");
        assert_eq!(
            client.endpoint("/api/feedback"),
            "http://localhost:8000/api/feedback"
        );
    }
}
