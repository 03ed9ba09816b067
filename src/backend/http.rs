use std::path::Path;

use super::{BackendApi, BackendError};
use crate::config::BackendConfig;
use crate::models::{Document, IngestReceipt, RetrainReply, ValidationAck, ValidationEvent};

/// HTTP client for the correction backend.
pub struct HttpBackend {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpBackend {
    /// Create a client from explicit configuration.
    pub fn new(config: &BackendConfig) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: config.base_url().to_string(),
            client,
            timeout_secs: config.timeout_secs,
        }
    }

    /// Client for the backend named by `CORRIGO_BACKEND_URL`, falling back
    /// to the default local address.
    pub fn from_env() -> Self {
        Self::new(&BackendConfig::from_env())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_send_error(&self, e: reqwest::Error) -> BackendError {
        if e.is_connect() {
            BackendError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            BackendError::Timeout {
                secs: self.timeout_secs,
            }
        } else {
            BackendError::Request(e.to_string())
        }
    }

    fn check_status(response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, BackendError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(BackendError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

impl BackendApi for HttpBackend {
    fn list_documents(&self) -> Result<Vec<Document>, BackendError> {
        let url = format!("{}/documents", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| self.map_send_error(e))?;
        let response = Self::check_status(response)?;

        response
            .json()
            .map_err(|e| BackendError::ResponseParsing(e.to_string()))
    }

    fn upload(&self, path: &Path) -> Result<IngestReceipt, BackendError> {
        let url = format!("{}/upload", self.base_url);
        let filename = crate::ingest::sanitize_filename(
            path.file_name().and_then(|n| n.to_str()).unwrap_or("document"),
        );
        let part = reqwest::blocking::multipart::Part::file(path)?.file_name(filename);
        let form = reqwest::blocking::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .map_err(|e| self.map_send_error(e))?;
        let response = Self::check_status(response)?;

        response
            .json()
            .map_err(|e| BackendError::ResponseParsing(e.to_string()))
    }

    fn validate(&self, event: &ValidationEvent) -> Result<ValidationAck, BackendError> {
        let url = format!("{}/validate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(event)
            .send()
            .map_err(|e| self.map_send_error(e))?;
        let response = Self::check_status(response)?;

        response
            .json()
            .map_err(|e| BackendError::ResponseParsing(e.to_string()))
    }

    fn retrain(&self) -> Result<RetrainReply, BackendError> {
        let url = format!("{}/retrain", self.base_url);

        let response = self
            .client
            .post(&url)
            .send()
            .map_err(|e| self.map_send_error(e))?;
        let response = Self::check_status(response)?;

        response
            .json()
            .map_err(|e| BackendError::ResponseParsing(e.to_string()))
    }
}
