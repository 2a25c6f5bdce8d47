//! 外部推論APIへの転送
//!
//! リトライ・タイムアウトなし。非2xxは本文ごと `UpstreamError::Status` にする。

use crate::config::Config;
use axum::body::Bytes;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use thiserror::Error;

pub const CLASSIFIER_UPLOAD: &str = "/upload";
pub const CLASSIFIER_MODELS: &str = "/classification-models";
pub const CLASSIFIER_CLASSIFY: &str = "/classify";
pub const COUNTER_UPLOAD: &str = "/upload-image";
pub const COUNTER_MODELS: &str = "/available-models";
pub const COUNTER_DETECT: &str = "/detect";

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("{status}: {body}")]
    Status { status: u16, body: String },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

/// 転送するフォームの1項目
#[derive(Debug, Clone)]
pub enum FormField {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: Option<String>,
        content_type: Option<String>,
        bytes: Bytes,
    },
}

impl FormField {
    pub fn text(name: &str, value: impl Into<String>) -> Self {
        Self::Text {
            name: name.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Classifier,
    Counter,
}

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    classifier_url: String,
    counter_url: String,
}

impl UpstreamClient {
    pub fn new(classifier_url: &str, counter_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            classifier_url: classifier_url.trim_end_matches('/').to_string(),
            counter_url: counter_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.classifier_url, &config.counter_url)
    }

    fn url(&self, service: Service, path: &str) -> String {
        let base = match service {
            Service::Classifier => &self.classifier_url,
            Service::Counter => &self.counter_url,
        };
        format!("{}{}", base, path)
    }

    pub async fn get_json(&self, service: Service, path: &str) -> Result<Value, UpstreamError> {
        let url = self.url(service, path);
        tracing::debug!(%url, "GET upstream");
        let response = self.client.get(&url).send().await?;
        read_json(response).await
    }

    pub async fn post_form(
        &self,
        service: Service,
        path: &str,
        fields: Vec<FormField>,
    ) -> Result<Value, UpstreamError> {
        let url = self.url(service, path);
        tracing::debug!(%url, fields = fields.len(), "POST upstream (multipart)");
        let response = self
            .client
            .post(&url)
            .multipart(build_form(fields)?)
            .send()
            .await?;
        read_json(response).await
    }
}

fn build_form(fields: Vec<FormField>) -> Result<Form, UpstreamError> {
    fields.into_iter().try_fold(Form::new(), |form, field| {
        let form = match field {
            FormField::Text { name, value } => form.text(name, value),
            FormField::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                let mut part = Part::bytes(bytes.to_vec());
                if let Some(file_name) = file_name {
                    part = part.file_name(file_name);
                }
                if let Some(content_type) = content_type {
                    part = part.mime_str(&content_type)?;
                }
                form.part(name, part)
            }
        };
        Ok::<_, UpstreamError>(form)
    })
}

async fn read_json(response: reqwest::Response) -> Result<Value, UpstreamError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(UpstreamError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_urls() {
        let client = UpstreamClient::new("http://classifier/", "http://counter");
        assert_eq!(client.url(Service::Classifier, CLASSIFIER_CLASSIFY), "http://classifier/classify");
        assert_eq!(client.url(Service::Counter, COUNTER_UPLOAD), "http://counter/upload-image");
    }

    #[test]
    fn test_status_error_display() {
        let err = UpstreamError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "502: bad gateway");
    }
}
