use crate::form::FormFields;
use crate::models::ApiResponse;
use crate::{Error, Result};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Thin HTTP layer shared by every gateway call.
///
/// Knows the two wire protocols of the service: multipart submissions answered
/// with a JSON envelope, and bare POSTs answered with a binary stream.
pub struct GatewayHttpClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
}

impl GatewayHttpClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::new_with_client(base_url, client))
    }

    pub fn new_with_client(base_url: String, client: Client) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `prefix` followed by `segment` as a single percent-encoded path segment.
    pub(crate) fn segment_url(&self, prefix: &str, segment: &str) -> Result<Url> {
        let mut url = Url::parse(&self.url(prefix)).map_err(|e| {
            Error::Config(format!("Invalid service base URL '{}': {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                Error::Config(format!(
                    "Service base URL cannot take path segments: {}",
                    self.base_url
                ))
            })?
            .push(segment);
        Ok(url)
    }

    /// Submits `fields` as multipart form data and decodes the envelope.
    ///
    /// The envelope is returned whatever the HTTP status, as long as the body
    /// decodes. A body that does not decode is a transport failure, and so is
    /// a successful envelope whose `data` is not a `Resp`.
    pub async fn post_form<Resp: DeserializeOwned>(
        &self,
        path: &str,
        fields: FormFields,
    ) -> Result<ApiResponse<Resp>> {
        let url = self.url(path);
        tracing::debug!("POST {} ({} fields)", url, fields.len());

        let form = fields.into_multipart()?;
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to {}: {}", url, e);
                e
            })?;

        let status = response.status();
        let body = response.text().await?;

        match decode_envelope::<Resp>(&body) {
            Ok(envelope) => {
                if !status.is_success() {
                    tracing::debug!(
                        "Service answered {} with envelope (successful: {})",
                        status,
                        envelope.successful
                    );
                }
                Ok(envelope)
            }
            Err(e) => {
                tracing::error!(
                    "Failed to parse response envelope from {} (status {}): {}\nBody: {}",
                    url,
                    status,
                    e,
                    body
                );
                Err(Error::Transport {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }

    /// Bare POST whose response body is returned untouched.
    pub async fn post_for_bytes(&self, url: Url) -> Result<Vec<u8>> {
        tracing::debug!("POST {} (binary response)", url);

        let response = self.client.post(url.clone()).send().await.map_err(|e| {
            tracing::error!("Failed to send request to {}: {}", url, e);
            e
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!("Download error (status {}): {}", status, error_text);
            return Err(Error::Transport {
                status: status.as_u16(),
                body: error_text,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Decodes an envelope, typing `data` only when `successful` is true.
///
/// A failed envelope may carry anything in `data`; it is dropped so the
/// failure still reaches the caller as a value.
fn decode_envelope<Resp: DeserializeOwned>(body: &str) -> serde_json::Result<ApiResponse<Resp>> {
    let raw: ApiResponse<serde_json::Value> = serde_json::from_str(body)?;

    let data = match raw.data {
        Some(value) if raw.successful => Some(serde_json::from_value(value)?),
        _ => None,
    };

    Ok(ApiResponse {
        status_code: raw.status_code,
        successful: raw.successful,
        message: raw.message,
        data,
    })
}
