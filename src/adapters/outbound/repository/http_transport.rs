use crate::shared::error::CuratorError;
use crate::shared::security::MAX_FILE_SIZE;
use crate::shared::Result;
use std::time::Duration;
use tracing::debug;

/// Blocking HTTP access to remote Maven repositories
///
/// A 404 means "not in this repository" and is not an error. Failed requests
/// are not retried.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let version = env!("CARGO_PKG_VERSION");
        let user_agent = format!("app-curator/{}", version);
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Downloads `url`.
    ///
    /// # Returns
    /// The body, or `None` when the repository does not have the resource
    ///
    /// # Errors
    /// Returns `CuratorError::Transport` on connection failures, non-404 error
    /// statuses and bodies larger than the file size limit
    pub fn fetch(&self, url: &str) -> Result<Option<Vec<u8>>> {
        let transport_error = |details: String| CuratorError::Transport {
            url: url.to_string(),
            details,
        };

        debug!(url, "fetching");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| transport_error(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(transport_error(format!("HTTP {}", status)).into());
        }

        if let Some(length) = response.content_length() {
            if length > MAX_FILE_SIZE {
                return Err(transport_error(format!(
                    "response of {} bytes exceeds the limit of {} bytes",
                    length, MAX_FILE_SIZE
                ))
                .into());
            }
        }

        let body = response
            .bytes()
            .map_err(|e| transport_error(e.to_string()))?;
        if body.len() as u64 > MAX_FILE_SIZE {
            return Err(transport_error(format!(
                "response exceeds the limit of {} bytes",
                MAX_FILE_SIZE
            ))
            .into());
        }
        Ok(Some(body.to_vec()))
    }
}
