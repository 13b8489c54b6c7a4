//! Thin JSON-over-HTTP client
//!
//! One request per call. Failures are surfaced to the caller as-is: the
//! dashboard never retries, it reports and waits for the next user action or
//! refresh tick.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crewdash_types::{ConfigError, Error, Result};

#[derive(Deserialize, Debug)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
}

/// Turn a response into `T`, mapping HTTP errors onto [`Error`]
async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| Error::Http(e.to_string()))?;

    if status.is_success() {
        return serde_json::from_str(&text).map_err(Error::from);
    }

    let message = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(ErrorBody { error: Some(msg) }) => msg,
        _ if text.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
        _ => text,
    };

    if status == StatusCode::NOT_FOUND {
        return Err(Error::NotFound(message));
    }
    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}

/// Parse and check an API base URL (`http`/`https` with a host)
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let invalid = |reason: String| {
        Error::from(ConfigError::InvalidValue(format!(
            "api_base_url must be an http(s) URL, got '{}': {}",
            raw.trim(),
            reason
        )))
    };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    if url.cannot_be_a_base() || url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

impl HttpClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Base URL with `segments` appended, each one percent-encoded
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidInput(format!("cannot extend URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        method: &str,
        path: &str,
    ) -> Result<T> {
        debug!(method, path, "api request");
        let response = request.send().await.map_err(|e| {
            warn!(method, path, error = %e, "api request failed");
            Error::Http(e.to_string())
        })?;

        let status = response.status().as_u16();
        let result = parse_response(response).await;
        match &result {
            Ok(_) => debug!(method, path, status, "api response"),
            Err(e) => warn!(method, path, status, error = %e, "api error response"),
        }
        result
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &[&str]) -> Result<T> {
        let request = self.client.get(self.url(path)?);
        self.send(request, "GET", &path.join("/")).await
    }

    pub async fn post<B, T>(&self, path: &[&str], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.client.post(self.url(path)?).json(body);
        self.send(request, "POST", &path.join("/")).await
    }

    pub async fn put<B, T>(&self, path: &[&str], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.client.put(self.url(path)?).json(body);
        self.send(request, "PUT", &path.join("/")).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &[&str]) -> Result<T> {
        let request = self.client.delete(self.url(path)?);
        self.send(request, "DELETE", &path.join("/")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let client = HttpClient::new("http://localhost:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(
            client.url(&["get_employees"]).unwrap().as_str(),
            "http://localhost:5000/get_employees"
        );
        assert_eq!(
            client.url(&["get_employee", "abc"]).unwrap().as_str(),
            "http://localhost:5000/get_employee/abc"
        );
    }

    #[test]
    fn test_url_keeps_base_path() {
        let client = HttpClient::new("https://ops.local/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.url(&["get_trucks"]).unwrap().as_str(),
            "https://ops.local/api/get_trucks"
        );
    }

    #[test]
    fn test_record_ids_are_encoded() {
        let client = HttpClient::new("http://localhost:5000", Duration::from_secs(1)).unwrap();
        let url = client.url(&["delete_employee", "../get_trucks?x=1"]).unwrap();
        assert!(url.as_str().contains("%2F"));
        assert!(url.as_str().contains("%3F"));
        assert_eq!(url.query(), None);
        assert_eq!(url.path_segments().map(|s| s.count()), Some(2));
    }

    #[test]
    fn test_parse_base_url() {
        assert!(parse_base_url("http://127.0.0.1:5000").is_ok());
        assert!(parse_base_url(" https://host:8443 ").is_ok());
        assert!(matches!(parse_base_url("ftp://host"), Err(Error::Config(_))));
        assert!(parse_base_url("http://").is_err());
        assert!(parse_base_url("localhost:5000").is_err());
        assert!(parse_base_url("mailto:ops@host").is_err());
    }
}
