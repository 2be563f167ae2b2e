//! HTTP status-endpoint checker for upstream services.

use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;

use super::{CheckError, ServiceChecker};
use crate::types::{Error, Result, ServiceEndpoint};

/// Probes `GET {base_url}{status_path}` with the service's `X-Api-Key`.
/// Any status below 400 counts as healthy.
#[derive(Debug, Clone)]
pub struct HttpStatusChecker {
    name: String,
    url: Url,
    api_key: String,
    client: reqwest::Client,
}

impl HttpStatusChecker {
    pub fn new(endpoint: &ServiceEndpoint, timeout: Duration) -> Result<Self> {
        let mut url = Url::parse(&endpoint.base_url).map_err(|e| {
            Error::config(format!(
                "invalid base_url for service {}: {}",
                endpoint.name, e
            ))
        })?;
        url.set_path(&endpoint.status_path);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            name: endpoint.name.clone(),
            url,
            api_key: endpoint.api_key.clone(),
            client,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl ServiceChecker for HttpStatusChecker {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> std::result::Result<(), CheckError> {
        let response = self
            .client
            .get(self.url.clone())
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| CheckError::new(format!("health check failed: {}", e)))?;

        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(CheckError::new(format!(
                "health check failed with status: {}",
                status.as_u16()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use tokio::net::TcpListener;

    async fn status(headers: HeaderMap) -> StatusCode {
        match headers.get("X-Api-Key").and_then(|v| v.to_str().ok()) {
            Some("good-key") => StatusCode::OK,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    async fn spawn_upstream() -> String {
        let app = Router::new().route("/api/v3/system/status", get(status));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn endpoint(base_url: &str, api_key: &str) -> ServiceEndpoint {
        ServiceEndpoint {
            name: "sonarr".to_string(),
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            status_path: "/api/v3/system/status".to_string(),
        }
    }

    #[test]
    fn test_status_path_replaces_base_path() {
        let checker =
            HttpStatusChecker::new(&endpoint("http://localhost:8989/ignored", "k"), Duration::from_secs(1))
                .unwrap();
        assert_eq!(checker.url().as_str(), "http://localhost:8989/api/v3/system/status");
        assert_eq!(checker.name(), "sonarr");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let err = HttpStatusChecker::new(&endpoint("not a url", "k"), Duration::from_secs(1))
            .unwrap_err();
        assert!(err.to_string().contains("sonarr"));
    }

    #[tokio::test]
    async fn test_healthy_with_valid_key() {
        let base = spawn_upstream().await;
        let checker = HttpStatusChecker::new(&endpoint(&base, "good-key"), Duration::from_secs(5))
            .unwrap();
        assert!(checker.check().await.is_ok());
    }

    #[tokio::test]
    async fn test_error_status_is_unhealthy() {
        let base = spawn_upstream().await;
        let checker = HttpStatusChecker::new(&endpoint(&base, "bad-key"), Duration::from_secs(5))
            .unwrap();
        let err = checker.check().await.unwrap_err();
        assert_eq!(err.to_string(), "health check failed with status: 401");
    }

    #[tokio::test]
    async fn test_unreachable_is_unhealthy() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let checker = HttpStatusChecker::new(
            &endpoint(&format!("http://{}", addr), "good-key"),
            Duration::from_secs(2),
        )
        .unwrap();
        let err = checker.check().await.unwrap_err();
        assert!(err.to_string().starts_with("health check failed: "));
    }
}
