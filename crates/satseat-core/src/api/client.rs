//! API client for the College Board test-date and test-center endpoints.
//!
//! Both endpoints are public and read-only; no authentication is involved.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::fetcher::AvailabilitySource;
use crate::models::{RawSchool, Session};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Lists the upcoming SAT administrations.
pub const SESSIONS_URL: &str = "https://sat-admin-dates.collegeboard.org/";

/// Searches test centers for one date near one zip code.
pub const TEST_CENTERS_URL: &str =
    "https://aru-test-center-search.collegeboard.org/prod/test-centers";

/// Test centers are only searched within the US.
const COUNTRY: &str = "US";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the College Board admissions endpoints.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    sessions_url: String,
    test_centers_url: String,
}

impl ApiClient {
    /// Create a client pointed at the production endpoints
    pub fn new() -> Result<Self, ApiError> {
        Self::with_urls(SESSIONS_URL, TEST_CENTERS_URL)
    }

    /// Create a client pointed at custom endpoints (mirrors, staging)
    pub fn with_urls(
        sessions_url: impl Into<String>,
        test_centers_url: impl Into<String>,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            sessions_url: sessions_url.into(),
            test_centers_url: test_centers_url.into(),
        })
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let url = response.url().to_string();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &url, &body))
        }
    }

    /// Send a prepared GET and decode the JSON body.
    async fn get<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let response = Self::check_response(request.send().await?).await?;
        let url = response.url().to_string();
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{} from {}", e, url)))
    }

    // ===== Data Fetching Methods =====

    /// Fetch all upcoming test dates
    pub async fn fetch_sessions(&self) -> Result<Vec<Session>, ApiError> {
        let sessions: Vec<Session> = self.get(self.client.get(&self.sessions_url)).await?;
        debug!(count = sessions.len(), "Sessions received");
        Ok(sessions)
    }

    /// Fetch every test center near `zip` for one test date, with or without seats
    pub async fn fetch_test_centers(
        &self,
        date_key: &str,
        zip: &str,
    ) -> Result<Vec<RawSchool>, ApiError> {
        let request = self
            .client
            .get(&self.test_centers_url)
            .query(&[("date", date_key), ("zip", zip), ("country", COUNTRY)]);
        let schools: Vec<RawSchool> = self.get(request).await?;
        debug!(date = date_key, count = schools.len(), "Test centers received");
        Ok(schools)
    }
}

impl AvailabilitySource for ApiClient {
    async fn sessions(&self) -> Result<Vec<Session>, ApiError> {
        self.fetch_sessions().await
    }

    async fn test_centers(&self, date_key: &str, zip: &str) -> Result<Vec<RawSchool>, ApiError> {
        self.fetch_test_centers(date_key, zip).await
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    /// Serve a single canned HTTP response on a local port. The handle
    /// resolves to the request head the client sent.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&head).into_owned()
        });

        (format!("http://{}", addr), handle)
    }

    fn client_for(base: &str) -> ApiClient {
        ApiClient::with_urls(format!("{}/", base), format!("{}/prod/test-centers", base)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_sessions_decodes_json() {
        let (base, server) = serve_once(
            "200 OK",
            r#"[{"eventFormattedDate":"2024-03-09","eventDisplayDate":"March 9, 2024"}]"#,
        )
        .await;

        let sessions = client_for(&base).fetch_sessions().await.unwrap();
        assert_eq!(sessions, vec![Session::new("2024-03-09", "March 9, 2024")]);

        let head = server.await.unwrap();
        assert!(head.starts_with("GET / HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_fetch_test_centers_sends_date_zip_and_country() {
        let (base, server) = serve_once(
            "200 OK",
            r#"[{"name":"EAST HIGH","distance":2.5,"seatAvailability":1}]"#,
        )
        .await;

        let schools = client_for(&base)
            .fetch_test_centers("2024-03-09", "10001")
            .await
            .unwrap();
        assert_eq!(schools.len(), 1);
        assert_eq!(schools[0].seat_availability, Some(true));

        let head = server.await.unwrap();
        let request_line = head.lines().next().unwrap_or_default();
        assert_eq!(
            request_line,
            "GET /prod/test-centers?date=2024-03-09&zip=10001&country=US HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn test_server_error_maps_to_api_error() {
        let (base, server) = serve_once("500 Internal Server Error", "upstream down").await;

        let err = client_for(&base).fetch_sessions().await.unwrap_err();
        assert!(matches!(err, ApiError::ServerError(ref msg) if msg.contains("upstream down")));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_not_found_maps_to_status_error() {
        let (base, server) = serve_once("404 Not Found", "missing").await;

        let err = client_for(&base)
            .fetch_test_centers("2024-03-09", "10001")
            .await
            .unwrap_err();
        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
                assert_eq!(body, "missing");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_non_json_body_is_invalid_response() {
        let (base, server) = serve_once("200 OK", "not json").await;

        let err = client_for(&base).fetch_sessions().await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
        server.await.unwrap();
    }
}
