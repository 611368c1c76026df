use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use roster_api::envelope::{Envelope, HealthReport};
use roster_api::record::{NewStudent, Student};

use crate::error::ClientError;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the `/api` surface. One shared timeout applies to every
/// request.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport(format!("HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<HealthReport, ClientError> {
        self.send(Method::GET, "/health", None::<&()>).await
    }

    pub async fn list_students(&self) -> Result<Envelope<Vec<Student>>, ClientError> {
        self.send(Method::GET, "/students", None::<&()>).await
    }

    pub async fn create_student(&self, student: &NewStudent) -> Result<Envelope<Student>, ClientError> {
        self.send(Method::POST, "/students", Some(student)).await
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%method, %url, "api request");

        let mut req: RequestBuilder = self.http.request(method.clone(), &url);
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|e| self.transport_error(e))?;
        let status = resp.status();
        tracing::debug!(%method, %url, status = status.as_u16(), "api response");

        if !status.is_success() {
            // Error bodies are envelopes; keep whatever message they carry.
            let message = resp
                .json::<Envelope<Value>>()
                .await
                .ok()
                .and_then(|env| env.message);
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        resp.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(e)
            } else {
                ClientError::Decode(e.to_string())
            }
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::Timeout(self.timeout.as_millis() as u64)
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}
