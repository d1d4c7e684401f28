use crate::api::models::{LoginRequest, LoginResponse, SessionInfo};
use crate::core::session::SessionStore;
use crate::error::ApiError;
use crate::query::QueryParams;
use crate::utils::error_helpers::{convert_json_error, convert_request_error, status_to_api_error};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("chms-cli/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct ChmsClient {
    client: Client,
    pub base_url: String,
    timeout_secs: u64,
    session: SessionStore,
}

impl ChmsClient {
    // Create baseClient with default settings
    pub fn new(base_url: String, session: SessionStore) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, session, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(
        base_url: String,
        session: SessionStore,
        timeout_secs: u64,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| convert_request_error(e, "client_init", timeout_secs))?;

        Ok(ChmsClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
            session,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Request with the current session token attached as a bearer credential
    pub fn build_request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, url);

        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }

        request
    }

    pub fn build_query_request(
        &self,
        method: Method,
        path: &str,
        params: &QueryParams,
    ) -> RequestBuilder {
        let request = self.build_request(method, path);
        if params.is_empty() {
            request
        } else {
            request.query(params)
        }
    }

    async fn send(
        &self,
        request: RequestBuilder,
        endpoint: &str,
        expected: StatusCode,
    ) -> Result<reqwest::Response, ApiError> {
        log::debug!("Sending request to {}", endpoint);
        let response = request
            .send()
            .await
            .map_err(|e| convert_request_error(e, endpoint, self.timeout_secs))?;

        let status = response.status();
        if status == expected {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        log::debug!("{} answered {} (expected {})", endpoint, status, expected);

        Err(status_to_api_error(
            status.as_u16(),
            expected.as_u16(),
            endpoint,
            error_text,
        ))
    }

    /// Send the request and decode the body, failing unless the response
    /// status is exactly `expected`
    pub async fn execute<T>(
        &self,
        request: RequestBuilder,
        endpoint: &str,
        expected: StatusCode,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = self.send(request, endpoint, expected).await?;
        let status = response.status().as_u16();
        response
            .json::<T>()
            .await
            .map_err(|e| convert_json_error(e, status, endpoint))
    }

    /// Like `execute`, for responses without a body
    pub async fn execute_empty(
        &self,
        request: RequestBuilder,
        endpoint: &str,
        expected: StatusCode,
    ) -> Result<(), ApiError> {
        self.send(request, endpoint, expected).await.map(|_| ())
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let endpoint = "/auth/login";
        let request = self.build_request(Method::POST, endpoint).json(&LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        });
        self.execute(request, endpoint, StatusCode::OK).await
    }

    pub async fn current_session(&self) -> Result<SessionInfo, ApiError> {
        let endpoint = "/auth/me";
        let request = self.build_request(Method::GET, endpoint);
        self.execute(request, endpoint, StatusCode::OK).await
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        let endpoint = "/auth/logout";
        let request = self.build_request(Method::POST, endpoint);
        self.execute_empty(request, endpoint, StatusCode::NO_CONTENT)
            .await
    }
}
