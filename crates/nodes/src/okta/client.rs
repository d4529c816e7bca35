//! Minimal Okta Users API client.
//!
//! Wraps the REST operations the node needs; connection pooling, TLS, and
//! timeouts stay inside reqwest.

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method, Response, Url};
use serde_json::{Map, Value};
use tracing::debug;

use host::NodeError;

const USERS_PATH: &str = "/api/v1/users";

pub struct OktaClient {
    http: Client,
    org_url: Url,
}

impl OktaClient {
    pub fn new(org_url: &str, token: &str) -> Result<Self, NodeError> {
        let org_url = Url::parse(org_url)
            .map_err(|error| NodeError::operation(format!("invalid Okta org URL: {error}")))?;

        let mut auth = HeaderValue::from_str(&format!("SSWS {token}"))
            .map_err(|_| NodeError::operation("okta API token contains invalid characters"))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()
            .map_err(|error| {
                NodeError::operation(format!("failed to build HTTP client: {error}"))
            })?;

        Ok(Self { http, org_url })
    }

    /// Build a client from the host's `oktaCredentialsApi` credential set.
    pub fn from_credentials(credentials: &Map<String, Value>) -> Result<Self, NodeError> {
        Self::new(
            credential_field(credentials, "orgUrl")?,
            credential_field(credentials, "token")?,
        )
    }

    pub async fn create_user(&self, profile: Value, activate: bool) -> Result<Value, NodeError> {
        let mut url = self.endpoint(USERS_PATH)?;
        url.query_pairs_mut()
            .append_pair("activate", if activate { "true" } else { "false" });
        let body = serde_json::json!({ "profile": profile });
        let response = self.send(Method::POST, url, Some(&body)).await?;
        response.json().await.map_err(request_error)
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Value, NodeError> {
        let url = self.user_endpoint(user_id, "")?;
        let response = self.send(Method::GET, url, None).await?;
        response.json().await.map_err(request_error)
    }

    pub async fn update_user(&self, user_id: &str, profile: Value) -> Result<Value, NodeError> {
        let url = self.user_endpoint(user_id, "")?;
        let body = serde_json::json!({ "profile": profile });
        let response = self.send(Method::POST, url, Some(&body)).await?;
        response.json().await.map_err(request_error)
    }

    /// Deactivation returns an empty body on success.
    pub async fn deactivate_user(&self, user_id: &str) -> Result<(), NodeError> {
        let url = self.user_endpoint(user_id, "/lifecycle/deactivate")?;
        self.send(Method::POST, url, None).await?;
        Ok(())
    }

    pub async fn list_users(&self, limit: u64) -> Result<Vec<Value>, NodeError> {
        self.collect_users(&[("limit", limit.to_string())]).await
    }

    pub async fn search_users(&self, search: &str, limit: u64) -> Result<Vec<Value>, NodeError> {
        self.collect_users(&[("search", search.to_string()), ("limit", limit.to_string())])
            .await
    }

    /// Follow `Link; rel="next"` headers until the collection is fully
    /// materialized.
    async fn collect_users(&self, query: &[(&str, String)]) -> Result<Vec<Value>, NodeError> {
        let mut url = self.endpoint(USERS_PATH)?;
        url.query_pairs_mut()
            .extend_pairs(query.iter().map(|(name, value)| (*name, value.as_str())));

        let mut users = Vec::new();
        let mut next = Some(url);
        while let Some(page_url) = next.take() {
            let response = self.send(Method::GET, page_url, None).await?;
            next = next_link(response.headers());
            let page: Vec<Value> = response.json().await.map_err(request_error)?;
            users.extend(page);
        }
        Ok(users)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<Response, NodeError> {
        debug!("okta {method} {}", url.path());
        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(request_error)?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(api_error(response).await)
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, NodeError> {
        self.org_url
            .join(path)
            .map_err(|error| NodeError::operation(format!("invalid Okta endpoint: {error}")))
    }

    fn user_endpoint(&self, user_id: &str, suffix: &str) -> Result<Url, NodeError> {
        self.endpoint(&format!("{USERS_PATH}/{user_id}{suffix}"))
    }
}

fn credential_field<'a>(
    credentials: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a str, NodeError> {
    credentials
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| NodeError::operation(format!("okta credentials are missing '{key}'")))
}

fn request_error(error: reqwest::Error) -> NodeError {
    NodeError::operation(format!("okta request failed: {error}"))
}

/// Map a non-2xx Okta response onto a contextual error carrying the API's
/// error code and causes.
async fn api_error(response: Response) -> NodeError {
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    let summary = body
        .get("errorSummary")
        .and_then(Value::as_str)
        .unwrap_or("okta request failed")
        .to_string();

    let mut context = Map::new();
    context.insert("status".to_string(), Value::from(status.as_u16()));
    if let Some(code) = body.get("errorCode") {
        context.insert("errorCode".to_string(), code.clone());
    }
    if let Some(causes) = body.get("errorCauses") {
        context.insert("errorCauses".to_string(), causes.clone());
    }
    NodeError::contextual(summary, context)
}

/// Parse the `rel="next"` target from an RFC 8288 Link header.
fn next_link(headers: &HeaderMap) -> Option<Url> {
    headers
        .get_all(header::LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .find_map(|link| {
            let (target, params) = link.split_once(';')?;
            if !params.contains("rel=\"next\"") {
                return None;
            }
            let target = target.trim().trim_start_matches('<').trim_end_matches('>');
            Url::parse(target).ok()
        })
}
