use crate::config::HarnessConfig;
use crate::domain::model::{Attachment, ExchangeReport, ResponseSnapshot};
use crate::domain::ports::Reporter;
use crate::utils::error::{HarnessError, Result};
use crate::utils::validation::{parse_http_url, Validate};
use chrono::Utc;
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, Request};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

pub const DEFAULT_UPLOAD_FIELD: &str = "file";
const JSON: &str = "application/json";

enum Payload {
    Empty,
    Json(serde_json::Value),
    Multipart { form: Form, description: String },
}

struct Prepared {
    request: Request,
    body: Option<Attachment>,
}

/// HTTP client for the API under test.
///
/// Adds the bearer token to every request when one is set. Each exchange is
/// logged through tracing and, when one is installed, handed to a
/// [`Reporter`]. Failed calls are reported and then returned to the caller
/// as-is.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    reporter: Option<Arc<dyn Reporter>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::from_config(&HarnessConfig {
            base_url: base_url.into(),
            ..HarnessConfig::default()
        })
    }

    pub fn from_config(config: &HarnessConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = Client::builder().timeout(Duration::from_secs(config.timeout_seconds));
        if let Some(user_agent) = &config.user_agent {
            let mut headers = HeaderMap::new();
            headers.insert(
                USER_AGENT,
                user_agent.parse().map_err(|_| HarnessError::InvalidConfigValue {
                    field: "user_agent".to_string(),
                    value: user_agent.clone(),
                    reason: "not a valid header value".to_string(),
                })?,
            );
            builder = builder.default_headers(headers);
        }

        let mut client = Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: None,
            reporter: None,
        };
        if let Some(token) = &config.token {
            client.set_token(token.clone());
        }

        tracing::debug!("API client ready for {}", client.base_url);
        Ok(client)
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Replace the current token. An empty token disables the header.
    pub fn set_token(&mut self, token: impl Into<String>) {
        let token = token.into();
        self.token = if token.is_empty() { None } else { Some(token) };
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        self.execute(Method::GET, path, query, Payload::Empty).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = Payload::Json(serde_json::to_value(body)?);
        self.execute(Method::POST, path, &[], payload).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = Payload::Json(serde_json::to_value(body)?);
        self.execute(Method::PUT, path, &[], payload).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = Payload::Json(serde_json::to_value(body)?);
        self.execute(Method::PATCH, path, &[], payload).await
    }

    /// Issue a DELETE; whatever the server sends back is discarded.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.execute_with(Method::DELETE, path, &[], Payload::Empty, |_| Ok(()))
            .await
    }

    /// Upload a file as multipart form field `file`.
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        file_path: impl AsRef<Path>,
    ) -> Result<T> {
        self.upload_field(path, file_path, DEFAULT_UPLOAD_FIELD).await
    }

    pub async fn upload_field<T: DeserializeOwned>(
        &self,
        path: &str,
        file_path: impl AsRef<Path>,
        field_name: &str,
    ) -> Result<T> {
        let file_path = file_path.as_ref();
        let shown = file_path.display().to_string();

        match tokio::fs::try_exists(file_path).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::error!("File not found: {}", shown);
                return Err(HarnessError::FileNotFound { path: shown });
            }
            Err(e) => {
                tracing::error!("Cannot access {}: {}", shown, e);
                return Err(HarnessError::Io(e));
            }
        }

        let bytes = tokio::fs::read(file_path).await?;
        let file_name = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(field_name)
            .to_string();
        let description = format!(
            "multipart/form-data: {}={} ({} bytes)",
            field_name,
            file_name,
            bytes.len()
        );

        let form = Form::new().part(field_name.to_string(), Part::bytes(bytes).file_name(file_name));
        self.execute(Method::POST, path, &[], Payload::Multipart { form, description })
            .await
    }

    fn resolve_url(&self, path: &str) -> Result<Url> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return parse_http_url("url", path);
        }
        let joined = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        parse_http_url("url", &joined)
    }

    fn authorization(&self) -> Option<String> {
        self.token
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| format!("Bearer {}", t))
    }

    fn prepare(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        payload: Payload,
    ) -> Result<Prepared> {
        let url = self.resolve_url(path)?;
        let mut builder = self.client.request(method, url).header(ACCEPT, JSON);

        if let Some(value) = self.authorization() {
            builder = builder.header(AUTHORIZATION, value);
        }
        if !query.is_empty() {
            builder = builder.query(query);
        }

        let body = match payload {
            Payload::Empty => {
                builder = builder.header(CONTENT_TYPE, JSON);
                None
            }
            Payload::Json(value) => {
                let pretty = serde_json::to_string_pretty(&value)?;
                builder = builder.header(CONTENT_TYPE, JSON).json(&value);
                Some(Attachment::json("Request Body", pretty))
            }
            Payload::Multipart { form, description } => {
                builder = builder.multipart(form);
                Some(Attachment::text("Request Body", description))
            }
        };

        Ok(Prepared {
            request: builder.build()?,
            body,
        })
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        payload: Payload,
    ) -> Result<T> {
        self.execute_with(method, path, query, payload, decode_body::<T>)
            .await
    }

    async fn execute_with<T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        payload: Payload,
        decode: fn(&[u8]) -> serde_json::Result<T>,
    ) -> Result<T> {
        let prepared = self.prepare(method.clone(), path, query, payload).map_err(|e| {
            tracing::error!("Could not build {} {}: {}", method, path, e);
            e
        })?;

        let url = prepared.request.url().to_string();
        let mut attachments: Vec<Attachment> = prepared.body.into_iter().collect();
        attachments.push(Attachment::json(
            "Request Headers",
            headers_json(&header_map(prepared.request.headers())),
        ));

        tracing::debug!("Sending {} {}", method, url);
        let started_at = Utc::now();
        let start = Instant::now();
        let outcome = self.send(&method, &url, prepared.request, decode).await;
        let elapsed = start.elapsed();

        match &outcome {
            Ok((response, _)) => {
                attachments.push(Attachment::json("Response Body", pretty_body(&response.body)));
                attachments.push(Attachment::json("Response Headers", headers_json(&response.headers)));
            }
            Err(error) => {
                attachments.push(Attachment::text("Error Message", error.to_string()));
                if let Some(response) = error.response() {
                    attachments.push(Attachment::json(
                        "Error Response Body",
                        pretty_body(&response.body),
                    ));
                    attachments.push(Attachment::json(
                        "Error Response Headers",
                        headers_json(&response.headers),
                    ));
                }
            }
        }

        let exchange = ExchangeReport {
            title: format!("{} {} - {}ms", method, url, elapsed.as_millis()),
            started_at,
            failed: outcome.is_err(),
            attachments,
        };
        log_exchange(&exchange);
        if let Some(reporter) = &self.reporter {
            reporter.report(&exchange);
        }

        outcome.map(|(_, value)| value)
    }

    async fn send<T>(
        &self,
        method: &Method,
        url: &str,
        request: Request,
        decode: fn(&[u8]) -> serde_json::Result<T>,
    ) -> Result<(ResponseSnapshot, T)> {
        let response = self.client.execute(request).await?;
        let status = response.status();
        let headers = header_map(response.headers());
        let bytes = response.bytes().await?;

        let snapshot = ResponseSnapshot {
            status: status.as_u16(),
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        };

        if !status.is_success() {
            return Err(HarnessError::Status {
                method: method.to_string(),
                url: url.to_string(),
                response: Box::new(snapshot),
            });
        }

        match decode(&bytes) {
            Ok(value) => Ok((snapshot, value)),
            Err(source) => Err(HarnessError::Decode {
                url: url.to_string(),
                source,
                response: Box::new(snapshot),
            }),
        }
    }
}

/// Empty bodies decode as JSON `null`.
fn decode_body<T: DeserializeOwned>(bytes: &[u8]) -> serde_json::Result<T> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        serde_json::from_value(serde_json::Value::Null)
    } else {
        serde_json::from_slice(bytes)
    }
}

/// Repeated headers such as `set-cookie` are joined with `", "`.
fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = value.to_str().unwrap_or("<non-ascii>");
        map.entry(name.as_str().to_string())
            .and_modify(|joined| {
                joined.push_str(", ");
                joined.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    map
}

/// Title at info (error when the call failed), every attachment at debug.
fn log_exchange(exchange: &ExchangeReport) {
    if exchange.failed {
        tracing::error!("❌ {}", exchange.title);
    } else {
        tracing::info!("📡 {}", exchange.title);
    }

    for attachment in &exchange.attachments {
        tracing::debug!(
            attachment = %attachment.name,
            content_type = %attachment.content_type,
            "{}",
            attachment.content
        );
    }
}

fn headers_json(headers: &BTreeMap<String, String>) -> String {
    serde_json::to_string_pretty(headers).unwrap_or_else(|_| "{}".to_string())
}

fn pretty_body(raw: &str) -> String {
    serde_json::from_str::<serde_json::Value>(raw)
        .and_then(|v| serde_json::to_string_pretty(&v))
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new("http://localhost:8080/v2/").unwrap()
    }

    fn header<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
        request.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn no_authorization_without_token() {
        let prepared = client()
            .prepare(Method::GET, "/pet/1", &[], Payload::Empty)
            .unwrap();
        assert!(header(&prepared.request, "authorization").is_none());
        assert_eq!(header(&prepared.request, "content-type"), Some(JSON));
    }

    #[test]
    fn bearer_attached_when_token_set() {
        let mut client = client();
        client.set_token("abc123");
        let prepared = client
            .prepare(Method::GET, "/pet/1", &[], Payload::Empty)
            .unwrap();
        assert_eq!(header(&prepared.request, "authorization"), Some("Bearer abc123"));
    }

    #[test]
    fn token_overwritten_in_place() {
        let mut client = client();
        client.set_token("first");
        client.set_token("second");
        assert_eq!(client.token(), Some("second"));

        client.set_token("");
        assert!(client.token().is_none());

        client.set_token("third");
        client.clear_token();
        let prepared = client
            .prepare(Method::DELETE, "/pet/1", &[], Payload::Empty)
            .unwrap();
        assert!(header(&prepared.request, "authorization").is_none());
    }

    #[test]
    fn token_from_config() {
        let client = ApiClient::from_config(&HarnessConfig {
            token: Some("cfg-token".to_string()),
            ..HarnessConfig::default()
        })
        .unwrap();
        assert_eq!(client.authorization().as_deref(), Some("Bearer cfg-token"));
    }

    #[test]
    fn relative_paths_join_base_url() {
        let client = client();
        assert_eq!(
            client.resolve_url("/pet").unwrap().as_str(),
            "http://localhost:8080/v2/pet"
        );
        assert_eq!(
            client.resolve_url("user/login").unwrap().as_str(),
            "http://localhost:8080/v2/user/login"
        );
        assert_eq!(
            client.resolve_url("https://other.example/x").unwrap().as_str(),
            "https://other.example/x"
        );
    }

    #[test]
    fn json_payload_is_attached_pretty() {
        let payload = Payload::Json(serde_json::json!({"name": "Fluffy"}));
        let prepared = client()
            .prepare(Method::POST, "/pet", &[], payload)
            .unwrap();

        let body = prepared.body.unwrap();
        assert_eq!(body.name, "Request Body");
        assert_eq!(body.content, "{\n  \"name\": \"Fluffy\"\n}");
        assert_eq!(header(&prepared.request, "content-type"), Some(JSON));
    }

    #[test]
    fn query_parameters_are_encoded() {
        let prepared = client()
            .prepare(
                Method::GET,
                "/user/login",
                &[("username", "alice"), ("password", "p w")],
                Payload::Empty,
            )
            .unwrap();
        assert_eq!(
            prepared.request.url().query(),
            Some("username=alice&password=p+w")
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(HarnessError::InvalidConfigValue { .. })
        ));
    }

    #[test]
    fn empty_body_decodes_as_null() {
        decode_body::<()>(b"").unwrap();
        let missing: Option<serde_json::Value> = decode_body(b"  \n").unwrap();
        assert!(missing.is_none());
        assert!(decode_body::<crate::domain::model::Pet>(b"").is_err());
    }

    #[test]
    fn repeated_headers_are_joined() {
        let mut headers = HeaderMap::new();
        headers.append("set-cookie", "a=1".parse().unwrap());
        headers.append("set-cookie", "b=2".parse().unwrap());
        headers.insert(CONTENT_TYPE, JSON.parse().unwrap());

        let map = header_map(&headers);
        assert_eq!(map.get("set-cookie").map(String::as_str), Some("a=1, b=2"));
        assert_eq!(map.get("content-type").map(String::as_str), Some(JSON));
    }

    #[test]
    fn non_json_bodies_are_logged_verbatim() {
        assert_eq!(pretty_body("<html>"), "<html>");
        assert_eq!(pretty_body(r#"{"a":1}"#), "{\n  \"a\": 1\n}");
    }
}
