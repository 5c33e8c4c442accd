// ============================================================================
// HTTP - Abstracción de transporte (fetch en navegador, mocks en tests)
// ============================================================================

use std::rc::Rc;

use serde::de::DeserializeOwned;

use crate::error::HttpError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// Petición HTTP genérica; se puede reenviar tal cual (el interceptor la reintenta)
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<String>,
    /// `None` = timeout por defecto del cliente
    pub timeout_ms: Option<u32>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
            timeout_ms: None,
        }
    }

    pub fn get(url: &str) -> Self {
        Self::new(url, HttpMethod::Get)
    }

    pub fn post(url: &str) -> Self {
        Self::new(url, HttpMethod::Post)
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Cliente HTTP. `?Send` porque en wasm los futures de fetch no son Send.
/// Cualquier status (incluido 401) llega como `Ok`; `Err` es solo transporte.
#[async_trait::async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError>;
}

#[async_trait::async_trait(?Send)]
impl<T: HttpClient + ?Sized> HttpClient for Rc<T> {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        (**self).send(request).await
    }
}

// ============================================================================
// FETCH - navegador (gloo-net), cookies incluidas
// ============================================================================

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserHttpClient;

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
    use crate::error::HttpError;
    use futures::future::{select, Either};
    use gloo_net::http::Request;
    use gloo_timers::future::TimeoutFuture;
    use web_sys::RequestCredentials;

    #[derive(Clone)]
    pub struct BrowserHttpClient {
        default_timeout_ms: u32,
    }

    impl BrowserHttpClient {
        pub fn new(default_timeout_ms: u32) -> Self {
            Self { default_timeout_ms }
        }
    }

    #[async_trait::async_trait(?Send)]
    impl HttpClient for BrowserHttpClient {
        async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
            let mut builder = match request.method {
                HttpMethod::Get => Request::get(&request.url),
                HttpMethod::Post => Request::post(&request.url),
                HttpMethod::Put => Request::put(&request.url),
                HttpMethod::Delete => Request::delete(&request.url),
            }
            .credentials(RequestCredentials::Include);

            if !request.query.is_empty() {
                builder = builder.query(request.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
            }
            for (key, value) in &request.headers {
                builder = builder.header(key, value);
            }

            let built = match &request.body {
                Some(body) => builder
                    .header("Content-Type", "application/json")
                    .body(body.clone()),
                None => builder.build(),
            }
            .map_err(|e| HttpError::Build(e.to_string()))?;

            let timeout_ms = request.timeout_ms.unwrap_or(self.default_timeout_ms);
            let fetch = Box::pin(async move {
                let response = built.send().await?;
                let status = response.status();
                let body = response.text().await?;
                Ok::<_, gloo_net::Error>(HttpResponse { status, body })
            });
            let timer = Box::pin(TimeoutFuture::new(timeout_ms));

            // El fetch perdedor no se aborta: solo se ignora su resultado
            match select(fetch, timer).await {
                Either::Left((result, _)) => result.map_err(|e| HttpError::Network(e.to_string())),
                Either::Right(_) => {
                    log::warn!("⏱️ [HTTP] Timeout ({} ms): {}", timeout_ms, request.url);
                    Err(HttpError::Timeout(timeout_ms))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_builder_collects_parts() {
        let request = HttpRequest::post("/api/auth/logout")
            .with_header("X-Requested-With", "XMLHttpRequest")
            .with_query("_t", "42")
            .with_body(json!({ "reason": "user" }))
            .with_timeout(8000);

        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.query, vec![("_t".to_string(), "42".to_string())]);
        assert_eq!(request.body.as_deref(), Some(r#"{"reason":"user"}"#));
        assert_eq!(request.timeout_ms, Some(8000));
    }

    #[test]
    fn response_status_helpers() {
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(401, "").is_success());
        assert!(HttpResponse::new(401, "").is_unauthorized());

        let response = HttpResponse::new(200, r#"{"authenticated":true}"#);
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["authenticated"], json!(true));
    }
}
