// Cliente HTTP con respuestas programadas por URL (solo tests)

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use serde_json::Value;

use super::http::{HttpClient, HttpRequest, HttpResponse};
use crate::error::HttpError;

#[derive(Default)]
pub struct MockHttpClient {
    scripted: RefCell<HashMap<String, VecDeque<Result<HttpResponse, HttpError>>>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encola una respuesta JSON para `url`; se consumen en orden
    pub fn mock_response(&self, url: &str, status: u16, body: Value) {
        self.push(url, Ok(HttpResponse::new(status, body.to_string())));
    }

    pub fn mock_error(&self, url: &str, error: HttpError) {
        self.push(url, Err(error));
    }

    fn push(&self, url: &str, result: Result<HttpResponse, HttpError>) {
        self.scripted
            .borrow_mut()
            .entry(url.to_string())
            .or_default()
            .push_back(result);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.requests.borrow().iter().filter(|r| r.url == url).count()
    }
}

#[async_trait::async_trait(?Send)]
impl HttpClient for MockHttpClient {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        self.requests.borrow_mut().push(request.clone());
        self.scripted
            .borrow_mut()
            .get_mut(&request.url)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(HttpError::Network(format!("sin mock para {}", request.url))))
    }
}
