pub mod auth_service;
pub mod http;
pub mod interceptor;
pub mod project_store;

#[cfg(test)]
pub(crate) mod mock;

pub use auth_service::AuthService;
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
#[cfg(target_arch = "wasm32")]
pub use http::BrowserHttpClient;
pub use interceptor::AuthRetryClient;
pub use project_store::ProjectStore;
