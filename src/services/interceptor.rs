// ============================================================================
// INTERCEPTOR - Refresco de token y reintento único ante 401
// ============================================================================
// Decorador sobre cualquier HttpClient. El presupuesto de reintento vive en
// la propia llamada a `send`, no en la petición: como mucho un reintento por
// petición original, y la petición de refresco nunca se intercepta.
// ============================================================================

use std::rc::Rc;

use serde_json::json;

use crate::config::AppConfig;
use crate::error::HttpError;
use crate::models::RefreshTokenResponse;
use crate::router::Navigator;
use crate::services::http::{HttpClient, HttpRequest, HttpResponse};
use crate::state::{events, AuthState, EventBus};
use crate::utils::{AUTH_REFRESH_PATH, LOGIN_PATH};

pub struct AuthRetryClient<C: HttpClient> {
    inner: C,
    auth_state: AuthState,
    navigator: Rc<dyn Navigator>,
    event_bus: Option<EventBus>,
    refresh_url: String,
    refresh_timeout_ms: u32,
}

impl<C: HttpClient> AuthRetryClient<C> {
    pub fn new(
        config: &AppConfig,
        inner: C,
        auth_state: AuthState,
        navigator: Rc<dyn Navigator>,
    ) -> Self {
        Self {
            inner,
            auth_state,
            navigator,
            event_bus: None,
            refresh_url: config.endpoint(AUTH_REFRESH_PATH),
            refresh_timeout_ms: config.network.request_timeout_ms,
        }
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// `Ok` si el servidor confirmó el refresco; si no, motivo del fallo
    async fn request_refresh(&self) -> Result<(), String> {
        let request = HttpRequest::post(&self.refresh_url).with_timeout(self.refresh_timeout_ms);
        let response = self.inner.send(&request).await.map_err(|e| e.to_string())?;
        let body = response.json::<RefreshTokenResponse>();

        if !response.is_success() {
            let code = body
                .ok()
                .and_then(|b| b.error_code.or(b.message))
                .unwrap_or_default();
            return Err(format!("HTTP {} {}", response.status, code).trim_end().to_string());
        }

        match body {
            Ok(body) if body.is_success() => Ok(()),
            Ok(body) => Err(body
                .message
                .or(body.error_code)
                .unwrap_or_else(|| format!("status {}", body.status))),
            Err(e) => Err(format!("Parse error: {}", e)),
        }
    }

    /// Refresca la sesión. En cualquier caso el caché de auth queda invalidado.
    async fn refresh_session(&self) -> Result<(), HttpError> {
        let outcome = self.request_refresh().await;
        self.auth_state.invalidate();

        match outcome {
            Ok(()) => {
                log::info!("✅ [INTERCEPTOR] Token refrescado, reintentando petición...");
                Ok(())
            }
            Err(reason) => {
                log::warn!("❌ [INTERCEPTOR] Refresco de token fallido: {}", reason);
                if self.navigator.current_path() != LOGIN_PATH {
                    log::info!("🔒 [INTERCEPTOR] Redirigiendo a {}", LOGIN_PATH);
                    self.navigator.redirect(LOGIN_PATH);
                }
                if let Some(bus) = &self.event_bus {
                    bus.publish(events::AUTH_EXPIRED, &json!({ "reason": reason }));
                }
                Err(HttpError::RefreshFailed(reason))
            }
        }
    }
}

#[async_trait::async_trait(?Send)]
impl<C: HttpClient> HttpClient for AuthRetryClient<C> {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let response = self.inner.send(request).await?;
        if !response.is_unauthorized() || request.url == self.refresh_url {
            return Ok(response);
        }

        log::info!("🔄 [INTERCEPTOR] 401 en {}, intentando refrescar token...", request.url);
        self.refresh_session().await?;

        // Un segundo 401 se devuelve tal cual
        self.inner.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::MemoryNavigator;
    use crate::services::mock::MockHttpClient;
    use std::cell::Cell;
    use std::time::Duration;

    const FORMS: &str = "/api/forms/list";
    const REFRESH: &str = "/api/auth/refresh-token";

    struct Fixture {
        client: AuthRetryClient<Rc<MockHttpClient>>,
        mock: Rc<MockHttpClient>,
        navigator: Rc<MemoryNavigator>,
        state: AuthState,
    }

    fn fixture(current_url: &str) -> Fixture {
        let mock = Rc::new(MockHttpClient::new());
        let navigator = Rc::new(MemoryNavigator::new(current_url));
        let state = AuthState::new(Duration::from_secs(30));
        state.record(true, 1_000);
        let client = AuthRetryClient::new(
            &AppConfig::default(),
            mock.clone(),
            state.clone(),
            navigator.clone(),
        );
        Fixture { client, mock, navigator, state }
    }

    #[tokio::test]
    async fn non_401_responses_pass_through() {
        let f = fixture("/");
        f.mock.mock_response(FORMS, 500, json!({ "error": "boom" }));

        let response = f.client.send(&HttpRequest::get(FORMS)).await.unwrap();
        assert_eq!(response.status, 500);
        assert_eq!(f.mock.calls_to(REFRESH), 0);
        assert_eq!(f.state.last_known(), Some(true));
    }

    #[tokio::test]
    async fn transport_errors_pass_through() {
        let f = fixture("/");
        f.mock.mock_error(FORMS, HttpError::Timeout(10_000));

        let err = f.client.send(&HttpRequest::get(FORMS)).await.unwrap_err();
        assert_eq!(err, HttpError::Timeout(10_000));
        assert_eq!(f.mock.calls_to(REFRESH), 0);
    }

    #[tokio::test]
    async fn refresh_success_retries_exactly_once() {
        let f = fixture("/forms/jarvis");
        f.mock.mock_response(FORMS, 401, json!({ "error": "expired" }));
        f.mock.mock_response(REFRESH, 200, json!({ "status": "success" }));
        f.mock.mock_response(FORMS, 200, json!({ "forms": [] }));

        let response = f.client.send(&HttpRequest::get(FORMS)).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(f.mock.calls_to(FORMS), 2);
        assert_eq!(f.mock.calls_to(REFRESH), 1);
        assert_eq!(f.state.last_known(), None);
        assert!(f.navigator.history().is_empty());
    }

    #[tokio::test]
    async fn second_401_is_returned_without_another_refresh() {
        let f = fixture("/");
        f.mock.mock_response(FORMS, 401, json!({}));
        f.mock.mock_response(REFRESH, 200, json!({ "status": "success" }));
        f.mock.mock_response(FORMS, 401, json!({}));

        let response = f.client.send(&HttpRequest::get(FORMS)).await.unwrap();
        assert_eq!(response.status, 401);
        assert_eq!(f.mock.calls_to(REFRESH), 1);
        assert_eq!(f.mock.calls_to(FORMS), 2);
    }

    #[tokio::test]
    async fn refresh_failure_redirects_and_propagates() {
        let f = fixture("/reviews/data");
        let bus = EventBus::new();
        let client = AuthRetryClient::new(
            &AppConfig::default(),
            f.mock.clone(),
            f.state.clone(),
            f.navigator.clone(),
        )
        .with_event_bus(bus.clone());
        let expired = Rc::new(Cell::new(false));
        let e = expired.clone();
        bus.subscribe(events::AUTH_EXPIRED, move |_| {
            e.set(true);
            Ok(())
        });

        f.mock.mock_response(FORMS, 401, json!({}));
        f.mock.mock_response(
            REFRESH,
            401,
            json!({ "status": "error", "error_code": "refresh_token_expired", "requires_reauth": true }),
        );

        let err = client.send(&HttpRequest::get(FORMS)).await.unwrap_err();
        assert_eq!(err, HttpError::RefreshFailed("HTTP 401 refresh_token_expired".into()));
        assert_eq!(f.state.last_known(), None);
        assert_eq!(f.navigator.current_path(), "/login");
        assert_eq!(f.navigator.redirects(), 1);
        assert_eq!(f.mock.calls_to(FORMS), 1);
        assert!(expired.get());
    }

    #[tokio::test]
    async fn refresh_failure_on_login_page_does_not_redirect() {
        let f = fixture("/login");
        f.mock.mock_response(FORMS, 401, json!({}));
        f.mock.mock_error(REFRESH, HttpError::Network("offline".into()));

        let err = f.client.send(&HttpRequest::get(FORMS)).await.unwrap_err();
        assert!(matches!(err, HttpError::RefreshFailed(_)));
        assert_eq!(f.navigator.redirects(), 0);
    }

    #[tokio::test]
    async fn rejected_refresh_payload_counts_as_failure() {
        let f = fixture("/");
        f.mock.mock_response(FORMS, 401, json!({}));
        f.mock.mock_response(REFRESH, 200, json!({ "status": "error", "message": "no refresh token" }));

        let err = f.client.send(&HttpRequest::get(FORMS)).await.unwrap_err();
        assert_eq!(err, HttpError::RefreshFailed("no refresh token".into()));
        assert_eq!(f.navigator.redirects(), 1);
    }

    #[tokio::test]
    async fn refresh_endpoint_itself_is_not_intercepted() {
        let f = fixture("/");
        f.mock.mock_response(REFRESH, 401, json!({ "status": "error" }));

        let response = f.client.send(&HttpRequest::post(REFRESH)).await.unwrap();
        assert_eq!(response.status, 401);
        assert_eq!(f.mock.calls_to(REFRESH), 1);
    }
}
