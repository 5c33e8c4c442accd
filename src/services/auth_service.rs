// ============================================================================
// AUTH SERVICE - check / invalidate / logout sobre el AuthState compartido
// ============================================================================

use std::rc::Rc;

use serde_json::json;

use crate::config::AppConfig;
use crate::models::{AuthCheckResponse, LogoutResponse};
use crate::services::http::{HttpClient, HttpRequest};
use crate::state::{events, AuthState, EventBus};
use crate::utils::{Clock, AUTH_CHECK_PATH, AUTH_LOGOUT_PATH, STATUS_SUCCESS};

/// Servicio de autenticación. Normalmente recibe el cliente ya envuelto por el interceptor.
#[derive(Clone)]
pub struct AuthService {
    state: AuthState,
    client: Rc<dyn HttpClient>,
    clock: Rc<dyn Clock>,
    event_bus: Option<EventBus>,
    check_url: String,
    logout_url: String,
    check_timeout_ms: u32,
}

impl AuthService {
    pub fn new(
        config: &AppConfig,
        state: AuthState,
        client: Rc<dyn HttpClient>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        Self {
            state,
            client,
            clock,
            event_bus: None,
            check_url: config.endpoint(AUTH_CHECK_PATH),
            logout_url: config.endpoint(AUTH_LOGOUT_PATH),
            check_timeout_ms: config.auth.check_timeout_ms,
        }
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// ¿Sesión autenticada? Usa el caché mientras sea válido salvo `force_refresh`.
    ///
    /// Ante timeout o fallo de red con un valor previo se devuelve ese valor sin tocarlo,
    /// para no expulsar al usuario por un corte transitorio.
    pub async fn check(&self, force_refresh: bool) -> bool {
        let now = self.clock.now_ms();

        if !force_refresh {
            if let Some(cached) = self.state.fresh_value(now) {
                log::debug!("🔐 [AUTH] Usando estado cacheado: {}", cached);
                return cached;
            }
        }

        log::info!(
            "🔐 [AUTH] Consultando estado al servidor{}",
            if force_refresh { " (forzado)" } else { "" }
        );
        let request = HttpRequest::get(&self.check_url).with_timeout(self.check_timeout_ms);

        match self.client.send(&request).await {
            Ok(response) if response.is_success() => match response.json::<AuthCheckResponse>() {
                Ok(body) => {
                    log::info!("✅ [AUTH] Estado actualizado: {}", body.authenticated);
                    self.state.record(body.authenticated, now);
                    body.authenticated
                }
                Err(e) => {
                    log::error!("❌ [AUTH] Respuesta de check ilegible: {}", e);
                    self.state.record(false, now);
                    false
                }
            },
            Ok(response) if response.is_unauthorized() => {
                log::info!("🔒 [AUTH] 401 en check, hace falta login");
                self.state.record(false, now);
                false
            }
            Ok(response) => {
                log::warn!("⚠️ [AUTH] Check devolvió HTTP {}", response.status);
                self.state.record(false, now);
                false
            }
            Err(err) if err.is_transient() => match self.state.last_known() {
                Some(cached) => {
                    log::warn!("⚠️ [AUTH] {} - usando estado cacheado: {}", err, cached);
                    cached
                }
                None => {
                    log::warn!("⚠️ [AUTH] {} sin estado previo, se asume no autenticado", err);
                    self.state.record(false, now);
                    false
                }
            },
            Err(err) => {
                log::error!("❌ [AUTH] Check falló: {}", err);
                self.state.record(false, now);
                false
            }
        }
    }

    pub fn invalidate(&self) {
        log::debug!("🧹 [AUTH] Caché de auth invalidado");
        self.state.invalidate();
    }

    /// Cierra la sesión en el servidor. El caché se invalida aunque la llamada falle.
    /// Devuelve si el servidor confirmó el logout.
    pub async fn logout(&self) -> bool {
        let request = HttpRequest::post(&self.logout_url);
        let confirmed = match self.client.send(&request).await {
            Ok(response) if response.is_success() => response
                .json::<LogoutResponse>()
                .map(|body| body.status == STATUS_SUCCESS)
                .unwrap_or(false),
            Ok(response) => {
                log::warn!("⚠️ [AUTH] Logout devolvió HTTP {}", response.status);
                false
            }
            Err(err) => {
                log::error!("❌ [AUTH] Error en logout: {}", err);
                false
            }
        };

        self.invalidate();
        if let Some(bus) = &self.event_bus {
            bus.publish(events::AUTH_LOGOUT, &json!({ "confirmed": confirmed }));
        }
        log::info!("👋 [AUTH] Sesión cerrada (confirmada: {})", confirmed);
        confirmed
    }
}
