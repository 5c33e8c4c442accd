// ============================================================================
// ROUTER GUARD - Auth antes de cada navegación
// ============================================================================

use std::rc::Rc;

use super::routes::{Location, RouteTable};
use crate::services::AuthService;
use crate::utils::{AUTH_SUCCESS_PATH, FORCE_AUTH_CHECK_PARAM, LOGIN_PATH};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    Allow,
    Redirect(String),
}

#[derive(Clone)]
pub struct RouterGuard {
    routes: Rc<RouteTable>,
    auth: AuthService,
}

impl RouterGuard {
    pub fn new(routes: Rc<RouteTable>, auth: AuthService) -> Self {
        Self { routes, auth }
    }

    /// `to` ya viene con las redirecciones estáticas resueltas
    pub async fn before_each(&self, to: &Location, from: &Location) -> NavigationDecision {
        log::debug!("🧭 [ROUTER] {} -> {}", from.path, to.path);

        if !self.routes.requires_auth(&to.path) {
            log::debug!("🧭 [ROUTER] Ruta pública, sin check");
            return NavigationDecision::Allow;
        }

        // Tras volver del login OAuth el caché no sirve
        let force_refresh = from.path == AUTH_SUCCESS_PATH
            || to.query_value(FORCE_AUTH_CHECK_PARAM) == Some("true");

        if self.auth.check(force_refresh).await {
            NavigationDecision::Allow
        } else if to.path != LOGIN_PATH {
            log::info!("🔒 [ROUTER] No autenticado, redirigiendo a {}", LOGIN_PATH);
            NavigationDecision::Redirect(LOGIN_PATH.to_string())
        } else {
            NavigationDecision::Allow
        }
    }
}
