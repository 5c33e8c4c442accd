// ============================================================================
// APP - Contexto de la aplicación (inyección de dependencias, sin globales)
// ============================================================================
// Construye una sola vez: storage, reloj, cliente HTTP con interceptor,
// servicio de auth, caché de proyectos, bus de eventos y router.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use serde_json::json;

use crate::config::AppConfig;
use crate::router::{Location, NavigationDecision, Navigator, RouteTable, RouterGuard};
use crate::services::{AuthRetryClient, AuthService, HttpClient, ProjectStore};
use crate::state::{events, AuthState, EventBus};
use crate::utils::{Clock, StorageBackend, LOGIN_PATH};

/// Piezas que dependen del entorno (navegador o tests)
pub struct AppContext {
    pub config: AppConfig,
    pub storage: Rc<dyn StorageBackend>,
    /// Transporte sin interceptar
    pub transport: Rc<dyn HttpClient>,
    pub clock: Rc<dyn Clock>,
    pub navigator: Rc<dyn Navigator>,
}

/// Aplicación principal
pub struct App {
    routes: Rc<RouteTable>,
    guard: RouterGuard,
    auth: AuthService,
    projects: ProjectStore,
    event_bus: EventBus,
    http: Rc<dyn HttpClient>,
    navigator: Rc<dyn Navigator>,
    current: RefCell<Location>,
}

impl App {
    /// Crear nueva aplicación
    pub fn new(context: AppContext) -> Self {
        let AppContext { config, storage, transport, clock, navigator } = context;

        let event_bus = EventBus::new();
        let auth_state = AuthState::new(Duration::from_millis(config.auth.cache_timeout_ms as u64));

        // Todo el tráfico pasa por el interceptor
        let http: Rc<dyn HttpClient> = Rc::new(
            AuthRetryClient::new(&config, transport, auth_state.clone(), navigator.clone())
                .with_event_bus(event_bus.clone()),
        );

        let auth = AuthService::new(&config, auth_state, http.clone(), clock.clone())
            .with_event_bus(event_bus.clone());
        let projects = ProjectStore::new(&config, storage, http.clone(), clock)
            .with_event_bus(event_bus.clone());

        let routes = Rc::new(RouteTable::standard());
        let guard = RouterGuard::new(routes.clone(), auth.clone());
        let current = RefCell::new(Location::parse(&navigator.current_path()));

        log::info!("🚀 [APP] Contexto inicializado ({})", config.environment);

        Self {
            routes,
            guard,
            auth,
            projects,
            event_bus,
            http,
            navigator,
            current,
        }
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn projects(&self) -> &ProjectStore {
        &self.projects
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Cliente HTTP para las vistas (ya interceptado)
    pub fn http(&self) -> Rc<dyn HttpClient> {
        self.http.clone()
    }

    pub fn current_location(&self) -> Location {
        self.current.borrow().clone()
    }

    /// Navegación programática (pushState)
    pub async fn navigate(&self, url: &str) -> NavigationDecision {
        self.run_navigation(url, false).await
    }

    /// Ubicación que el navegador ya muestra (carga inicial, back/forward)
    pub async fn enter(&self, url: &str) -> NavigationDecision {
        self.run_navigation(url, true).await
    }

    async fn run_navigation(&self, url: &str, already_displayed: bool) -> NavigationDecision {
        let from = self.current_location();
        let mut to = self.resolve(url);
        let mut decision = self.guard.before_each(&to, &from).await;

        // El destino de una redirección pasa también por el guard (login es público)
        if let NavigationDecision::Redirect(target) = &decision {
            to = self.resolve(target);
            if let NavigationDecision::Redirect(next) = self.guard.before_each(&to, &from).await {
                log::error!("❌ [ROUTER] Redirección encadenada a {}, se aborta", next);
                return decision;
            }
        }

        let target_url = to.to_url();
        let redirected = matches!(decision, NavigationDecision::Redirect(_));
        if already_displayed || (redirected && from.path == to.path) {
            self.navigator.replace(&target_url);
        } else {
            self.navigator.push(&target_url);
        }

        self.event_bus.publish(
            events::ROUTE_CHANGED,
            &json!({
                "path": to.path,
                "view": self.routes.view_for(&to.path).map(|v| format!("{:?}", v)),
            }),
        );
        *self.current.borrow_mut() = to;

        if redirected {
            decision = NavigationDecision::Redirect(target_url);
        }
        decision
    }

    fn resolve(&self, url: &str) -> Location {
        let mut location = Location::parse(url);
        location.path = self.routes.resolve(&location.path);
        location
    }

    /// Logout completo: servidor, caché de proyectos y vuelta al login
    pub async fn logout(&self) -> bool {
        let confirmed = self.auth.logout().await;
        self.projects.clear_all();
        self.navigate(LOGIN_PATH).await;
        confirmed
    }
}

// ============================================================================
// NAVEGADOR
// ============================================================================

#[cfg(target_arch = "wasm32")]
pub fn browser_context() -> AppContext {
    use crate::config::CONFIG;
    use crate::router::BrowserNavigator;
    use crate::services::BrowserHttpClient;
    use crate::utils::{LocalStorage, MemoryStorage, SystemClock};

    let storage: Rc<dyn StorageBackend> = match LocalStorage::open() {
        Some(storage) => Rc::new(storage),
        None => {
            log::warn!("⚠️ [APP] localStorage no disponible, usando memoria");
            Rc::new(MemoryStorage::new())
        }
    };

    AppContext {
        config: CONFIG.clone(),
        storage,
        transport: Rc::new(BrowserHttpClient::new(CONFIG.network.request_timeout_ms)),
        clock: Rc::new(SystemClock),
        navigator: Rc::new(BrowserNavigator),
    }
}
