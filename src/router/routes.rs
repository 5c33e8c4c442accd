// ============================================================================
// ROUTES - Tabla estática de rutas + parsing de ubicaciones
// ============================================================================

use crate::utils::{AUTH_SUCCESS_PATH, LOGIN_PATH};

/// Vistas de la SPA (el render vive fuera de este crate)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Login,
    AuthSuccess,
    AccountInfo,
    ProjectInfo,
    FormsData,
    FormsTemplates,
    DataConnectorSync,
    ApprovalWorkflows,
    Reviews,
    SystemStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub view: View,
    pub requires_auth: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub from: &'static str,
    pub to: &'static str,
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
    redirects: Vec<Redirect>,
}

const fn route(path: &'static str, view: View, requires_auth: bool) -> Route {
    Route { path, view, requires_auth }
}

impl RouteTable {
    pub fn new(routes: Vec<Route>, redirects: Vec<Redirect>) -> Self {
        Self { routes, redirects }
    }

    /// Rutas de la aplicación
    pub fn standard() -> Self {
        Self::new(
            vec![
                route("/", View::Home, true),
                route(LOGIN_PATH, View::Login, false),
                route(AUTH_SUCCESS_PATH, View::AuthSuccess, false),
                route("/account-info", View::AccountInfo, true),
                route("/project-info", View::ProjectInfo, true),
                route("/forms/jarvis", View::FormsData, true),
                route("/forms/templates", View::FormsTemplates, true),
                route("/data-connector/sync", View::DataConnectorSync, true),
                route("/reviews/workflows", View::ApprovalWorkflows, true),
                route("/reviews/data", View::Reviews, true),
                route("/system/status", View::SystemStatus, true),
            ],
            vec![Redirect { from: "/api", to: "/" }],
        )
    }

    pub fn find(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.path == path)
    }

    /// Sigue las redirecciones estáticas (con límite por si hay ciclos)
    pub fn resolve(&self, path: &str) -> String {
        let mut current = path.to_string();
        for _ in 0..self.redirects.len() {
            match self.redirects.iter().find(|r| r.from == current) {
                Some(redirect) => current = redirect.to.to_string(),
                None => break,
            }
        }
        current
    }

    /// Rutas desconocidas también exigen auth
    pub fn requires_auth(&self, path: &str) -> bool {
        self.find(path).map(|r| r.requires_auth).unwrap_or(true)
    }

    pub fn view_for(&self, path: &str) -> Option<View> {
        self.find(path).map(|r| r.view)
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Destino u origen de una navegación: path + query
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Location {
    /// Acepta `"/path?k=v&flag"`; ignora el fragmento
    pub fn parse(url: &str) -> Self {
        let url = url.split('#').next().unwrap_or("");
        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path, query),
            None => (url, ""),
        };

        let query = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((k, v)) => (k.to_string(), v.to_string()),
                None => (pair.to_string(), String::new()),
            })
            .collect();

        let path = if path.is_empty() { "/" } else { path };
        Self { path: path.to_string(), query }
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn to_url(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query: Vec<String> = self
            .query
            .iter()
            .map(|(k, v)| if v.is_empty() { k.clone() } else { format!("{}={}", k, v) })
            .collect();
        format!("{}?{}", self.path, query.join("&"))
    }
}
