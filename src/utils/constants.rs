// Endpoints, claves de storage y rutas fijas

/// Endpoints del backend (relativos a `CONFIG.backend_url`)
pub const AUTH_CHECK_PATH: &str = "/api/auth/check";
pub const AUTH_REFRESH_PATH: &str = "/api/auth/refresh-token";
pub const AUTH_LOGOUT_PATH: &str = "/api/auth/logout";
pub const PROJECTS_PATH: &str = "/api/auth/projects";

/// Parámetro anti-caché de la lista de proyectos
pub const CACHE_BUST_PARAM: &str = "_t";

/// Claves de localStorage
pub const STORAGE_KEY_PROJECTS: &str = "acc_projects";
pub const STORAGE_KEY_SELECTED_PROJECT: &str = "acc_selected_project";

/// Rutas con tratamiento especial en el guard
pub const LOGIN_PATH: &str = "/login";
pub const AUTH_SUCCESS_PATH: &str = "/auth/success";
pub const FORCE_AUTH_CHECK_PARAM: &str = "forceAuthCheck";

pub const STATUS_SUCCESS: &str = "success";

pub const MS_PER_HOUR: i64 = 60 * 60 * 1000;
