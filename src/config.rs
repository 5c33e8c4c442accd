use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Vacío = mismo origen que la SPA
    pub backend_url: String,
    pub environment: String,
    pub enable_logging: bool,
    pub log_level: String,
    pub auth: AuthConfig,
    pub cache: CacheConfig,
    pub network: NetworkConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: String::new(),
            environment: "development".to_string(),
            enable_logging: true,
            log_level: "info".to_string(),
            auth: AuthConfig::default(),
            cache: CacheConfig::default(),
            network: NetworkConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Ventana durante la cual se confía en el estado de auth cacheado
    pub cache_timeout_ms: u32,
    pub check_timeout_ms: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cache_timeout_ms: 30_000,
            check_timeout_ms: 8_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub project_ttl_hours: i64,
    pub selected_project_ttl_hours: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            project_ttl_hours: 24,
            selected_project_ttl_hours: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub projects_timeout_ms: u32,
    pub request_timeout_ms: u32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            projects_timeout_ms: 30_000,
            request_timeout_ms: 10_000,
        }
    }
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno en tiempo de compilación
    pub fn from_env() -> Self {
        Self {
            backend_url: option_env!("BACKEND_URL").unwrap_or("").to_string(),
            environment: option_env!("ENVIRONMENT")
                .unwrap_or("development").to_string(),
            enable_logging: option_env!("ENABLE_LOGGING")
                .unwrap_or("true").parse().unwrap_or(true),
            log_level: option_env!("LOG_LEVEL").unwrap_or("info").to_string(),
            auth: AuthConfig {
                cache_timeout_ms: option_env!("AUTH_CACHE_TIMEOUT_MS")
                    .unwrap_or("30000").parse().unwrap_or(30_000),
                check_timeout_ms: option_env!("AUTH_CHECK_TIMEOUT_MS")
                    .unwrap_or("8000").parse().unwrap_or(8_000),
            },
            cache: CacheConfig {
                project_ttl_hours: option_env!("PROJECT_CACHE_TTL_HOURS")
                    .unwrap_or("24").parse().unwrap_or(24),
                selected_project_ttl_hours: option_env!("SELECTED_PROJECT_TTL_HOURS")
                    .unwrap_or("2").parse().unwrap_or(2),
            },
            network: NetworkConfig {
                projects_timeout_ms: option_env!("PROJECTS_TIMEOUT_MS")
                    .unwrap_or("30000").parse().unwrap_or(30_000),
                request_timeout_ms: option_env!("REQUEST_TIMEOUT_MS")
                    .unwrap_or("10000").parse().unwrap_or(10_000),
            },
        }
    }

    /// URL absoluta (o relativa al origen) de un endpoint
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.backend_url.trim_end_matches('/'), path)
    }

    /// Nivel de log efectivo; `Off` si el logging está deshabilitado
    pub fn log_level(&self) -> log::Level {
        match self.log_level.to_ascii_lowercase().as_str() {
            "error" => log::Level::Error,
            "warn" => log::Level::Warn,
            "debug" => log::Level::Debug,
            "trace" => log::Level::Trace,
            _ => log::Level::Info,
        }
    }

    pub fn is_logging_enabled(&self) -> bool {
        self.enable_logging
    }
}

// Configuración global estática
lazy_static::lazy_static! {
    pub static ref CONFIG: AppConfig = AppConfig::from_env();
}
