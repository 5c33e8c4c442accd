// ============================================================================
// ERRORES - Tipos de error del núcleo (thiserror)
// ============================================================================

use thiserror::Error;

/// Fallos del almacenamiento clave/valor (localStorage o memoria)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("Storage no disponible")]
    Unavailable,

    #[error("Error de serialización: {0}")]
    Serialization(String),

    /// Cuota excedida u otro fallo del host al escribir
    #[error("Error escribiendo en storage: {0}")]
    Write(String),

    #[error("Error leyendo storage: {0}")]
    Read(String),
}

/// Fallos de transporte HTTP
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HttpError {
    #[error("Timeout tras {0} ms")]
    Timeout(u32),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request build error: {0}")]
    Build(String),

    /// El refresco de token falló después de un 401
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),
}

impl HttpError {
    /// Errores transitorios de red (no dicen nada sobre la sesión)
    pub fn is_transient(&self) -> bool {
        matches!(self, HttpError::Timeout(_) | HttpError::Network(_))
    }
}

/// Fallo al obtener la lista de proyectos del servidor
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// El payload llegó con `status != "success"`
    #[error("{0}")]
    Server(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Parse error: {0}")]
    Decode(String),

    #[error(transparent)]
    Transport(#[from] HttpError),
}
