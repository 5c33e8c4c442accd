use serde::{Deserialize, Serialize};

/// Respuesta de `GET /api/auth/check`
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct AuthCheckResponse {
    pub authenticated: bool,
    #[serde(default)]
    pub has_token: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub expires_in_minutes: Option<i64>,
}

/// Respuesta de `POST /api/auth/refresh-token`
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct RefreshTokenResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub requires_reauth: Option<bool>,
    #[serde(default)]
    pub token_info: Option<TokenInfo>,
}

impl RefreshTokenResponse {
    pub fn is_success(&self) -> bool {
        self.status == crate::utils::STATUS_SUCCESS
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct TokenInfo {
    #[serde(default)]
    pub has_access_token: bool,
    #[serde(default)]
    pub has_refresh_token: bool,
    #[serde(default)]
    pub is_valid: bool,
    #[serde(default)]
    pub expires_in_minutes: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<String>,
}

/// Respuesta de `POST /api/auth/logout`
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct LogoutResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}
