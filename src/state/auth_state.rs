// ============================================================================
// AUTH STATE - Caché en memoria del estado de autenticación
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Último resultado conocido de `/api/auth/check`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuthCacheEntry {
    pub is_authenticated: Option<bool>,
    pub last_check_ms: i64,
    pub cache_timeout: Duration,
}

impl AuthCacheEntry {
    pub fn new(cache_timeout: Duration) -> Self {
        Self {
            is_authenticated: None,
            last_check_ms: 0,
            cache_timeout,
        }
    }

    /// Valor cacheado si sigue dentro de la ventana
    pub fn fresh_value(&self, now_ms: i64) -> Option<bool> {
        let value = self.is_authenticated?;
        let age_ms = now_ms.saturating_sub(self.last_check_ms);
        if age_ms < self.cache_timeout.as_millis() as i64 {
            Some(value)
        } else {
            None
        }
    }
}

/// Estado de autenticación compartido (guard, servicio de auth e interceptor).
/// Clonar comparte la misma entrada.
#[derive(Clone)]
pub struct AuthState {
    entry: Rc<RefCell<AuthCacheEntry>>,
}

impl AuthState {
    pub fn new(cache_timeout: Duration) -> Self {
        Self {
            entry: Rc::new(RefCell::new(AuthCacheEntry::new(cache_timeout))),
        }
    }

    pub fn snapshot(&self) -> AuthCacheEntry {
        *self.entry.borrow()
    }

    pub fn fresh_value(&self, now_ms: i64) -> Option<bool> {
        self.entry.borrow().fresh_value(now_ms)
    }

    /// Valor cacheado aunque esté caducado
    pub fn last_known(&self) -> Option<bool> {
        self.entry.borrow().is_authenticated
    }

    pub fn record(&self, authenticated: bool, now_ms: i64) {
        let mut entry = self.entry.borrow_mut();
        entry.is_authenticated = Some(authenticated);
        entry.last_check_ms = now_ms;
    }

    /// Logout, fallo de refresh o refresh correcto: obliga a consultar al servidor
    pub fn invalidate(&self) {
        let mut entry = self.entry.borrow_mut();
        entry.is_authenticated = None;
        entry.last_check_ms = 0;
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::new(Duration::from_millis(
            crate::config::AuthConfig::default().cache_timeout_ms as u64,
        ))
    }
}
