// ============================================================================
// NAVIGATOR - Acceso a la barra de direcciones (History API / memoria)
// ============================================================================

use std::cell::RefCell;

pub trait Navigator {
    /// Path actual sin query
    fn current_path(&self) -> String;
    /// Navegación SPA (history.pushState)
    fn push(&self, url: &str);
    /// Sustituye la entrada actual (history.replaceState)
    fn replace(&self, url: &str);
    /// Recarga completa de la aplicación en `url`
    fn redirect(&self, url: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationRecord {
    Push(String),
    Replace(String),
    Redirect(String),
}

/// Navegador en memoria: fuera del navegador y en tests
#[derive(Debug, Default)]
pub struct MemoryNavigator {
    current: RefCell<String>,
    history: RefCell<Vec<NavigationRecord>>,
}

impl MemoryNavigator {
    pub fn new(initial_url: &str) -> Self {
        Self {
            current: RefCell::new(initial_url.to_string()),
            history: RefCell::new(Vec::new()),
        }
    }

    pub fn current_url(&self) -> String {
        self.current.borrow().clone()
    }

    pub fn history(&self) -> Vec<NavigationRecord> {
        self.history.borrow().clone()
    }

    pub fn redirects(&self) -> usize {
        self.history
            .borrow()
            .iter()
            .filter(|r| matches!(r, NavigationRecord::Redirect(_)))
            .count()
    }

    fn record(&self, url: &str, record: NavigationRecord) {
        *self.current.borrow_mut() = url.to_string();
        self.history.borrow_mut().push(record);
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        let current = self.current.borrow();
        current.split(['?', '#']).next().unwrap_or("/").to_string()
    }

    fn push(&self, url: &str) {
        self.record(url, NavigationRecord::Push(url.to_string()));
    }

    fn replace(&self, url: &str) {
        self.record(url, NavigationRecord::Replace(url.to_string()));
    }

    fn redirect(&self, url: &str) {
        self.record(url, NavigationRecord::Redirect(url.to_string()));
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserNavigator;

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::Navigator;
    use wasm_bindgen::JsValue;
    use web_sys::window;

    #[derive(Debug, Default, Clone, Copy)]
    pub struct BrowserNavigator;

    impl BrowserNavigator {
        /// pathname + search de la ventana actual
        pub fn current_url() -> String {
            window()
                .map(|w| w.location())
                .map(|l| {
                    format!(
                        "{}{}",
                        l.pathname().unwrap_or_else(|_| "/".to_string()),
                        l.search().unwrap_or_default()
                    )
                })
                .unwrap_or_else(|| "/".to_string())
        }
    }

    impl Navigator for BrowserNavigator {
        fn current_path(&self) -> String {
            window()
                .and_then(|w| w.location().pathname().ok())
                .unwrap_or_else(|| "/".to_string())
        }

        fn push(&self, url: &str) {
            let result = window()
                .and_then(|w| w.history().ok())
                .map(|h| h.push_state_with_url(&JsValue::NULL, "", Some(url)));
            if let Some(Err(e)) = result {
                log::error!("❌ [ROUTER] pushState falló para {}: {:?}", url, e);
            }
        }

        fn replace(&self, url: &str) {
            let result = window()
                .and_then(|w| w.history().ok())
                .map(|h| h.replace_state_with_url(&JsValue::NULL, "", Some(url)));
            if let Some(Err(e)) = result {
                log::error!("❌ [ROUTER] replaceState falló para {}: {:?}", url, e);
            }
        }

        fn redirect(&self, url: &str) {
            if let Some(w) = window() {
                if let Err(e) = w.location().set_href(url) {
                    log::error!("❌ [ROUTER] No se pudo redirigir a {}: {:?}", url, e);
                }
            }
        }
    }
}
