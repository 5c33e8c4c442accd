// ============================================================================
// ACC PORTAL - NÚCLEO DEL FRONTEND (RUST + WASM)
// ============================================================================
// - State: bus de eventos + caché de auth con Rc<RefCell>
// - Services: HTTP (con interceptor 401), auth, caché de proyectos
// - Router: tabla de rutas + guard de autenticación
// - Models: Estructuras compartidas con backend
// ============================================================================

pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod router;
pub mod services;
pub mod state;
pub mod utils;

pub use app::{App, AppContext};
pub use config::{AppConfig, CONFIG};
pub use error::{FetchError, HttpError, StorageError};
pub use state::{events, EventBus};

#[cfg(target_arch = "wasm32")]
mod browser {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;

    use crate::app::{browser_context, App};
    use crate::config::CONFIG;
    use crate::router::BrowserNavigator;

    // Instancia global de la App
    thread_local! {
        static APP: RefCell<Option<Rc<App>>> = RefCell::new(None);
    }

    fn enter_current_location(app: Rc<App>) {
        let url = BrowserNavigator::current_url();
        wasm_bindgen_futures::spawn_local(async move {
            app.enter(&url).await;
        });
    }

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();

        if CONFIG.is_logging_enabled() {
            wasm_logger::init(wasm_logger::Config::new(CONFIG.log_level()));
        }
        log::info!("🚀 ACC Portal - Rust + WASM ({})", CONFIG.backend_url);

        let app = Rc::new(App::new(browser_context()));
        APP.with(|cell| {
            *cell.borrow_mut() = Some(app.clone());
        });

        enter_current_location(app);

        // Back/forward: el navegador ya muestra la URL, solo pasa por el guard
        if let Some(win) = web_sys::window() {
            let closure = Closure::wrap(Box::new(move |_e: web_sys::Event| {
                let app = APP.with(|cell| cell.borrow().clone());
                if let Some(app) = app {
                    enter_current_location(app);
                }
            }) as Box<dyn FnMut(web_sys::Event)>);

            win.add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref())?;
            // Se registra una sola vez en el arranque
            closure.forget();
        }

        Ok(())
    }

    /// Navegación programática desde JS (enlaces del layout)
    #[wasm_bindgen]
    pub fn navigate(url: String) {
        let app = APP.with(|cell| cell.borrow().clone());
        match app {
            Some(app) => wasm_bindgen_futures::spawn_local(async move {
                app.navigate(&url).await;
            }),
            None => log::warn!("⚠️ [MAIN] App no inicializada, navegación ignorada: {}", url),
        }
    }

    #[wasm_bindgen]
    pub fn logout() {
        let app = APP.with(|cell| cell.borrow().clone());
        if let Some(app) = app {
            wasm_bindgen_futures::spawn_local(async move {
                app.logout().await;
            });
        }
    }
}
