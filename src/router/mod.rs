// ============================================================================
// ROUTER - Tabla de rutas, guard de auth y acceso a History
// ============================================================================

pub mod guard;
pub mod navigator;
pub mod routes;

pub use guard::{NavigationDecision, RouterGuard};
pub use navigator::{MemoryNavigator, NavigationRecord, Navigator};
#[cfg(target_arch = "wasm32")]
pub use navigator::BrowserNavigator;
pub use routes::{Location, Redirect, Route, RouteTable, View};
