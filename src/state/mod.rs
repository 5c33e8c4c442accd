// ============================================================================
// STATE MODULE - Estado compartido con Rc<RefCell> + notificaciones
// ============================================================================

pub mod auth_state;
pub mod event_bus;

pub use auth_state::*;
pub use event_bus::{events, EventBus, HandlerResult, SubscriptionId};
