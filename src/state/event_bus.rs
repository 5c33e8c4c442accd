// ============================================================================
// EVENT BUS - publish/subscribe síncrono entre componentes
// ============================================================================

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use serde_json::Value;

/// Nombres de eventos conocidos
pub mod events {
    pub const AUTH_LOGOUT: &str = "auth:logout";
    pub const AUTH_EXPIRED: &str = "auth:expired";
    pub const PROJECTS_UPDATED: &str = "projects:updated";
    pub const PROJECT_SELECTED: &str = "project:selected";
    pub const CACHE_CLEARED: &str = "cache:cleared";
    /// Tras cada navegación aceptada: `{ "path", "view" }`
    pub const ROUTE_CHANGED: &str = "route:changed";
}

/// Un handler que devuelve `Err` se registra en el log y no corta el despacho
pub type HandlerResult = Result<(), String>;

type Handler = Rc<dyn Fn(&Value) -> HandlerResult>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Registry {
    events: RefCell<HashMap<String, Vec<(SubscriptionId, Handler)>>>,
    next_id: Cell<u64>,
}

impl Registry {
    fn next_id(&self) -> SubscriptionId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        SubscriptionId(id)
    }

    fn insert(&self, event: &str, id: SubscriptionId, handler: Handler) {
        self.events
            .borrow_mut()
            .entry(event.to_string())
            .or_default()
            .push((id, handler));
    }

    fn remove(&self, event: &str, id: Option<SubscriptionId>) -> bool {
        let mut events = self.events.borrow_mut();
        let Some(handlers) = events.get_mut(event) else {
            return false;
        };
        let before = handlers.len();
        match id {
            Some(id) => handlers.retain(|(handler_id, _)| *handler_id != id),
            None => handlers.clear(),
        }
        let removed = handlers.len() != before;
        if handlers.is_empty() {
            events.remove(event);
        }
        removed
    }

    fn contains(&self, event: &str, id: SubscriptionId) -> bool {
        self.events
            .borrow()
            .get(event)
            .map(|handlers| handlers.iter().any(|(handler_id, _)| *handler_id == id))
            .unwrap_or(false)
    }
}

/// Bus de eventos. Clonar comparte el mismo registro.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Rc<Registry>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suscribirse a un evento
    pub fn subscribe<F>(&self, event: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&Value) -> HandlerResult + 'static,
    {
        let id = self.registry.next_id();
        self.registry.insert(event, id, Rc::new(handler));
        id
    }

    /// Suscripción que se elimina sola tras la primera invocación
    pub fn subscribe_once<F>(&self, event: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&Value) -> HandlerResult + 'static,
    {
        let id = self.registry.next_id();
        let registry: Weak<Registry> = Rc::downgrade(&self.registry);
        let fired = Cell::new(false);
        let event_name = event.to_string();

        let wrapper = move |payload: &Value| -> HandlerResult {
            if fired.replace(true) {
                return Ok(());
            }
            if let Some(registry) = registry.upgrade() {
                registry.remove(&event_name, Some(id));
            }
            handler(payload)
        };

        self.registry.insert(event, id, Rc::new(wrapper));
        id
    }

    /// Sin `id` elimina todos los handlers del evento. Devuelve si se quitó algo.
    pub fn unsubscribe(&self, event: &str, id: Option<SubscriptionId>) -> bool {
        self.registry.remove(event, id)
    }

    /// Invoca en orden de registro los handlers de `event`; devuelve cuántos se ejecutaron.
    ///
    /// Se despacha sobre una copia de la lista, así que un handler puede suscribir,
    /// desuscribir o publicar sin bloquear el registro. Un handler eliminado por otro
    /// anterior durante el mismo despacho ya no se ejecuta.
    pub fn publish(&self, event: &str, payload: &Value) -> usize {
        let snapshot: Vec<(SubscriptionId, Handler)> = match self.registry.events.borrow().get(event) {
            Some(handlers) => handlers.clone(),
            None => return 0,
        };

        let mut invoked = 0;
        for (id, handler) in snapshot {
            if !self.registry.contains(event, id) {
                continue;
            }
            invoked += 1;
            if let Err(err) = handler(payload) {
                log::error!("❌ [EVENT_BUS] Error en handler de \"{}\": {}", event, err);
            }
        }
        invoked
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.registry
            .events
            .borrow()
            .get(event)
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn clear(&self) {
        self.registry.events.borrow_mut().clear();
    }
}
