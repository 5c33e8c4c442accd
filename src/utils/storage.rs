use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::StorageError;

/// Almacén clave/valor de texto (la interfaz de `localStorage`)
pub trait StorageBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

pub fn save_to_storage<T: Serialize>(
    storage: &dyn StorageBackend,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(value)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    storage.set_item(key, &json)
}

/// `Ok(None)` si la clave no existe; error si no se puede leer o parsear
pub fn load_from_storage<T: DeserializeOwned>(
    storage: &dyn StorageBackend,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match storage.get_item(key)? {
        Some(json) => serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| StorageError::Serialization(e.to_string())),
        None => Ok(None),
    }
}

pub fn remove_from_storage(storage: &dyn StorageBackend, key: &str) -> Result<(), StorageError> {
    storage.remove_item(key)
}

// ============================================================================
// MEMORIA - fallback cuando no hay localStorage (y para tests)
// ============================================================================

#[derive(Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
    fail_writes: Cell<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simula cuota excedida: todas las escrituras fallan
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::Write("QuotaExceededError".to_string()));
        }
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

// ============================================================================
// LOCALSTORAGE - navegador
// ============================================================================

#[cfg(target_arch = "wasm32")]
pub use browser::LocalStorage;

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::StorageBackend;
    use crate::error::StorageError;
    use web_sys::{window, Storage};

    pub struct LocalStorage;

    impl LocalStorage {
        /// Devuelve `None` si el navegador no expone localStorage (modo privado, iframes...)
        pub fn open() -> Option<Self> {
            get_local_storage().map(|_| Self)
        }
    }

    fn get_local_storage() -> Option<Storage> {
        window()?.local_storage().ok()?
    }

    impl StorageBackend for LocalStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            let storage = get_local_storage().ok_or(StorageError::Unavailable)?;
            storage
                .get_item(key)
                .map_err(|e| StorageError::Read(format!("{:?}", e)))
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
            let storage = get_local_storage().ok_or(StorageError::Unavailable)?;
            storage
                .set_item(key, value)
                .map_err(|e| StorageError::Write(format!("{:?}", e)))
        }

        fn remove_item(&self, key: &str) -> Result<(), StorageError> {
            let storage = get_local_storage().ok_or(StorageError::Unavailable)?;
            storage
                .remove_item(key)
                .map_err(|e| StorageError::Write(format!("{:?}", e)))
        }
    }
}
