// ============================================================================
// PROJECT STORE - Caché de proyectos ACC en localStorage con caducidad
// ============================================================================
// Dos registros independientes:
// - `acc_projects`: lista de proyectos, 24h
// - `acc_selected_project`: proyecto(s) seleccionado(s), 2h
// Los fallos de storage nunca suben al llamador: se registran y cuentan como miss.
// ============================================================================

use std::rc::Rc;

use serde_json::{json, Value};

use crate::config::AppConfig;
use crate::error::FetchError;
use crate::models::{
    CacheStatus, ProjectCacheRecord, ProjectSummary, ProjectsCacheStatus, SelectedCacheStatus,
    SelectedProject, SelectedProjectRecord,
};
use crate::services::http::{HttpClient, HttpRequest};
use crate::state::{events, EventBus};
use crate::utils::{
    load_from_storage, remove_from_storage, save_to_storage, Clock, StorageBackend,
    CACHE_BUST_PARAM, MS_PER_HOUR, PROJECTS_PATH, STATUS_SUCCESS, STORAGE_KEY_PROJECTS,
    STORAGE_KEY_SELECTED_PROJECT,
};

#[derive(Clone)]
pub struct ProjectStore {
    storage: Rc<dyn StorageBackend>,
    client: Rc<dyn HttpClient>,
    clock: Rc<dyn Clock>,
    event_bus: Option<EventBus>,
    projects_url: String,
    projects_timeout_ms: u32,
    project_ttl_ms: i64,
    selected_ttl_ms: i64,
}

impl ProjectStore {
    pub fn new(
        config: &AppConfig,
        storage: Rc<dyn StorageBackend>,
        client: Rc<dyn HttpClient>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            client,
            clock,
            event_bus: None,
            projects_url: config.endpoint(PROJECTS_PATH),
            projects_timeout_ms: config.network.projects_timeout_ms,
            project_ttl_ms: config.cache.project_ttl_hours * MS_PER_HOUR,
            selected_ttl_ms: config.cache.selected_project_ttl_hours * MS_PER_HOUR,
        }
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    fn publish(&self, event: &str, payload: Value) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event, &payload);
        }
    }

    /// Copia del registro con `cached_at`/`expires_at` renovados
    fn stamp(&self, record: &ProjectCacheRecord) -> ProjectCacheRecord {
        let now = self.clock.now_ms();
        let mut stamped = record.clone();
        stamped.cache_info.cached_at = Some(now);
        stamped.cache_info.expires_at = Some(now + self.project_ttl_ms);
        stamped
    }

    fn persist(&self, record: &ProjectCacheRecord) -> bool {
        match save_to_storage(&*self.storage, STORAGE_KEY_PROJECTS, record) {
            Ok(()) => {
                log::info!("💾 [PROJECTS] {} proyectos guardados en caché", record.list().len());
                true
            }
            Err(e) => {
                log::error!("❌ [PROJECTS] Error guardando proyectos: {}", e);
                false
            }
        }
    }

    /// Guarda la lista con caducidad de 24h. `false` si el storage falla.
    pub fn save(&self, record: &ProjectCacheRecord) -> bool {
        self.persist(&self.stamp(record))
    }

    /// Registro cacheado; `None` si no existe, no se puede leer o (con `check_expiry`) caducó
    pub fn load(&self, check_expiry: bool) -> Option<ProjectCacheRecord> {
        let record = match load_from_storage::<ProjectCacheRecord>(&*self.storage, STORAGE_KEY_PROJECTS) {
            Ok(Some(record)) => record,
            Ok(None) => {
                log::debug!("ℹ️ [PROJECTS] No hay proyectos en caché");
                return None;
            }
            Err(e) => {
                log::error!("❌ [PROJECTS] Error leyendo caché de proyectos: {}", e);
                return None;
            }
        };

        if check_expiry && record.is_expired_at(self.clock.now_ms()) {
            log::info!("⌛ [PROJECTS] Caché expirado, hay que refrescar");
            return None;
        }

        log::debug!("📋 [PROJECTS] {} proyectos cargados de caché", record.list().len());
        Some(record)
    }

    pub fn list(&self, check_expiry: bool) -> Vec<ProjectSummary> {
        self.load(check_expiry)
            .map(|record| record.projects.list)
            .unwrap_or_default()
    }

    pub fn find_by_id(&self, project_id: &str) -> Option<ProjectSummary> {
        self.list(true).into_iter().find(|p| p.id == project_id)
    }

    pub fn active_projects(&self) -> Vec<ProjectSummary> {
        self.list(true).into_iter().filter(|p| p.is_active).collect()
    }

    // ------------------------------------------------------------------------
    // Proyecto seleccionado
    // ------------------------------------------------------------------------

    pub fn save_selected(&self, selected: SelectedProject) -> bool {
        let now = self.clock.now_ms();
        let record = SelectedProjectRecord {
            project: selected,
            selected_at: now,
            expires_at: Some(now + self.selected_ttl_ms),
        };

        match save_to_storage(&*self.storage, STORAGE_KEY_SELECTED_PROJECT, &record) {
            Ok(()) => {
                log::info!("📌 [PROJECTS] Seleccionado: {}", record.project.display_name());
                self.publish(
                    events::PROJECT_SELECTED,
                    serde_json::to_value(&record.project).unwrap_or(Value::Null),
                );
                true
            }
            Err(e) => {
                log::error!("❌ [PROJECTS] Error guardando proyecto seleccionado: {}", e);
                false
            }
        }
    }

    fn load_selected_record(&self) -> Option<SelectedProjectRecord> {
        match load_from_storage::<SelectedProjectRecord>(&*self.storage, STORAGE_KEY_SELECTED_PROJECT) {
            Ok(record) => record,
            Err(e) => {
                log::error!("❌ [PROJECTS] Error leyendo proyecto seleccionado: {}", e);
                None
            }
        }
    }

    /// Una lectura caducada borra el registro
    pub fn selected(&self, check_expiry: bool) -> Option<SelectedProject> {
        let record = self.load_selected_record()?;
        if check_expiry && record.is_expired_at(self.clock.now_ms()) {
            log::info!("⌛ [PROJECTS] Proyecto seleccionado expirado");
            self.clear_selected();
            return None;
        }
        Some(record.project)
    }

    pub fn clear_selected(&self) -> bool {
        match remove_from_storage(&*self.storage, STORAGE_KEY_SELECTED_PROJECT) {
            Ok(()) => {
                log::debug!("🗑️ [PROJECTS] Proyecto seleccionado eliminado");
                true
            }
            Err(e) => {
                log::error!("❌ [PROJECTS] Error eliminando proyecto seleccionado: {}", e);
                false
            }
        }
    }

    pub fn clear_all(&self) -> bool {
        let cleared = [STORAGE_KEY_PROJECTS, STORAGE_KEY_SELECTED_PROJECT]
            .iter()
            .map(|key| remove_from_storage(&*self.storage, key))
            .collect::<Result<Vec<_>, _>>();

        match cleared {
            Ok(_) => {
                log::info!("🗑️ [PROJECTS] Caché de proyectos limpiado");
                self.publish(events::CACHE_CLEARED, json!({ "scope": "projects" }));
                true
            }
            Err(e) => {
                log::error!("❌ [PROJECTS] Error limpiando caché: {}", e);
                false
            }
        }
    }

    /// Diagnóstico de ambos registros. Nunca caduca ni borra nada.
    pub fn cache_status(&self) -> CacheStatus {
        let now = self.clock.now_ms();
        let projects = self.load(false);
        let selected = self.load_selected_record();

        let cached_at = projects.as_ref().and_then(|r| r.cache_info.cached_at);
        let expires_at = projects.as_ref().and_then(|r| r.cache_info.expires_at);

        CacheStatus {
            projects: ProjectsCacheStatus {
                exists: projects.is_some(),
                count: projects.as_ref().map(|r| r.list().len()).unwrap_or(0),
                cached_at,
                expires_at,
                is_expired: expires_at.map(|e| now >= e).unwrap_or(true),
                age_hours: cached_at.map(|c| {
                    let hours = (now - c) as f64 / MS_PER_HOUR as f64;
                    (hours * 10.0).round() / 10.0
                }),
            },
            selected_project: SelectedCacheStatus {
                exists: selected.is_some(),
                is_multiple: selected.as_ref().map(|r| r.project.is_multiple()).unwrap_or(false),
                count: selected.as_ref().map(|r| r.project.count()).unwrap_or(0),
                name: selected.as_ref().map(|r| r.project.display_name()),
                selected_at: selected.as_ref().map(|r| r.selected_at),
                expires_at: selected.as_ref().and_then(|r| r.expires_at),
                is_expired: selected.as_ref().map(|r| r.is_expired_at(now)).unwrap_or(false),
            },
        }
    }

    // ------------------------------------------------------------------------
    // Red
    // ------------------------------------------------------------------------

    /// Pide la lista al servidor, la guarda y devuelve el registro ya sellado
    pub async fn refresh_from_source(&self) -> Result<ProjectCacheRecord, FetchError> {
        log::info!("🔄 [PROJECTS] Refrescando proyectos desde la API...");
        let request = HttpRequest::get(&self.projects_url)
            .with_query(CACHE_BUST_PARAM, &self.clock.now_ms().to_string())
            .with_timeout(self.projects_timeout_ms);

        let response = self.client.send(&request).await.map_err(|e| {
            log::error!("❌ [PROJECTS] Error de red: {}", e);
            FetchError::from(e)
        })?;

        let payload: Option<Value> = response.json().ok();
        let server_message = payload.as_ref().and_then(server_message);

        if !response.is_success() {
            let message = server_message.unwrap_or_else(|| format!("HTTP {}", response.status));
            log::error!("❌ [PROJECTS] HTTP {}: {}", response.status, message);
            return Err(FetchError::Status { status: response.status, message });
        }

        let payload = payload.ok_or_else(|| FetchError::Decode("respuesta no es JSON".to_string()))?;
        if payload.get("status").and_then(Value::as_str) != Some(STATUS_SUCCESS) {
            let message = server_message.unwrap_or_else(|| "Failed to fetch project data".to_string());
            log::error!("❌ [PROJECTS] El servidor rechazó la petición: {}", message);
            return Err(FetchError::Server(message));
        }

        let record: ProjectCacheRecord =
            serde_json::from_value(payload).map_err(|e| FetchError::Decode(e.to_string()))?;
        let stamped = self.stamp(&record);
        self.persist(&stamped);

        log::info!("✅ [PROJECTS] {} proyectos refrescados", stamped.list().len());
        self.publish(events::PROJECTS_UPDATED, json!({ "count": stamped.list().len() }));
        Ok(stamped)
    }

    /// Caché primero; red solo si se fuerza, falta, caducó o la lista está vacía
    pub async fn get_with_cache(&self, force_refresh: bool) -> Result<ProjectCacheRecord, FetchError> {
        if force_refresh {
            return self.refresh_from_source().await;
        }

        if let Some(cached) = self.load(true) {
            if !cached.list().is_empty() {
                log::debug!("📋 [PROJECTS] Usando proyectos cacheados");
                return Ok(cached);
            }
        }

        log::info!("📋 [PROJECTS] Caché no válido, consultando la API");
        self.refresh_from_source().await
    }
}

fn server_message(payload: &Value) -> Option<String> {
    payload
        .get("error")
        .or_else(|| payload.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HttpError;
    use crate::services::mock::MockHttpClient;
    use crate::utils::{ManualClock, MemoryStorage};
    use std::cell::Cell;

    const T0: i64 = 1_700_000_000_000;
    const PROJECTS: &str = "/api/auth/projects";

    struct Fixture {
        store: ProjectStore,
        storage: Rc<MemoryStorage>,
        client: Rc<MockHttpClient>,
        clock: Rc<ManualClock>,
    }

    fn fixture() -> Fixture {
        let storage = Rc::new(MemoryStorage::new());
        let client = Rc::new(MockHttpClient::new());
        let clock = Rc::new(ManualClock::new(T0));
        let store = ProjectStore::new(
            &AppConfig::default(),
            storage.clone(),
            client.clone(),
            clock.clone(),
        );
        Fixture { store, storage, client, clock }
    }

    fn sample_record() -> ProjectCacheRecord {
        ProjectCacheRecord::with_projects(vec![
            ProjectSummary::new("p1", "Tower A", true),
            ProjectSummary::new("p2", "Bridge B", false),
            ProjectSummary::new("p3", "Depot C", true),
        ])
    }

    fn projects_payload(ids: &[&str]) -> Value {
        let list: Vec<Value> = ids
            .iter()
            .map(|id| json!({ "id": id, "name": format!("Project {}", id), "isActive": true }))
            .collect();
        json!({ "status": "success", "projects": { "list": list }, "hub": { "hubId": "b.hub" } })
    }

    #[test]
    fn saved_record_is_valid_until_24h() {
        let f = fixture();
        assert!(f.store.save(&sample_record()));

        let loaded = f.store.load(true).unwrap();
        assert_eq!(loaded.cache_info.cached_at, Some(T0));
        assert_eq!(loaded.cache_info.expires_at, Some(T0 + 24 * MS_PER_HOUR));

        f.clock.set(T0 + 24 * MS_PER_HOUR - 1);
        assert!(f.store.load(true).is_some());

        f.clock.set(T0 + 24 * MS_PER_HOUR);
        assert!(f.store.load(true).is_none());
        assert!(f.store.load(false).is_some());
    }

    #[test]
    fn save_reports_storage_failure() {
        let f = fixture();
        f.storage.set_fail_writes(true);
        assert!(!f.store.save(&sample_record()));
        assert!(f.store.load(false).is_none());
    }

    #[test]
    fn corrupt_blob_is_a_miss() {
        let f = fixture();
        f.storage.set_item(STORAGE_KEY_PROJECTS, "{\"projects\":").unwrap();
        assert!(f.store.load(true).is_none());
        assert!(f.store.list(false).is_empty());
    }

    #[test]
    fn filters_over_fresh_list() {
        let f = fixture();
        f.store.save(&sample_record());

        assert_eq!(f.store.find_by_id("p2").unwrap().name, "Bridge B");
        assert!(f.store.find_by_id("missing").is_none());

        let active: Vec<String> = f.store.active_projects().into_iter().map(|p| p.id).collect();
        assert_eq!(active, vec!["p1", "p3"]);

        f.clock.advance(25 * MS_PER_HOUR);
        assert!(f.store.find_by_id("p1").is_none());
        assert_eq!(f.store.list(false).len(), 3);
    }

    #[test]
    fn selected_project_expires_after_two_hours_and_is_cleared() {
        let f = fixture();
        let single = SelectedProject::Single(ProjectSummary::new("p1", "Tower A", true));
        assert!(f.store.save_selected(single.clone()));
        assert_eq!(f.store.selected(true), Some(single));

        f.clock.advance(2 * MS_PER_HOUR);
        assert_eq!(f.store.selected(true), None);
        assert_eq!(f.storage.get_item(STORAGE_KEY_SELECTED_PROJECT).unwrap(), None);
    }

    #[test]
    fn selected_without_expiry_check_survives() {
        let f = fixture();
        let multiple = SelectedProject::Multiple(vec![
            ProjectSummary::new("p1", "Tower A", true),
            ProjectSummary::new("p2", "Bridge B", false),
        ]);
        f.store.save_selected(multiple.clone());

        f.clock.advance(3 * MS_PER_HOUR);
        assert_eq!(f.store.selected(false), Some(multiple));
        assert!(f.store.clear_selected());
        assert_eq!(f.store.selected(false), None);
    }

    #[test]
    fn clear_all_removes_both_keys() {
        let f = fixture();
        f.store.save(&sample_record());
        f.store.save_selected(SelectedProject::Single(ProjectSummary::new("p1", "A", true)));

        assert!(f.store.clear_all());
        assert!(f.storage.is_empty());
    }

    #[test]
    fn cache_status_reports_without_mutating() {
        let f = fixture();
        let empty = f.store.cache_status();
        assert!(!empty.projects.exists);
        assert!(empty.projects.is_expired);
        assert_eq!(empty.projects.age_hours, None);
        assert!(!empty.selected_project.exists);

        f.store.save(&sample_record());
        f.store.save_selected(SelectedProject::Multiple(vec![
            ProjectSummary::new("p1", "A", true),
            ProjectSummary::new("p2", "B", true),
        ]));

        f.clock.advance(3 * MS_PER_HOUR + 15 * 60 * 1000);
        let status = f.store.cache_status();
        assert!(status.projects.exists);
        assert_eq!(status.projects.count, 3);
        assert!(!status.projects.is_expired);
        assert_eq!(status.projects.age_hours, Some(3.3));
        assert!(status.selected_project.is_multiple);
        assert_eq!(status.selected_project.count, 2);
        assert_eq!(status.selected_project.name.as_deref(), Some("2 projects"));
        assert!(status.selected_project.is_expired);

        // El registro caducado sigue ahí
        assert!(f.storage.get_item(STORAGE_KEY_SELECTED_PROJECT).unwrap().is_some());
    }

    #[tokio::test]
    async fn refresh_saves_and_sends_cache_buster() {
        let f = fixture();
        f.client.mock_response(PROJECTS, 200, projects_payload(&["p1", "p2"]));

        let record = f.store.refresh_from_source().await.unwrap();
        assert_eq!(record.list().len(), 2);
        assert_eq!(record.cache_info.cached_at, Some(T0));
        assert_eq!(f.store.load(true).unwrap().list().len(), 2);

        let request = &f.client.requests()[0];
        assert_eq!(request.query, vec![("_t".to_string(), T0.to_string())]);
        assert_eq!(request.timeout_ms, Some(30_000));
    }

    #[tokio::test]
    async fn refresh_accepts_projects_with_null_fields() {
        let f = fixture();
        f.client.mock_response(
            PROJECTS,
            200,
            json!({
                "status": "success",
                "projects": { "list": [
                    { "id": "b.1", "name": "Tower A", "isActive": true },
                    { "id": "b.2", "name": null, "isActive": null }
                ] }
            }),
        );

        let record = f.store.refresh_from_source().await.unwrap();
        assert_eq!(record.list().len(), 2);
        assert_eq!(record.list()[1].name, "");
        assert!(!record.list()[1].is_active);
        assert_eq!(f.store.active_projects().len(), 1);
    }

    #[test]
    fn stored_blob_with_null_name_still_loads() {
        let f = fixture();
        let blob = json!({
            "projects": { "list": [{ "id": "b.9", "name": null, "isActive": true }] },
            "cache_info": { "cached_at": T0, "expires_at": T0 + 1_000 }
        });
        f.storage.set_item(STORAGE_KEY_PROJECTS, &blob.to_string()).unwrap();

        let loaded = f.store.load(true).unwrap();
        assert_eq!(loaded.list()[0].id, "b.9");
    }

    #[tokio::test]
    async fn refresh_surfaces_server_message() {
        let f = fixture();
        f.client.mock_response(PROJECTS, 200, json!({ "status": "error", "error": "Hub no disponible" }));

        let err = f.store.refresh_from_source().await.unwrap_err();
        assert_eq!(err, FetchError::Server("Hub no disponible".to_string()));
        assert!(f.store.load(false).is_none());
    }

    #[tokio::test]
    async fn refresh_maps_http_and_transport_failures() {
        let f = fixture();
        f.client.mock_response(PROJECTS, 408, json!({ "status": "timeout", "error": "请求超时" }));
        f.client.mock_error(PROJECTS, HttpError::Network("offline".into()));

        let err = f.store.refresh_from_source().await.unwrap_err();
        assert_eq!(err, FetchError::Status { status: 408, message: "请求超时".to_string() });

        let err = f.store.refresh_from_source().await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(HttpError::Network(_))));
    }

    #[tokio::test]
    async fn get_with_cache_skips_network_when_fresh() {
        let f = fixture();
        f.store.save(&sample_record());

        let record = f.store.get_with_cache(false).await.unwrap();
        assert_eq!(record.list().len(), 3);
        assert_eq!(f.client.calls_to(PROJECTS), 0);
    }

    #[tokio::test]
    async fn get_with_cache_refreshes_on_expired_or_empty() {
        let f = fixture();
        f.store.save(&sample_record());
        f.clock.advance(24 * MS_PER_HOUR);
        f.client.mock_response(PROJECTS, 200, projects_payload(&["p9"]));

        let record = f.store.get_with_cache(false).await.unwrap();
        assert_eq!(record.list()[0].id, "p9");
        assert_eq!(f.client.calls_to(PROJECTS), 1);

        f.store.save(&ProjectCacheRecord::with_projects(vec![]));
        f.client.mock_response(PROJECTS, 200, projects_payload(&["p1"]));
        f.store.get_with_cache(false).await.unwrap();
        assert_eq!(f.client.calls_to(PROJECTS), 2);
    }

    #[tokio::test]
    async fn forced_get_always_refreshes() {
        let f = fixture();
        f.store.save(&sample_record());
        f.client.mock_response(PROJECTS, 200, projects_payload(&["p1"]));

        f.store.get_with_cache(true).await.unwrap();
        assert_eq!(f.client.calls_to(PROJECTS), 1);
    }

    #[tokio::test]
    async fn store_events_are_published() {
        let f = fixture();
        let bus = EventBus::new();
        let store = f.store.clone().with_event_bus(bus.clone());
        let updates = Rc::new(Cell::new(0));

        for event in [events::PROJECTS_UPDATED, events::PROJECT_SELECTED, events::CACHE_CLEARED] {
            let u = updates.clone();
            bus.subscribe(event, move |_| {
                u.set(u.get() + 1);
                Ok(())
            });
        }

        f.client.mock_response(PROJECTS, 200, projects_payload(&["p1"]));
        store.refresh_from_source().await.unwrap();
        store.save_selected(SelectedProject::Single(ProjectSummary::new("p1", "A", true)));
        store.clear_all();
        assert_eq!(updates.get(), 3);
    }
}
