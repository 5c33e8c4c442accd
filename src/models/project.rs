use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// El backend manda `null` en campos opcionales; se tratan como ausentes
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Proyecto ACC tal como lo devuelve `/api/auth/projects`.
/// Los campos desconocidos se conservan en `extra` para no perder datos al re-guardar.
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug, Default)]
pub struct ProjectSummary {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "isActive", default, deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectSummary {
    pub fn new(id: &str, name: &str, is_active: bool) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            is_active,
            extra: Map::new(),
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug, Default)]
pub struct ProjectList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub list: Vec<ProjectSummary>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct HubInfo {
    #[serde(default)]
    pub hub_id: Option<String>,
    #[serde(default)]
    pub hub_name: Option<String>,
    #[serde(default)]
    pub real_account_id: Option<String>,
}

/// Marcas de tiempo locales del caché (ms Unix)
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug, Default)]
pub struct CacheInfo {
    #[serde(default)]
    pub cached_at: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Blob persistido bajo `acc_projects`
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug, Default)]
pub struct ProjectCacheRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub projects: ProjectList,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hub: Option<HubInfo>,
    #[serde(default)]
    pub cache_info: CacheInfo,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectCacheRecord {
    pub fn with_projects(list: Vec<ProjectSummary>) -> Self {
        Self {
            status: Some(crate::utils::STATUS_SUCCESS.to_string()),
            projects: ProjectList { list, extra: Map::new() },
            ..Default::default()
        }
    }

    pub fn list(&self) -> &[ProjectSummary] {
        &self.projects.list
    }

    /// Sin `expires_at` el registro no caduca
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        match self.cache_info.expires_at {
            Some(expires_at) => now_ms >= expires_at,
            None => false,
        }
    }
}

/// Proyecto seleccionado: uno solo o una lista.
/// En JSON es el objeto o el array tal cual (compatible con registros antiguos).
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(untagged)]
pub enum SelectedProject {
    Multiple(Vec<ProjectSummary>),
    Single(ProjectSummary),
}

impl SelectedProject {
    pub fn count(&self) -> usize {
        match self {
            SelectedProject::Single(_) => 1,
            SelectedProject::Multiple(list) => list.len(),
        }
    }

    pub fn is_multiple(&self) -> bool {
        matches!(self, SelectedProject::Multiple(_))
    }

    /// Nombre para mostrar
    pub fn display_name(&self) -> String {
        match self {
            SelectedProject::Single(project) => project.name.clone(),
            SelectedProject::Multiple(list) => format!("{} projects", list.len()),
        }
    }
}

/// Blob persistido bajo `acc_selected_project`
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct SelectedProjectRecord {
    pub project: SelectedProject,
    pub selected_at: i64,
    #[serde(default)]
    pub expires_at: Option<i64>,
}

impl SelectedProjectRecord {
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => now_ms >= expires_at,
            None => false,
        }
    }
}

// ============================================================================
// DIAGNÓSTICO DEL CACHÉ
// ============================================================================

#[derive(Clone, PartialEq, Serialize, Debug)]
pub struct CacheStatus {
    pub projects: ProjectsCacheStatus,
    pub selected_project: SelectedCacheStatus,
}

#[derive(Clone, PartialEq, Serialize, Debug)]
pub struct ProjectsCacheStatus {
    pub exists: bool,
    pub count: usize,
    pub cached_at: Option<i64>,
    pub expires_at: Option<i64>,
    /// `true` también cuando falta `expires_at`
    pub is_expired: bool,
    pub age_hours: Option<f64>,
}

#[derive(Clone, PartialEq, Serialize, Debug)]
pub struct SelectedCacheStatus {
    pub exists: bool,
    pub is_multiple: bool,
    pub count: usize,
    pub name: Option<String>,
    pub selected_at: Option<i64>,
    pub expires_at: Option<i64>,
    pub is_expired: bool,
}
