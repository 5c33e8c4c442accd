pub mod auth;
pub mod project;

pub use auth::{AuthCheckResponse, LogoutResponse, RefreshTokenResponse, TokenInfo};
pub use project::{
    CacheInfo, CacheStatus, HubInfo, ProjectCacheRecord, ProjectList, ProjectSummary,
    ProjectsCacheStatus, SelectedCacheStatus, SelectedProject, SelectedProjectRecord,
};
