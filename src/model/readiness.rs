use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DependencyState {
    Up,
    Down,
    /// Not configured; never blocks readiness
    Disabled,
}

/// State of the stores an analysis run touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Readiness {
    pub version_store: DependencyState,
    pub cache: DependencyState,
}

impl Readiness {
    /// Only the version store gates readiness. A missing or failing cache
    /// degrades `latest` lookups to the store.
    pub fn is_ready(&self) -> bool {
        self.version_store == DependencyState::Up
    }
}
