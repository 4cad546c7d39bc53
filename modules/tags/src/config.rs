use serde::{Deserialize, Serialize};
use svckit::DatabaseConfig;

/// `modules.tags` section of the server config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagsConfig {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// Overrides the global `database` section for this module only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseConfig>,
}

fn enabled_by_default() -> bool {
    true
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            database: None,
        }
    }
}
