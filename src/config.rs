use serde::{Deserialize, Serialize};
use tracing::{debug, info};

fn default_depth() -> u32 {
    3
}

/// Configuration for one projection run: which CMS project to read and how
/// deep the items endpoint should follow links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub project_id: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default = "default_depth")]
    pub depth: u32,
}

impl ProjectConfig {
    pub fn trace_loaded(&self) {
        info!(
            project_id = %self.project_id,
            language = ?self.language,
            depth = self.depth,
            "Loaded ProjectConfig"
        );
        debug!(?self, "ProjectConfig loaded (full debug)");
    }
}
