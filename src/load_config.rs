use crate::config::ProjectConfig;
use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{error, info};

#[derive(Deserialize, Default)]
struct StaticConfig {
    #[serde(default)]
    project_id: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    depth: Option<u32>,
}

/// Loads a static YAML config file and merges it with the environment.
/// `KONTENT_PROJECT_ID` overrides the file's `project_id`; one of the two
/// must supply it. Returns a fully merged ProjectConfig or an error.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ProjectConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let static_conf: StaticConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    let project_id = match std::env::var("KONTENT_PROJECT_ID") {
        Ok(id) if !id.is_empty() => {
            info!("KONTENT_PROJECT_ID found in env, overriding config file");
            id
        }
        _ => match static_conf.project_id {
            Some(id) if !id.is_empty() => id,
            _ => {
                error!("project_id missing from both config file and KONTENT_PROJECT_ID env var");
                anyhow::bail!(
                    "project_id must be set in the config file or via KONTENT_PROJECT_ID"
                );
            }
        },
    };

    let config = ProjectConfig {
        project_id,
        language: static_conf.language,
        depth: static_conf.depth.unwrap_or(3),
    };

    info!(
        project_id = %config.project_id,
        depth = config.depth,
        "Config loaded and merged successfully"
    );

    Ok(config)
}
