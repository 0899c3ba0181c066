//! Project model: a workspace directory with a `project.json` configuration.
//!
//! Initialization reads (or bootstraps) the configuration file, checks it for
//! a project uuid and prepares the per-project data directory. The config
//! editor dialog writes the file as raw text; only this load pipeline parses
//! it into [`ProjectOptions`].

use std::path::{Path, PathBuf};

use color_eyre::Result;
use color_eyre::eyre::eyre;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

pub const CONFIG_FILE_NAME: &str = "project.json";

/// Typed view of the JSON configuration. Unknown fields are left alone on
/// disk (the editor round-trips text verbatim) and simply ignored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectOptions {
    pub name: String,
    pub uuid: Option<String>,
    pub version: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Entry point the project runtime starts from, relative to the root
    pub entry: Option<String>,
    pub workers: Option<usize>,
    pub devtools: Option<bool>,
}

/// Snapshot of a successfully initialized project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectState {
    pub root: PathBuf,
    pub config_path: PathBuf,
    pub data_dir: PathBuf,
    pub options: ProjectOptions,
}

/// A project as seen by the app: absent until the first successful init,
/// replaced wholesale on every reload.
#[derive(Debug, Default)]
pub struct ProjectModel {
    pub state: Option<ProjectState>,
}

impl ProjectModel {
    pub async fn init(&mut self, root: impl Into<PathBuf>) -> Result<&ProjectState> {
        let state = load_state(root.into()).await?;
        Ok(self.state.insert(state))
    }
}

/// Full load pipeline. Creates a default config file when none exists yet, so
/// pointing at an empty directory bootstraps a usable project.
pub async fn load_state(root: PathBuf) -> Result<ProjectState> {
    if !root.is_dir() {
        return Err(eyre!("project root is not a directory: {}", root.display()));
    }

    let config_path = root.join(CONFIG_FILE_NAME);
    let options = get_or_create_config(&config_path, &root).await?;

    let uuid = options
        .uuid
        .as_deref()
        .ok_or_else(|| eyre!("configuration has no uuid: {}", config_path.display()))?;

    let data_dir = resolve_data_dir(&options.name, uuid)?;
    if !data_dir.exists() {
        tokio::fs::create_dir_all(&data_dir).await?;
    }

    info!("project '{}' initialized from {}", options.name, root.display());
    Ok(ProjectState { root, config_path, data_dir, options })
}

async fn get_or_create_config(config_path: &Path, root: &Path) -> Result<ProjectOptions> {
    if !config_path.exists() {
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "project".to_string());
        let default = json!({
            "name": name,
            "uuid": uuid::Uuid::new_v4().to_string(),
        });
        tokio::fs::write(config_path, serde_json::to_string_pretty(&default)?).await?;
        info!("created default configuration at {}", config_path.display());
    }

    let content = tokio::fs::read_to_string(config_path).await?;
    let options = serde_json::from_str::<ProjectOptions>(&content)?;
    Ok(options)
}

fn resolve_data_dir(name: &str, uuid: &str) -> Result<PathBuf> {
    let base_dirs = directories::BaseDirs::new()
        .ok_or_else(|| eyre!("platform base directories not available"))?;
    Ok(base_dirs.data_dir().join(format!("{name}.{uuid}")))
}
