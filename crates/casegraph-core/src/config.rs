//! Configuration loading.
//!
//! Sources, highest precedence first: `--db` flag, `CASEGRAPH_DB`, project
//! file `./casegraph.toml`, user file `<config dir>/casegraph/config.toml`,
//! then the default `cases.db` in the working directory.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::CaseError;

/// Default database file name, relative to the working directory.
pub const DEFAULT_DB_FILE: &str = "cases.db";

/// Environment variable overriding the database path.
pub const DB_ENV_VAR: &str = "CASEGRAPH_DB";

/// Project-level config file name.
pub const PROJECT_CONFIG_FILE: &str = "casegraph.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database path. Relative paths are resolved against the directory that
    /// holds the config file: the project root for `casegraph.toml`, the user
    /// config directory for the user file.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Shape shared by the project and user config files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub store: StoreConfig,
    /// Preferred output mode: `pretty`, `text` or `json`.
    #[serde(default)]
    pub output: Option<String>,
}

/// Where the database path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DbPathSource {
    Flag,
    Env,
    Project,
    User,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveConfig {
    pub db_path: PathBuf,
    pub db_source: DbPathSource,
    /// Normalized output mode from config files, if any.
    pub output: Option<String>,
}

fn read_config_file(path: &Path) -> Result<Option<FileConfig>, CaseError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|e| CaseError::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    toml::from_str::<FileConfig>(&content)
        .map(Some)
        .map_err(|e| CaseError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Load `casegraph.toml` from `project_root`, if present.
///
/// # Errors
///
/// Returns [`CaseError::Config`] if the file exists but cannot be read or
/// parsed.
pub fn load_project_config(project_root: &Path) -> Result<FileConfig, CaseError> {
    Ok(read_config_file(&project_root.join(PROJECT_CONFIG_FILE))?.unwrap_or_default())
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("casegraph/config.toml"))
}

/// Resolve the effective configuration for a run rooted at `project_root`.
///
/// The user config file is only read when the project file leaves the
/// database path or output mode open. A user file that cannot be parsed is
/// fatal only when its `store.path` would decide the database; otherwise it
/// is skipped with a warning.
///
/// # Errors
///
/// Returns [`CaseError::Config`] if a config file that decides the result is
/// malformed, or names an unknown output mode.
pub fn resolve_config(
    project_root: &Path,
    cli_db: Option<&Path>,
) -> Result<EffectiveConfig, CaseError> {
    let env_db = env::var_os(DB_ENV_VAR).map(PathBuf::from);
    resolve_config_inner(
        project_root,
        cli_db,
        env_db.as_deref(),
        user_config_path().as_deref(),
    )
}

fn resolve_config_inner(
    project_root: &Path,
    cli_db: Option<&Path>,
    env_db: Option<&Path>,
    user_file: Option<&Path>,
) -> Result<EffectiveConfig, CaseError> {
    let project = load_project_config(project_root)?;

    let db_settled = [cli_db, env_db, project.store.path.as_deref()]
        .into_iter()
        .flatten()
        .any(|p| !p.as_os_str().is_empty());
    let user = match user_file {
        Some(path) if !db_settled => read_config_file(path)?.unwrap_or_default(),
        Some(path) if project.output.is_none() => match read_config_file(path) {
            Ok(cfg) => cfg.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(%err, "ignoring unreadable user config");
                FileConfig::default()
            }
        },
        _ => FileConfig::default(),
    };
    let user_dir = user_file.and_then(Path::parent);

    let (db_path, db_source) = resolve_db_path(
        project_root,
        cli_db,
        env_db,
        project.store.path.as_deref(),
        user.store.path.as_deref().map(|p| (p, user_dir.unwrap_or(project_root))),
    );

    let output = project
        .output
        .map(|raw| (raw, project_root.join(PROJECT_CONFIG_FILE)))
        .or_else(|| {
            user.output
                .map(|raw| (raw, user_file.map(Path::to_path_buf).unwrap_or_default()))
        })
        .map(|(raw, path)| {
            normalize_output_mode(&raw)
                .map(str::to_string)
                .ok_or_else(|| CaseError::Config {
                    path,
                    message: format!(
                        "unknown output mode '{raw}' (expected pretty, text, or json)"
                    ),
                })
        })
        .transpose()?;

    tracing::debug!(db = %db_path.display(), source = ?db_source, "resolved config");
    Ok(EffectiveConfig {
        db_path,
        db_source,
        output,
    })
}

fn resolve_db_path(
    project_root: &Path,
    cli_db: Option<&Path>,
    env_db: Option<&Path>,
    project_db: Option<&Path>,
    user_db: Option<(&Path, &Path)>,
) -> (PathBuf, DbPathSource) {
    let candidates = [
        (cli_db.map(|p| (p, project_root)), DbPathSource::Flag),
        (env_db.map(|p| (p, project_root)), DbPathSource::Env),
        (project_db.map(|p| (p, project_root)), DbPathSource::Project),
        (user_db, DbPathSource::User),
    ];
    for (candidate, source) in candidates {
        if let Some((path, base)) = candidate.filter(|(p, _)| !p.as_os_str().is_empty()) {
            return (base.join(path), source);
        }
    }
    (project_root.join(DEFAULT_DB_FILE), DbPathSource::Default)
}

fn normalize_output_mode(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pretty" | "human" => Some("pretty"),
        "text" | "table" => Some("text"),
        "json" => Some("json"),
        _ => None,
    }
}
