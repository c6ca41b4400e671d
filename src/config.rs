use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use which::which;

use crate::{write_json_atomic, DocsError, DocumentType, Result};

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory holding the document store
    pub data_dir: PathBuf,

    /// Type used by `create` when none is given
    pub default_type: DocumentType,

    /// Maximum number of documents `list` prints when no limit is passed
    pub list_limit: usize,

    /// Default editor command
    pub editor_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".buddydocs"));
        Self {
            data_dir,
            default_type: DocumentType::Document,
            list_limit: 50,
            editor_command: None,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "buddydocs")
}

impl Config {
    /// Default location of the configuration file.
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Loads configuration from `path`, using defaults when the file does not
    /// exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let raw = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw).map_err(|e| DocsError::ConfigError {
            message: format!("Invalid config file {}: {}", path.display(), e),
        })?;
        if !config.default_type.is_known() {
            return Err(DocsError::ConfigError {
                message: "default_type must be one of: document, wiki, list, interactive, fiction"
                    .to_string(),
            });
        }
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| DocsError::ConfigError {
                message: format!("Failed to create {}: {}", parent.display(), e),
            })?;
        }
        write_json_atomic(path, self)?;
        info!("Saved configuration to {}", path.display());
        Ok(())
    }

    // This method provides smart fallbacks when no editor is configured
    pub fn get_editor_command(&self) -> String {
        if let Some(editor) = &self.editor_command {
            return editor.clone();
        }

        if let Ok(editor) = std::env::var("EDITOR") {
            return editor;
        }

        if cfg!(windows) {
            "notepad".to_string()
        } else if cfg!(target_os = "macos") {
            "open -W -t".to_string()
        } else {
            for editor in &["nano", "vim", "vi", "emacs"] {
                if which(editor).is_ok() {
                    return editor.to_string();
                }
            }
            "nano".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"default_type": "wiki", "list_limit": 5}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.default_type, DocumentType::Wiki);
        assert_eq!(config.list_limit, 5);
        assert_eq!(config.data_dir, Config::default().data_dir);
    }

    #[test]
    fn rejects_unknown_default_type() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"default_type": "poem"}"#).unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(DocsError::ConfigError { .. })
        ));
    }

    #[test]
    fn configured_editor_wins() {
        let config = Config {
            editor_command: Some("code --wait".to_string()),
            ..Config::default()
        };
        assert_eq!(config.get_editor_command(), "code --wait");
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            list_limit: 12,
            ..Config::default()
        };

        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
