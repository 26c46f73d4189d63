//! Configuration for script-templates

use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up in the project root
pub const PROJECT_CONFIG_FILE: &str = "script-templates.yml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the editor's built-in templates
    #[serde(default)]
    pub built_in_dir: Option<PathBuf>,

    /// Editor executable, used to locate the built-in templates
    #[serde(default)]
    pub editor_path: Option<PathBuf>,

    /// Custom template directory, relative paths resolve against the project
    #[serde(default = "default_custom_dir")]
    pub custom_dir: PathBuf,

    /// Glob pattern for template file names
    #[serde(default = "default_pattern")]
    pub pattern: String,
}

fn default_custom_dir() -> PathBuf {
    PathBuf::from(crate::DEFAULT_CUSTOM_DIR)
}

fn default_pattern() -> String {
    crate::TEMPLATE_FILE_PATTERN.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            built_in_dir: None,
            editor_path: None,
            custom_dir: default_custom_dir(),
            pattern: default_pattern(),
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>, project: &Path) -> Result<Self> {
        if let Some(config_path) = path {
            return Self::read(config_path);
        }

        // Try default locations
        let default_paths = [
            Some(project.join(PROJECT_CONFIG_FILE)),
            dirs::config_dir().map(|p| p.join("script-templates").join("config.yml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                return Self::read(path);
            }
        }

        Ok(Config::default())
    }

    fn read(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| eyre!("Failed to read config {}: {}", path.display(), e))?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| eyre!("Failed to parse config {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the built-in template directory
    ///
    /// An explicit `built_in_dir` wins; otherwise the templates live in
    /// `Data/Resources/ScriptTemplates` next to the editor executable.
    pub fn built_in_dir(&self, project: &Path) -> Result<PathBuf> {
        if let Some(dir) = &self.built_in_dir {
            return Ok(resolve(project, dir));
        }

        if let Some(editor) = &self.editor_path {
            let editor = resolve(project, editor);
            let parent = editor
                .parent()
                .ok_or_else(|| eyre!("Editor path has no parent directory: {}", editor.display()))?;
            return Ok(parent.join("Data").join("Resources").join("ScriptTemplates"));
        }

        Err(eyre!(
            "No built-in template directory configured (set built_in_dir or editor_path, or pass --built-in-dir)"
        ))
    }

    /// Resolve the custom template directory
    pub fn custom_dir(&self, project: &Path) -> PathBuf {
        resolve(project, &self.custom_dir)
    }
}

fn resolve(project: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.custom_dir, PathBuf::from("Assets/ScriptTemplates"));
        assert_eq!(config.pattern, "*.txt");
        assert!(config.built_in_dir(Path::new("/project")).is_err());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("built_in_dir: /opt/templates\n").unwrap();
        assert_eq!(config.built_in_dir, Some(PathBuf::from("/opt/templates")));
        assert_eq!(config.custom_dir, PathBuf::from("Assets/ScriptTemplates"));
    }

    #[test]
    fn test_built_in_dir_from_editor_path() {
        let config = Config {
            editor_path: Some(PathBuf::from("/opt/Editor/Unity")),
            ..Default::default()
        };
        assert_eq!(
            config.built_in_dir(Path::new("/project")).unwrap(),
            PathBuf::from("/opt/Editor/Data/Resources/ScriptTemplates")
        );
    }

    #[test]
    fn test_explicit_built_in_dir_wins() {
        let config = Config {
            built_in_dir: Some(PathBuf::from("templates")),
            editor_path: Some(PathBuf::from("/opt/Editor/Unity")),
            ..Default::default()
        };
        assert_eq!(
            config.built_in_dir(Path::new("/project")).unwrap(),
            PathBuf::from("/project/templates")
        );
    }

    #[test]
    fn test_custom_dir_resolution() {
        let config = Config::default();
        assert_eq!(
            config.custom_dir(Path::new("/project")),
            PathBuf::from("/project/Assets/ScriptTemplates")
        );

        let config = Config {
            custom_dir: PathBuf::from("/elsewhere"),
            ..Default::default()
        };
        assert_eq!(config.custom_dir(Path::new("/project")), PathBuf::from("/elsewhere"));
    }

    #[test]
    fn test_load_project_file_and_save() {
        let temp = TempDir::new().unwrap();
        let config = Config {
            built_in_dir: Some(PathBuf::from("/opt/templates")),
            ..Default::default()
        };
        config.save(&temp.path().join(PROJECT_CONFIG_FILE)).unwrap();

        let loaded = Config::load(None, temp.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.yml");
        assert!(Config::load(Some(&missing), temp.path()).is_err());
    }
}
