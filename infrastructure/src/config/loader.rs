//! Configuration file loader with multi-source merging

use super::file_config::{ConfigValidationError, FileConfig};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Project-level config file names, checked in order
const PROJECT_FILES: [&str; 2] = ["boardroom.toml", ".boardroom.toml"];

/// Prefix of environment overrides, e.g. `BOARDROOM_DISCUSSION__DEBATE_TURNS=6`
const ENV_PREFIX: &str = "BOARDROOM_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `BOARDROOM_*` environment variables (`__` separates sections)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./boardroom.toml` or `./.boardroom.toml`
    /// 4. Global: `~/.config/ai-boardroom/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, ConfigValidationError> {
        let global = Self::global_config_path().filter(|p| p.exists());
        let project = Self::project_config_path();

        let explicit = config_path.map(|p| p.as_path());
        let figment = Self::layered(global.as_deref(), project.as_deref(), explicit)
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment
            .extract()
            .map_err(|e| ConfigValidationError::Load(e.to_string()))
    }

    /// File layers only, lowest priority first
    pub(crate) fn layered(
        global: Option<&Path>,
        project: Option<&Path>,
        explicit: Option<&Path>,
    ) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        for path in [global, project, explicit].into_iter().flatten() {
            debug!(path = %path.display(), "Merging config file");
            figment = figment.merge(Toml::file(path));
        }

        figment
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("ai-boardroom").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(config_path: Option<&PathBuf>) {
        println!("Configuration sources (in priority order):");
        println!("  [ENV  ] {}* variables", ENV_PREFIX);

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISS " };
            println!("  [{}] Explicit: {}", mark, path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./boardroom.toml or ./.boardroom.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert!(config.personas.is_empty());
        assert_eq!(config.discussion.debate_turns, 4);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("ai-boardroom"));
    }

    #[test]
    fn test_later_layers_win() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("boardroom.toml");
        let explicit = dir.path().join("explicit.toml");

        fs::write(
            &global,
            "[discussion]\ndebate_turns = 6\nopening_turns = 3\n\n[resilience]\nmax_retries = 5\n",
        )
        .unwrap();
        fs::write(&project, "[discussion]\ndebate_turns = 8\n").unwrap();
        fs::write(&explicit, "[resilience]\nmax_retries = 1\n").unwrap();

        let config: FileConfig =
            ConfigLoader::layered(Some(&global), Some(&project), Some(&explicit))
                .extract()
                .unwrap();

        assert_eq!(config.discussion.debate_turns, 8);
        assert_eq!(config.discussion.opening_turns, 3);
        assert_eq!(config.resilience.max_retries, 1);
        // Untouched values keep their defaults
        assert_eq!(config.discussion.synthesis_turns, 2);
    }

    #[test]
    fn test_bad_value_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[discussion]\ndebate_turns = \"many\"\n").unwrap();

        let err = ConfigLoader::layered(None, None, Some(&path))
            .extract::<FileConfig>()
            .map_err(|e| ConfigValidationError::Load(e.to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigValidationError::Load(_)));
    }
}
