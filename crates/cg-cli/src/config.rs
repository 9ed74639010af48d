//! Configuration loading and management.

use std::path::{Path, PathBuf};

use cg_core::InferenceMode;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory for graphs written under their default name.
    /// The current directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Compare event pairs on all cores.
    pub parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: None,
            parallel: true,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (CG_*)
        figment = figment.merge(Env::prefixed("CG_"));

        figment.extract()
    }

    pub const fn inference_mode(&self) -> InferenceMode {
        if self.parallel {
            InferenceMode::Parallel
        } else {
            InferenceMode::Sequential
        }
    }
}

/// Returns the platform-specific config directory for cg.
///
/// On Linux: `~/.config/cg`
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("cg"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_parallel_into_cwd() {
        let config = Config::default();
        assert!(config.output_dir.is_none());
        assert_eq!(config.inference_mode(), InferenceMode::Parallel);
    }

    #[test]
    fn test_sequential_when_parallel_disabled() {
        let config = Config {
            parallel: false,
            ..Config::default()
        };
        assert_eq!(config.inference_mode(), InferenceMode::Sequential);
    }

    #[test]
    fn test_dirs_config_path_ends_with_cg() {
        if let Some(path) = dirs_config_path() {
            assert_eq!(path.file_name().unwrap(), "cg");
        }
    }

    #[test]
    fn test_explicit_config_file_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("cg.toml", "output_dir = \"graphs\"\nparallel = false\n")?;

            let config = Config::load_from(Some(Path::new("cg.toml")))?;
            assert_eq!(config.output_dir, Some(PathBuf::from("graphs")));
            assert!(!config.parallel);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_config_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("cg.toml", "parallel = false\n")?;
            jail.set_env("CG_PARALLEL", "true");
            jail.set_env("CG_OUTPUT_DIR", "out");

            let config = Config::load_from(Some(Path::new("cg.toml")))?;
            assert!(config.parallel);
            assert_eq!(config.output_dir, Some(PathBuf::from("out")));
            Ok(())
        });
    }
}
