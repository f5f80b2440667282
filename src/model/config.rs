use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("cannot determine home directory")]
    NoHome,
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub editor: EditorConfig,
    pub goto: GotoConfig,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    /// File opened when no path is given on the command line.
    pub scratch_path: String,
    pub auto_save_debounce_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct EditorConfig {
    /// Render a line-number gutter.
    pub line_numbers: bool,
    pub scroll_off: u16,
}

#[derive(Debug, Deserialize)]
pub struct GotoConfig {
    /// Switch the gutter to relative numbers while a goto session is open.
    pub preview_relative_numbers: bool,
}

impl AppConfig {
    /// Load configuration with layering: defaults → user config.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = include_str!("../../config/default.toml");
        let mut config: AppConfig = toml::from_str(defaults)?;

        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "relmotion") {
            let config_path = proj_dirs.config_dir().join("config.toml");
            if config_path.exists() {
                let user_str =
                    fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
                        path: config_path.clone(),
                        source,
                    })?;
                config = toml::from_str(&user_str)?; // TODO: deep merge instead of full replace
            }
        }

        // Expand ~ in scratch_path
        if config.general.scratch_path.starts_with('~') {
            let home = dirs_home().ok_or(ConfigError::NoHome)?;
            config.general.scratch_path =
                config
                    .general
                    .scratch_path
                    .replacen('~', &home.to_string_lossy(), 1);
        }

        Ok(config)
    }

    pub fn scratch_path(&self) -> PathBuf {
        PathBuf::from(&self.general.scratch_path)
    }
}

fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_parse() {
        let config: AppConfig = toml::from_str(include_str!("../../config/default.toml"))
            .expect("default config must parse");

        assert!(config.general.auto_save_debounce_ms > 0);
        assert!(config.editor.scroll_off > 0);
        assert!(config.goto.preview_relative_numbers);
    }

    #[test]
    fn user_config_shape() {
        let config: AppConfig = toml::from_str(
            r#"
            [general]
            scratch_path = "/tmp/scratch.txt"
            auto_save_debounce_ms = 200

            [editor]
            line_numbers = false
            scroll_off = 3

            [goto]
            preview_relative_numbers = false
            "#,
        )
        .unwrap();

        assert_eq!(config.scratch_path(), PathBuf::from("/tmp/scratch.txt"));
        assert!(!config.editor.line_numbers);
        assert!(!config.goto.preview_relative_numbers);
    }

    #[test]
    fn missing_section_is_an_error() {
        let result: Result<AppConfig, _> = toml::from_str("[general]\nscratch_path = \"x\"\n");
        assert!(result.is_err());
    }
}
