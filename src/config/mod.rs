use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplashConfig {
    /// Text shown in the bouncing logo
    #[serde(default = "SplashConfig::default_text")]
    pub text: String,

    /// Delay between frames in milliseconds
    #[serde(default = "SplashConfig::default_frame_ms")]
    pub frame_ms: u64,

    /// Cells moved per frame on each axis
    #[serde(default = "SplashConfig::default_speed")]
    pub speed: u16,
}

impl SplashConfig {
    fn default_text() -> String {
        "DVD".to_string()
    }

    fn default_frame_ms() -> u64 {
        30
    }

    fn default_speed() -> u16 {
        1
    }
}

impl Default for SplashConfig {
    fn default() -> Self {
        Self {
            text: Self::default_text(),
            frame_ms: Self::default_frame_ms(),
            speed: Self::default_speed(),
        }
    }
}

/// Optional colour overrides, as `#RRGGBB` or `#RGB`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub danger: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Catalogue database file (defaults to the user data dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// Play the bouncing-logo splash on startup
    #[serde(default = "default_true")]
    pub show_splash: bool,

    /// Desktop notifications after add/update/delete
    #[serde(default)]
    pub notifications: bool,

    #[serde(default)]
    pub splash: SplashConfig,

    #[serde(default)]
    pub theme: ThemeConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            show_splash: true,
            notifications: false,
            splash: SplashConfig::default(),
            theme: ThemeConfig::default(),
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("manuals");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = match Self::config_path() {
            Ok(p) => p,
            Err(_) => return Ok(AppConfig::default()),
        };

        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return Ok(config),
                    Err(e) => tracing::warn!("Failed to parse config: {}", e),
                },
                Err(e) => tracing::warn!("Failed to read config: {}", e),
            }
            // Keep a broken file for the user to fix
            return Ok(AppConfig::default());
        }

        let config = AppConfig::default();
        if let Err(e) = config.save() {
            tracing::warn!("Could not write default config: {}", e);
        }
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Where the catalogue lives: configured path, else `<data dir>/manuals/manuals.db`
    pub fn database_path(&self) -> PathBuf {
        if let Some(path) = &self.database_path {
            return path.clone();
        }
        dirs::data_dir()
            .map(|d| d.join("manuals"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("manuals.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig {
            database_path: Some(PathBuf::from("/tmp/catalogue.db")),
            show_splash: false,
            notifications: true,
            splash: SplashConfig {
                text: "MANUALS".to_string(),
                frame_ms: 15,
                speed: 2,
            },
            theme: ThemeConfig {
                accent: Some("#FFA500".to_string()),
                ..Default::default()
            },
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.show_splash);
        assert_eq!(config.splash.text, "DVD");
    }

    #[test]
    fn test_partial_splash_section() {
        let config: AppConfig = toml::from_str("[splash]\nspeed = 3\n").unwrap();
        assert_eq!(config.splash.speed, 3);
        assert_eq!(config.splash.frame_ms, 30);
    }

    #[test]
    fn test_database_path_override() {
        let config = AppConfig {
            database_path: Some(PathBuf::from("here.db")),
            ..Default::default()
        };
        assert_eq!(config.database_path(), PathBuf::from("here.db"));

        let default_path = AppConfig::default().database_path();
        assert!(default_path.ends_with("manuals.db"));
    }
}
