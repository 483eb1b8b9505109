//! Graphics engine configuration
//!
//! Settings come from (highest precedence first) environment variables, a
//! configuration file, and built-in defaults.

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Main graphics configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GraphicsConfig {
    /// Fallback display information
    #[serde(default)]
    pub display: DisplayConfig,
    /// Event queue and callback policy
    #[serde(default)]
    pub events: EventsConfig,
    /// Handle allocation
    #[serde(default)]
    pub handles: HandlesConfig,
    /// Fallback text measurement
    #[serde(default)]
    pub text: TextConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Screen properties used when the toolkit cannot report them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_dpi")]
    pub dpi: f64,
    #[serde(default = "default_screen_width")]
    pub screen_width: f64,
    #[serde(default = "default_screen_height")]
    pub screen_height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Callback names that run even while a non-interruptible callback is
    /// executing
    #[serde(default = "default_always_drain")]
    pub always_drain: Vec<String>,
    /// Additional always-drain names for figure objects
    #[serde(default = "default_figure_always_drain")]
    pub figure_always_drain: Vec<String>,
    /// `waitfor` polling interval in milliseconds
    #[serde(default = "default_poll_ms")]
    pub waitfor_poll_ms: u64,
    /// Smallest accepted `waitfor` timeout in seconds
    #[serde(default = "default_min_timeout")]
    pub waitfor_min_timeout: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HandlesConfig {
    /// Seed for the non-figure handle jitter; random when unset
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextConfig {
    /// Character width as a multiple of the font size in pixels
    #[serde(default = "default_char_width")]
    pub char_width_factor: f64,
    /// Line height as a multiple of the font size in pixels
    #[serde(default = "default_line_height")]
    pub line_height_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when no environment filter is set
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Forward records to the installed diagnostics hook
    #[serde(default = "default_true")]
    pub diagnostics: bool,
}

fn default_dpi() -> f64 {
    96.0
}

fn default_screen_width() -> f64 {
    1920.0
}

fn default_screen_height() -> f64 {
    1080.0
}

fn default_always_drain() -> Vec<String> {
    vec!["deletefcn".to_string(), "createfcn".to_string()]
}

fn default_figure_always_drain() -> Vec<String> {
    vec!["closerequestfcn".to_string(), "resizefcn".to_string()]
}

fn default_poll_ms() -> u64 {
    100
}

fn default_min_timeout() -> f64 {
    1.0
}

fn default_char_width() -> f64 {
    0.6
}

fn default_line_height() -> f64 {
    1.2
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            dpi: default_dpi(),
            screen_width: default_screen_width(),
            screen_height: default_screen_height(),
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            always_drain: default_always_drain(),
            figure_always_drain: default_figure_always_drain(),
            waitfor_poll_ms: default_poll_ms(),
            waitfor_min_timeout: default_min_timeout(),
        }
    }
}

impl EventsConfig {
    /// Whether callback `name` bypasses the busy check.
    pub fn is_always_drain(&self, name: &str, is_figure: bool) -> bool {
        let hit = |list: &[String]| list.iter().any(|n| n.eq_ignore_ascii_case(name));
        hit(&self.always_drain) || (is_figure && hit(&self.figure_always_drain))
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            char_width_factor: default_char_width(),
            line_height_factor: default_line_height(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            diagnostics: true,
        }
    }
}

/// Configuration loader with multiple source support
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper precedence
    pub fn load() -> Result<GraphicsConfig> {
        let mut config = Self::load_from_files()?;
        Self::apply_environment_variables(&mut config)?;
        Ok(config)
    }

    fn load_from_files() -> Result<GraphicsConfig> {
        for path in Self::find_config_files() {
            if path.is_dir() {
                info!(
                    "Ignoring config directory path (expected file): {}",
                    path.display()
                );
                continue;
            }
            if path.exists() {
                info!("Loading graphics configuration from: {}", path.display());
                return Self::load_from_file(&path);
            }
        }

        debug!("No graphics configuration file found, using defaults");
        Ok(GraphicsConfig::default())
    }

    fn find_config_files() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(config_path) = env::var("RUNMAT_GRAPHICS_CONFIG") {
            paths.push(PathBuf::from(config_path));
        }

        if let Ok(current_dir) = env::current_dir() {
            for name in [
                ".runmat-graphics.yaml",
                ".runmat-graphics.yml",
                ".runmat-graphics.json",
                ".runmat-graphics.toml",
            ] {
                paths.push(current_dir.join(name));
            }
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".config/runmat/graphics.yaml"));
            paths.push(home_dir.join(".config/runmat/graphics.json"));
            paths.push(home_dir.join(".config/runmat/graphics.toml"));
        }

        paths
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<GraphicsConfig> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?,
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?,
            Some("toml") => toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?,
            _ => {
                if let Ok(config) = toml::from_str(&content) {
                    config
                } else if let Ok(config) = serde_yaml::from_str(&content) {
                    config
                } else {
                    return Err(anyhow::anyhow!(
                        "Could not parse config file {} (tried TOML, YAML)",
                        path.display()
                    ));
                }
            }
        };

        Ok(config)
    }

    fn apply_environment_variables(config: &mut GraphicsConfig) -> Result<()> {
        if let Ok(dpi) = env::var("RUNMAT_GRAPHICS_DPI") {
            config.display.dpi = dpi
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|d| *d > 0.0)
                .with_context(|| format!("Invalid RUNMAT_GRAPHICS_DPI value: {dpi}"))?;
        }

        if let Ok(size) = env::var("RUNMAT_GRAPHICS_SCREEN_SIZE") {
            let (w, h) = parse_size(&size)
                .with_context(|| format!("Invalid RUNMAT_GRAPHICS_SCREEN_SIZE value: {size}"))?;
            config.display.screen_width = w;
            config.display.screen_height = h;
        }

        if let Ok(poll) = env::var("RUNMAT_GRAPHICS_WAITFOR_POLL_MS") {
            if let Ok(poll) = poll.trim().parse() {
                config.events.waitfor_poll_ms = poll;
            }
        }

        if let Ok(seed) = env::var("RUNMAT_GRAPHICS_HANDLE_SEED") {
            config.handles.seed = seed.trim().parse().ok();
        }

        if let Ok(level) = env::var("RUNMAT_GRAPHICS_LOG") {
            if !level.trim().is_empty() {
                config.logging.level = level;
            }
        }

        Ok(())
    }

    /// Save configuration to a file
    pub fn save_to_file(config: &GraphicsConfig, path: &Path) -> Result<()> {
        let content = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::to_string_pretty(config)
                .context("Failed to serialize config to JSON")?,
            Some("toml") => {
                toml::to_string_pretty(config).context("Failed to serialize config to TOML")?
            }
            _ => serde_yaml::to_string(config).context("Failed to serialize config to YAML")?,
        };

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        info!("Graphics configuration saved to: {}", path.display());
        Ok(())
    }
}

/// Parse `"WIDTHxHEIGHT"` (or a comma separated pair).
fn parse_size(s: &str) -> Option<(f64, f64)> {
    let (w, h) = s.trim().split_once(['x', 'X', ','])?;
    let w: f64 = w.trim().parse().ok()?;
    let h: f64 = h.trim().parse().ok()?;
    (w > 0.0 && h > 0.0).then_some((w, h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use std::sync::Mutex;
    use tempfile::TempDir;

    static ENV_GUARD: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    #[test]
    fn test_config_defaults() {
        let config = GraphicsConfig::default();
        assert_eq!(config.display.dpi, 96.0);
        assert_eq!(config.events.waitfor_poll_ms, 100);
        assert!(config.events.is_always_drain("DeleteFcn", false));
        assert!(!config.events.is_always_drain("resizefcn", false));
        assert!(config.events.is_always_drain("resizefcn", true));
        assert!(config.handles.seed.is_none());
    }

    #[test]
    fn partial_files_fill_defaults() {
        let parsed: GraphicsConfig = serde_yaml::from_str("display:\n  dpi: 120\n").unwrap();
        assert_eq!(parsed.display.dpi, 120.0);
        assert_eq!(parsed.display.screen_width, 1920.0);
        assert_eq!(parsed.events, EventsConfig::default());
    }

    #[test]
    fn test_file_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = GraphicsConfig::default();
        config.handles.seed = Some(7);
        config.events.always_drain.push("buttondownfcn".into());

        for name in ["graphics.yaml", "graphics.json", "graphics.toml"] {
            let path = temp_dir.path().join(name);
            ConfigLoader::save_to_file(&config, &path).unwrap();
            let loaded = ConfigLoader::load_from_file(&path).unwrap();
            assert_eq!(loaded, config, "{name}");
        }
    }

    #[test]
    fn unreadable_file_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.yaml");
        let err = ConfigLoader::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("missing.yaml"));
    }

    #[test]
    fn environment_overrides() {
        let _lock = ENV_GUARD.lock().unwrap();
        std::env::set_var("RUNMAT_GRAPHICS_DPI", "144");
        std::env::set_var("RUNMAT_GRAPHICS_SCREEN_SIZE", "2560x1440");
        std::env::set_var("RUNMAT_GRAPHICS_HANDLE_SEED", "42");
        let mut config = GraphicsConfig::default();
        ConfigLoader::apply_environment_variables(&mut config).unwrap();
        assert_eq!(config.display.dpi, 144.0);
        assert_eq!(config.display.screen_width, 2560.0);
        assert_eq!(config.display.screen_height, 1440.0);
        assert_eq!(config.handles.seed, Some(42));

        std::env::set_var("RUNMAT_GRAPHICS_DPI", "-3");
        assert!(ConfigLoader::apply_environment_variables(&mut config).is_err());
        std::env::remove_var("RUNMAT_GRAPHICS_DPI");
        std::env::remove_var("RUNMAT_GRAPHICS_SCREEN_SIZE");
        std::env::remove_var("RUNMAT_GRAPHICS_HANDLE_SEED");
    }

    #[test]
    fn size_parsing() {
        assert_eq!(parse_size("800x600"), Some((800.0, 600.0)));
        assert_eq!(parse_size(" 800 , 600 "), Some((800.0, 600.0)));
        assert_eq!(parse_size("800"), None);
        assert_eq!(parse_size("0x600"), None);
    }
}
