use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const CONFIG_FILE: &str = "jcscript.json";

/// Host settings, read from `jcscript.json` in the working directory. Every
/// field is optional in the file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory scanned for image and sound assets.
    pub assets_dir: PathBuf,
    /// Script loaded into the editor at startup.
    pub script: Option<PathBuf>,
    /// Logical canvas size the script draws in.
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// Show lines the parser could not recognize as console warnings.
    pub warn_unrecognized: bool,
    /// Fixed RNG seed for repeatable runs.
    pub seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets"),
            script: None,
            canvas_width: 800.0,
            canvas_height: 600.0,
            warn_unrecognized: false,
            seed: None,
        }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let bytes = std::fs::read(path.as_ref())?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Missing file → defaults; unreadable or malformed file → warning and defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("no {} found, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("config {}: {err}. Falling back to defaults.", path.display());
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: AppConfig = serde_json::from_str(r#"{ "warn_unrecognized": true, "seed": 3 }"#).unwrap();
        assert!(cfg.warn_unrecognized);
        assert_eq!(cfg.seed, Some(3));
        assert_eq!(cfg.canvas_width, 800.0);
        assert_eq!(cfg.assets_dir, PathBuf::from("assets"));
    }

    #[test]
    fn missing_file_is_default() {
        assert_eq!(AppConfig::load_or_default("definitely/not/here.json"), AppConfig::default());
    }

    #[test]
    fn malformed_file_is_default() {
        let path = std::env::temp_dir().join(format!("jcscript-config-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let cfg = AppConfig::load_or_default(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(cfg, AppConfig::default());
    }
}
