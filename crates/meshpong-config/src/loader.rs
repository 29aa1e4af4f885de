use std::path::{Path, PathBuf};

use crate::schema::{ConfigWarning, MeshpongConfig, WarningSeverity};

/// Loads the meshpong configuration.
#[derive(Debug)]
pub struct ConfigLoader {
    config: MeshpongConfig,
    config_path: PathBuf,
    warnings: Vec<ConfigWarning>,
}

impl ConfigLoader {
    /// Resolve the config path: explicit path > MESHPONG_CONFIG env > ~/.meshpong/meshpong.toml
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("MESHPONG_CONFIG") {
            return PathBuf::from(p);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".meshpong")
            .join("meshpong.toml")
    }

    /// Load the config from disk, falling back to defaults.
    ///
    /// Nothing is logged here: the loader runs before logging is set up, so
    /// notices are kept for the caller to report via [`Self::warnings`].
    pub fn load(path: Option<&Path>) -> meshpong_core::Result<Self> {
        let config_path = Self::resolve_path(path);
        let mut warnings = Vec::new();
        let config = if config_path.exists() {
            let raw = std::fs::read_to_string(&config_path)?;
            Self::parse(&raw).map_err(|e| {
                meshpong_core::MeshpongError::Config(format!(
                    "failed to parse {}: {}",
                    config_path.display(),
                    e
                ))
            })?
        } else {
            warnings.push(ConfigWarning {
                field: "config".into(),
                message: format!("{} not found, using defaults", config_path.display()),
                severity: WarningSeverity::Info,
                hint: None,
            });
            MeshpongConfig::default()
        };

        let (config, ignored) = Self::apply_overrides(config, |key| std::env::var(key).ok());
        warnings.extend(ignored);

        // Validate config: keep warnings, fail on errors
        warnings.extend(config.validate().map_err(meshpong_core::MeshpongError::Config)?);

        Ok(Self {
            config,
            config_path,
            warnings,
        })
    }

    /// Parse a `meshpong.toml` document.
    pub fn parse(raw: &str) -> Result<MeshpongConfig, toml::de::Error> {
        toml::from_str::<MeshpongConfig>(raw)
    }

    /// Get a copy of the loaded config.
    pub fn get(&self) -> MeshpongConfig {
        self.config.clone()
    }

    /// Path the config was resolved to (it may not exist).
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Notices gathered while loading: missing file, ignored env overrides
    /// and non-fatal validation warnings.
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }

    /// Apply overrides (MESHPONG_LOG_LEVEL, MESHPONG_HANDLE_COUNT, etc.)
    /// read through `lookup`. Unparseable values are ignored and reported
    /// in the returned warnings.
    pub fn apply_overrides(
        mut config: MeshpongConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> (MeshpongConfig, Vec<ConfigWarning>) {
        let mut ignored = Vec::new();
        let mut ignore = |key: &str, value: &str, error: String| {
            ignored.push(ConfigWarning {
                field: key.into(),
                message: format!("ignoring '{value}': {error}"),
                severity: WarningSeverity::Warning,
                hint: None,
            });
        };

        if let Some(v) = lookup("MESHPONG_LOG_LEVEL") {
            config.logging.level = v;
        }
        if let Some(v) = lookup("MESHPONG_HANDLE_COUNT") {
            match v.parse::<u8>() {
                Ok(count) => config.mesh.handle_count = count,
                Err(e) => ignore("MESHPONG_HANDLE_COUNT", &v, e.to_string()),
            }
        }
        if let Some(v) = lookup("MESHPONG_DEVICE_ADDRESS") {
            match v.parse() {
                Ok(addr) => config.node.address = Some(addr),
                Err(e) => ignore("MESHPONG_DEVICE_ADDRESS", &v, format!("{e}")),
            }
        }
        if let Some(v) = lookup("MESHPONG_STRICT_COMMANDS") {
            match v.parse::<bool>() {
                Ok(strict) => config.command.strict = strict,
                Err(e) => ignore("MESHPONG_STRICT_COMMANDS", &v, e.to_string()),
            }
        }
        (config, ignored)
    }
}
