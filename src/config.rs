//! `graticule.toml`: initial camera, engine settings and style overrides.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{GraticuleError, Result};
use crate::grid::config::GraticuleConfig;
use crate::grid::params::{GraticuleType, StyleOverride};
use crate::view::Camera;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub camera: Camera,
    pub graticule: GraticuleConfig,
    /// Applied to every type before the per-type tables.
    pub all_styles: Option<StyleOverride>,
    /// Keyed by type name, e.g. `utm_100km`.
    pub styles: HashMap<String, StyleOverride>,
}

impl Settings {
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let settings: Settings = toml::from_str(text).map_err(|source| GraticuleError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.graticule.validate()?;
        for name in settings.styles.keys() {
            if GraticuleType::from_name(name).is_none() {
                warn!(name = %name, path = %path.display(), "style table names no graticule type");
            }
        }
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| GraticuleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::parse(&text, path)?;
        info!(path = %path.display(), styles = settings.styles.len(), "loaded settings");
        Ok(settings)
    }

    /// Load `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}
