//! Demo application configuration, read from `QRVIEW_*` environment variables.
//!
//! | Variable              | Meaning                                  | Default                        |
//! |-----------------------|------------------------------------------|--------------------------------|
//! | `QRVIEW_DATA`         | initial text                             | `https://github.com/emilk/egui` |
//! | `QRVIEW_ICON_PATH`    | image drawn in the middle of the code    | none                           |
//! | `QRVIEW_ECC_LEVEL`    | `L`, `M`, `Q` or `H`                     | `L`                            |
//! | `QRVIEW_ICON_SCALE`   | icon coverage in percent                 | 15                             |
//! | `QRVIEW_QUIET_ZONE`   | quiet zone in modules                    | 0                              |
//! | `QRVIEW_EXPORT_PATH`  | where the Export button writes the PNG   | `qr_code.png`                  |

use qrview_render::config::{DEFAULT_ICON_SCALE, clamp_icon_scale, clamp_quiet_zone};
use qrview_render::{EccLevel, ImageData, RenderConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

const ENV_PREFIX: &str = "QRVIEW_";

const DEFAULT_DATA: &str = "https://github.com/emilk/egui";

const DEFAULT_EXPORT_PATH: &str = "qr_code.png";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid QRVIEW_* environment: {0}")]
    Env(#[from] serde_env::Error),
}

#[derive(Debug, Clone, Copy, Deserialize)]
enum EccSetting {
    #[serde(rename = "L", alias = "l")]
    L,
    #[serde(rename = "M", alias = "m")]
    M,
    #[serde(rename = "Q", alias = "q")]
    Q,
    #[serde(rename = "H", alias = "h")]
    H,
}

impl From<EccSetting> for EccLevel {
    fn from(setting: EccSetting) -> Self {
        match setting {
            EccSetting::L => Self::L,
            EccSetting::M => Self::M,
            EccSetting::Q => Self::Q,
            EccSetting::H => Self::H,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    data: Option<String>,
    icon_path: Option<PathBuf>,
    ecc_level: Option<EccSetting>,
    icon_scale: Option<i32>,
    quiet_zone: Option<i32>,
    export_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    pub data: String,
    pub icon_path: Option<PathBuf>,
    pub ecc_level: EccLevel,
    pub icon_scale: u8,
    pub quiet_zone: u32,
    pub export_path: PathBuf,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            data: DEFAULT_DATA.to_owned(),
            icon_path: None,
            ecc_level: EccLevel::L,
            icon_scale: DEFAULT_ICON_SCALE,
            quiet_zone: 0,
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
        }
    }
}

impl DemoConfig {
    /// Loads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Loads the configuration from `(name, value)` pairs; names without the
    /// `QRVIEW_` prefix are ignored.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let scoped: Vec<(String, String)> = vars
            .into_iter()
            .filter_map(|(key, value)| {
                key.as_ref()
                    .strip_prefix(ENV_PREFIX)
                    .map(|name| (name.to_owned(), value.into()))
            })
            .collect();

        let raw: RawConfig = serde_env::from_iter(scoped)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            data: raw.data.unwrap_or(defaults.data),
            icon_path: raw.icon_path,
            ecc_level: raw.ecc_level.map_or(defaults.ecc_level, EccLevel::from),
            icon_scale: raw
                .icon_scale
                .map_or(defaults.icon_scale, clamp_icon_scale),
            quiet_zone: raw
                .quiet_zone
                .map_or(defaults.quiet_zone, clamp_quiet_zone),
            export_path: raw.export_path.unwrap_or(defaults.export_path),
        }
    }

    /// Reads and decodes the configured icon. Failures are logged and yield `None`.
    pub fn load_icon(&self) -> Option<Arc<ImageData>> {
        let path = self.icon_path.as_deref()?;
        load_icon_file(path)
    }

    /// Initial render configuration for the demo view.
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig::builder()
            .data(self.data.clone())
            .maybe_icon(self.load_icon())
            .icon_scale(self.icon_scale)
            .quiet_zone_size(self.quiet_zone)
            .ecc_level(self.ecc_level)
            .build()
    }
}

pub fn load_icon_file(path: &Path) -> Option<Arc<ImageData>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            log::warn!("Failed to read icon {}: {err}", path.display());
            return None;
        }
    };

    match ImageData::from_encoded(&bytes) {
        Ok(icon) => Some(Arc::new(icon)),
        Err(err) => {
            log::warn!("Failed to decode icon {}: {err}", path.display());
            None
        }
    }
}
