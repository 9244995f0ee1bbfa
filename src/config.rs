//! Monitor configuration.
//!
//! The configuration is a JSON object keyed by a monitor's EDID hex (its
//! stable identity).  Each value describes where that physical monitor
//! goes and how it is driven, no matter which connector it is plugged into.
//!
//! # Example
//!
//! ```json
//! {
//!   "00ffffffffffff0010acb8a04c4d4a30...": {
//!     "order": 1,
//!     "description": "Dell on the left",
//!     "rotate": "left"
//!   },
//!   "00ffffffffffff001e6d085b01010101...": {
//!     "order": 2,
//!     "description": "LG in the middle",
//!     "resolution": "2560x1440",
//!     "primary": true,
//!     "i3-workspaces": [1, 2, "mail"]
//!   }
//! }
//! ```
//!
//! A missing file is created as `{}` on first run, so the tool can print
//! ready-to-paste entries for every monitor it sees.

use crate::layout::{Resolution, Rotation};
use log::info;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Per-monitor settings, keyed by EDID in [`MonitorConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfigEntry {
    /// Position in the left-to-right order.  Must be unique among the
    /// monitors that are connected at the same time.  Also the default
    /// i3 workspace number for the monitor.
    pub order: u32,
    /// Free text, only for humans.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Mode to use instead of the detected preferred one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate: Option<Rotation>,
    /// Force this monitor to be the primary output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,
    /// i3 workspaces to move onto this monitor.
    #[serde(
        default,
        rename = "i3-workspaces",
        skip_serializing_if = "Option::is_none"
    )]
    pub i3_workspaces: Option<Vec<Workspace>>,
}

impl MonitorConfigEntry {
    /// Minimal entry with only an order.
    pub fn new(order: u32) -> Self {
        Self {
            order,
            description: None,
            resolution: None,
            rotate: None,
            primary: None,
            i3_workspaces: None,
        }
    }
}

/// An i3 workspace identifier.
///
/// Accepts a JSON number (`3`) or string (`"3"`, `"mail"`); it is passed
/// to `workspace number <id>` verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Workspace(pub String);

impl fmt::Display for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u32> for Workspace {
    fn from(n: u32) -> Self {
        Workspace(n.to_string())
    }
}

impl Serialize for Workspace {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.0.parse::<u64>() {
            Ok(n) => serializer.serialize_u64(n),
            Err(_) => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for Workspace {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Visitor;
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = Workspace;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "workspace number or name")
            }
            fn visit_u64<E>(self, n: u64) -> Result<Workspace, E> {
                Ok(Workspace(n.to_string()))
            }
            fn visit_i64<E>(self, n: i64) -> Result<Workspace, E> {
                Ok(Workspace(n.to_string()))
            }
            fn visit_str<E>(self, s: &str) -> Result<Workspace, E>
            where
                E: DeError,
            {
                let s = s.trim();
                if s.is_empty() {
                    return Err(DeError::custom("workspace name must not be empty"));
                }
                Ok(Workspace(s.to_string()))
            }
        }
        deserializer.deserialize_any(V)
    }
}

/// The whole configuration file: EDID → settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonitorConfig {
    monitors: BTreeMap<String, MonitorConfigEntry>,
}

impl MonitorConfig {
    /// Look up the settings for a monitor by EDID.
    pub fn get(&self, edid: &str) -> Option<&MonitorConfigEntry> {
        self.monitors.get(edid)
    }

    pub fn insert(&mut self, edid: impl Into<String>, entry: MonitorConfigEntry) {
        self.monitors.insert(edid.into(), entry);
    }

    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }

    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Like [`load`](Self::load), but first creates an empty `{}` file
    /// (and its parent directories) if nothing exists at `path`.
    pub fn load_or_init(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ConfigError(format!("failed to create {}: {}", parent.display(), e))
                })?;
            }
            std::fs::write(path, "{}")
                .map_err(|e| ConfigError(format!("failed to write {}: {}", path.display(), e)))?;
            info!("created empty config at {}", path.display());
        }
        Self::load(path)
    }
}

/// Ready-to-paste configuration entry for a monitor that has none yet.
pub fn template(edid: &str) -> serde_json::Value {
    serde_json::json!({
        edid: {
            "order": "<Order goes here. E. g. 1, 2, 3>",
            "description": "<Short description of monitor>",
            "resolution": "Optional: Override default resolution. Format WxH",
            "rotate": "Optional, valid are 'left', 'right'",
            "primary": "Optional: true to make this the primary output",
            "i3-workspaces": "List: optional, override which i3 workspaces end up on this monitor",
        }
    })
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
