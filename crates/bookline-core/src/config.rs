//! TOML-based engine configuration.
//!
//! Covers the tunables of the scheduling engine: default reminder offset,
//! follow-up derivation offset, audit trail capacity, and the delete-undo
//! buffer size. Missing files fall back to defaults; unknown keys are
//! tolerated so older configs keep loading.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::diagnostics::DEFAULT_AUDIT_CAPACITY;
use crate::error::ConfigError;
use crate::followup::DEFAULT_FOLLOW_UP_OFFSET_DAYS;
use crate::lifecycle::DEFAULT_UNDO_CAPACITY;

/// Reminder defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Applied to items created without an explicit offset.
    #[serde(default)]
    pub default_offset_min: i64,
}

/// Follow-up derivation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpConfig {
    #[serde(default = "default_follow_up_offset_days")]
    pub offset_days: i64,
}

/// Diagnostics settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    #[serde(default = "default_audit_capacity")]
    pub audit_capacity: usize,
}

/// Delete-undo buffer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoConfig {
    #[serde(default = "default_undo_capacity")]
    pub capacity: usize,
}

/// Engine configuration, serialized to/from TOML.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub reminders: ReminderConfig,
    #[serde(default)]
    pub follow_up: FollowUpConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    #[serde(default)]
    pub undo: UndoConfig,
}

fn default_follow_up_offset_days() -> i64 {
    DEFAULT_FOLLOW_UP_OFFSET_DAYS
}
fn default_audit_capacity() -> usize {
    DEFAULT_AUDIT_CAPACITY
}
fn default_undo_capacity() -> usize {
    DEFAULT_UNDO_CAPACITY
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            default_offset_min: 0,
        }
    }
}

impl Default for FollowUpConfig {
    fn default() -> Self {
        Self {
            offset_days: default_follow_up_offset_days(),
        }
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            audit_capacity: default_audit_capacity(),
        }
    }
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            capacity: default_undo_capacity(),
        }
    }
}

impl EngineConfig {
    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Write as pretty TOML.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
