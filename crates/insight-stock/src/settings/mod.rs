//! Persisted user settings gating narrative generation

pub mod store;

pub use store::{FileStore, KeyValueStore, MemoryStore};

use crate::error::{Result, StockError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Storage key of the settings blob
pub const SETTINGS_KEY: &str = "insight.analysis-settings.v1";

/// Text-generation models the backend accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModelId {
    #[default]
    #[serde(rename = "llama-3.1-8b-instant")]
    Llama31_8bInstant,
    #[serde(rename = "llama-3.1-70b-versatile")]
    Llama31_70bVersatile,
    #[serde(rename = "deepseek-r1-distill-llama-70b")]
    DeepseekR1DistillLlama70b,
}

impl ModelId {
    /// All models, default first
    pub const ALL: [ModelId; 3] = [
        ModelId::Llama31_8bInstant,
        ModelId::Llama31_70bVersatile,
        ModelId::DeepseekR1DistillLlama70b,
    ];

    /// Wire identifier sent to the backend
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Llama31_8bInstant => "llama-3.1-8b-instant",
            Self::Llama31_70bVersatile => "llama-3.1-70b-versatile",
            Self::DeepseekR1DistillLlama70b => "deepseek-r1-distill-llama-70b",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Llama31_8bInstant => "Llama 3.1 8B Instant",
            Self::Llama31_70bVersatile => "Llama 3.1 70B Versatile",
            Self::DeepseekR1DistillLlama70b => "DeepSeek R1 Distill Llama 70B",
        }
    }

    /// Look up a model by its wire identifier
    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|model| model.as_str() == id.trim())
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ModelId {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| {
            let known: Vec<&str> = Self::ALL.iter().map(|m| m.as_str()).collect();
            StockError::Config(format!("unknown model '{s}', expected one of: {}", known.join(", ")))
        })
    }
}

/// User settings for an analysis run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnalysisSettings {
    #[serde(rename = "aiEnabled")]
    pub ai_enabled: bool,
    #[serde(rename = "selectedModel")]
    pub selected_model: ModelId,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            ai_enabled: true,
            selected_model: ModelId::ALL[0],
        }
    }
}

impl AnalysisSettings {
    /// Model to request a narrative with, `None` when generation is off
    pub fn narrative_model(&self) -> Option<ModelId> {
        self.ai_enabled.then_some(self.selected_model)
    }
}

/// Persisted shape; each field is validated separately
#[derive(Debug, Deserialize)]
struct StoredSettings {
    #[serde(rename = "aiEnabled", default)]
    ai_enabled: Option<bool>,
    #[serde(rename = "selectedModel", default)]
    selected_model: Option<String>,
}

impl From<StoredSettings> for AnalysisSettings {
    fn from(stored: StoredSettings) -> Self {
        let defaults = AnalysisSettings::default();
        Self {
            ai_enabled: stored.ai_enabled.unwrap_or(defaults.ai_enabled),
            selected_model: stored
                .selected_model
                .as_deref()
                .and_then(ModelId::parse)
                .unwrap_or(defaults.selected_model),
        }
    }
}

/// Reads and writes `AnalysisSettings` through a key-value store
#[derive(Clone)]
pub struct SettingsResolver {
    store: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for SettingsResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsResolver").finish_non_exhaustive()
    }
}

impl SettingsResolver {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Resolver over an empty in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Load settings; any read or parse problem yields the defaults
    pub fn load_settings(&self) -> AnalysisSettings {
        let raw = match self.store.get(SETTINGS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No saved settings, using defaults");
                return AnalysisSettings::default();
            }
            Err(e) => {
                warn!(error = %e, "Failed to read settings, using defaults");
                return AnalysisSettings::default();
            }
        };

        match serde_json::from_str::<StoredSettings>(&raw) {
            Ok(stored) => AnalysisSettings::from(stored),
            Err(e) => {
                warn!(error = %e, "Saved settings are malformed, using defaults");
                AnalysisSettings::default()
            }
        }
    }

    /// Persist settings. Failures are logged and returned for the caller to report
    pub fn save_settings(&self, settings: &AnalysisSettings) -> Result<()> {
        let result = serde_json::to_string(settings)
            .map_err(StockError::from)
            .and_then(|blob| self.store.set(SETTINGS_KEY, &blob));

        if let Err(e) = &result {
            warn!(error = %e, "Failed to save settings");
        }
        result
    }

    /// Forget saved settings so the defaults apply again
    pub fn reset(&self) -> Result<()> {
        self.store.remove(SETTINGS_KEY)
    }
}
