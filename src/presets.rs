//! Named presets of control values, persisted as a JSON document.
//!
//! A "Default" preset always exists. A missing or unreadable file is not an
//! error: the built-in defaults are used instead.

use crate::{
    constants::{CONTROLS, DEFAULT_PRESET},
    error::{Error, Result},
    v4l2::ControlGateway,
};
use log::{debug, info, warn};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

/// Control name -> value
pub type PresetValues = BTreeMap<String, i32>;

/// Preset name -> values
pub type PresetSet = BTreeMap<String, PresetValues>;

/// Factory default for every known control
#[must_use]
pub fn default_values() -> PresetValues {
    CONTROLS
        .iter()
        .map(|spec| (spec.name.to_string(), spec.default))
        .collect()
}

/// `~/.config/meet2ui/presets.json`, or a relative fallback without a config dir
#[must_use]
pub fn default_presets_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("meet2ui"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("presets.json")
}

/// File-backed preset storage
#[derive(Debug, Clone)]
pub struct PresetStore {
    path: PathBuf,
}

impl PresetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all presets. Falls back to `{"Default": defaults}` when the file
    /// is missing or corrupt.
    #[must_use]
    pub fn load(&self) -> PresetSet {
        let mut presets = match fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str::<PresetSet>(&content) {
                Ok(presets) => presets,
                Err(e) => {
                    debug!("Ignoring unreadable presets file {}: {}", self.path.display(), e);
                    PresetSet::new()
                }
            },
            Err(e) => {
                debug!("No presets at {}: {}", self.path.display(), e);
                PresetSet::new()
            }
        };

        presets.entry(DEFAULT_PRESET.to_string()).or_insert_with(default_values);
        presets
    }

    /// Replace the stored document with `presets`
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file written.
    pub fn save_all(&self, presets: &PresetSet) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(presets)?;
        fs::write(&self.path, content)?;
        debug!("Wrote {} preset(s) to {}", presets.len(), self.path.display());
        Ok(())
    }

    /// Create or overwrite one preset
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be written.
    pub fn save_preset(&self, name: &str, values: PresetValues) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::InvalidInput("Preset name must not be empty".to_string()));
        }
        let mut presets = self.load();
        presets.insert(name.to_string(), values);
        self.save_all(&presets)?;
        info!("Saved preset '{}'", name);
        Ok(())
    }

    /// Delete a preset. Deleting an unknown name is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProtectedPreset`] for "Default", or an I/O error if
    /// the document cannot be written.
    pub fn delete_preset(&self, name: &str) -> Result<()> {
        if name == DEFAULT_PRESET {
            return Err(Error::ProtectedPreset(name.to_string()));
        }
        let mut presets = self.load();
        if presets.remove(name).is_none() {
            warn!("Preset '{}' does not exist", name);
            return Ok(());
        }
        self.save_all(&presets)?;
        info!("Deleted preset '{}'", name);
        Ok(())
    }

    #[must_use]
    pub fn get_preset(&self, name: &str) -> Option<PresetValues> {
        self.load().remove(name)
    }

    /// Like [`PresetStore::get_preset`], but reports the available names when
    /// `name` is unknown
    ///
    /// # Errors
    ///
    /// Returns [`Error::PresetNotFound`] when no preset is called `name`.
    pub fn require_preset(&self, name: &str) -> Result<PresetValues> {
        let mut presets = self.load();
        presets.remove(name).ok_or_else(|| Error::PresetNotFound {
            name: name.to_string(),
            available: ordered_names(&presets),
        })
    }

    /// Preset names, "Default" first then alphabetical
    #[must_use]
    pub fn list_names(&self) -> Vec<String> {
        ordered_names(&self.load())
    }
}

impl Default for PresetStore {
    fn default() -> Self {
        Self::new(default_presets_path())
    }
}

/// Result of writing one preset value to the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedValue {
    pub control: String,
    pub value: i32,
    pub ok: bool,
}

/// Write every value of a preset through `gateway`, in control-name order
pub fn apply_preset<G: ControlGateway + ?Sized>(gateway: &mut G, values: &PresetValues) -> Vec<AppliedValue> {
    values
        .iter()
        .map(|(control, &value)| AppliedValue {
            control: control.clone(),
            value,
            ok: gateway.set(control, value),
        })
        .collect()
}

fn ordered_names(presets: &PresetSet) -> Vec<String> {
    let mut names: Vec<String> = presets
        .keys()
        .filter(|name| name.as_str() != DEFAULT_PRESET)
        .cloned()
        .collect();
    if presets.contains_key(DEFAULT_PRESET) {
        names.insert(0, DEFAULT_PRESET.to_string());
    }
    names
}
