/*!
# Configuration

Names and constants the standard rules need but cannot discover from the
source: where hooks live, which anchor key introduces the map object, and
the human-readable capability names mapped onto the decomposed reset
routine.
*/

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpliceError};
use crate::extract::{RESET_SELECTION_SLOTS, RESET_UPDATE_ROUTINES};

/// Patch engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpliceConfig {
    /// Expression the rewritten program uses to reach the hook namespace
    pub namespace: String,
    /// Key preceding the map object slot, as in `rxid:abc[12]`
    pub anchor_key: String,
    /// Capability names for the six update routines, in call order
    pub update_capabilities: Vec<String>,
    /// Capability names for the three selection slots, in assignment order
    pub selection_capabilities: Vec<String>,
    /// DOM id of the colour input kept in sync with the picker
    pub colour_input_id: String,
    /// Prefix the output with a statement creating the namespace
    pub declare_namespace: bool,
}

impl Default for SpliceConfig {
    fn default() -> Self {
        Self {
            namespace: "window.kklee".to_string(),
            anchor_key: "rxid".to_string(),
            update_capabilities: [
                "LeftBox",
                "RightBoxBody",
                "Renderer",
                "Warnings",
                "UndoButtons",
                "ModeDropdown",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            selection_capabilities: ["Body", "Spawn", "CapZone"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            colour_input_id: "kkleeColourInput".to_string(),
            declare_namespace: false,
        }
    }
}

impl SpliceConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.namespace.trim().is_empty() {
            return Err(SpliceError::Config("namespace must not be empty".to_string()));
        }
        if !is_identifier(&self.anchor_key) {
            return Err(SpliceError::Config(format!(
                "anchor_key '{}' is not an identifier",
                self.anchor_key
            )));
        }
        if self.colour_input_id.is_empty()
            || self
                .colour_input_id
                .contains(|c: char| matches!(c, '"' | '\\') || c.is_control())
        {
            return Err(SpliceError::Config(format!(
                "colour_input_id '{}' cannot be embedded in a string literal",
                self.colour_input_id
            )));
        }
        check_capabilities("update_capabilities", &self.update_capabilities, RESET_UPDATE_ROUTINES)?;
        check_capabilities(
            "selection_capabilities",
            &self.selection_capabilities,
            RESET_SELECTION_SLOTS,
        )?;
        Ok(())
    }
}

fn check_capabilities(field: &str, names: &[String], expected: usize) -> Result<()> {
    if names.len() != expected {
        return Err(SpliceError::Config(format!(
            "{field} needs exactly {expected} names, got {}",
            names.len()
        )));
    }
    let mut seen = HashSet::new();
    for name in names {
        if !is_identifier(name) {
            return Err(SpliceError::Config(format!(
                "{field}: '{name}' is not an identifier"
            )));
        }
        if !seen.insert(name.as_str()) {
            return Err(SpliceError::Config(format!("{field}: duplicate '{name}'")));
        }
    }
    Ok(())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
