//! Parse options
//!
//! Serializable knobs for the parse pipeline. Missing fields fall back to
//! their defaults, so partial option files are valid.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::markdown::Extension;

/// Options controlling one parse call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Engine extensions to attach, by name
    pub extensions: Vec<String>,
    /// Rewrite nested-list indentation before parsing
    pub normalize_indentation: bool,
    /// Split lists whose items are separated by blank lines
    pub split_loose_lists: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            extensions: Extension::DEFAULT_NAMES
                .iter()
                .map(|name| name.to_string())
                .collect(),
            normalize_indentation: true,
            split_loose_lists: true,
        }
    }
}

impl ParseOptions {
    /// Normalize extension names: trimmed, lower-case, unique, known.
    pub fn sanitize(&mut self) {
        let mut names: Vec<String> = Vec::with_capacity(self.extensions.len());
        for name in &self.extensions {
            let name = name.trim().to_lowercase();
            if Extension::from_name(&name).is_none() {
                warn!("Ignoring unknown markdown extension '{}'", name);
                continue;
            }
            if !names.contains(&name) {
                names.push(name);
            }
        }
        self.extensions = names;
    }

    /// Deserialize from JSON and sanitize.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut options: Self = serde_json::from_str(json)?;
        options.sanitize();
        Ok(options)
    }

    /// Deserialize from TOML and sanitize.
    pub fn from_toml_sanitized(text: &str) -> Result<Self, toml::de::Error> {
        let mut options: Self = toml::from_str(text)?;
        options.sanitize();
        Ok(options)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
