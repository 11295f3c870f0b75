//! Runtime settings.
//!
//! Layered lowest to highest priority: defaults, an optional JSON settings
//! file, `HAMAWARD_*` environment variables, then command-line flags (applied
//! by the binary). The result decides where the prefix table and award
//! catalog come from.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::awards::AwardCatalog;
use crate::error::Result;
use crate::reference::{CallsignResolver, PrefixTable};

/// Prefix table file looked up in the working directory when none is given
pub const DEFAULT_CTY_FILE: &str = "cty.dat";

pub const ENV_CTY: &str = "HAMAWARD_CTY";
pub const ENV_AWARDS: &str = "HAMAWARD_AWARDS";
pub const ENV_CONDENSED_FALLBACK: &str = "HAMAWARD_CONDENSED_FALLBACK";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Prefix table source; `./cty.dat` when unset
    pub cty_path: Option<PathBuf>,
    /// JSON award catalog replacing the built-in one
    pub awards_path: Option<PathBuf>,
    /// Allow the condensed-line stem scan after a failed prefix lookup
    pub condensed_fallback: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cty_path: None,
            awards_path: None,
            condensed_fallback: true,
        }
    }
}

impl Settings {
    /// Read a JSON settings file; absent keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let settings = serde_json::from_str(&fs::read_to_string(path)?)?;
        log::debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Overlay values from the process environment
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay values from any key → value lookup
    pub fn apply_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_CTY).filter(|v| !v.trim().is_empty()) {
            self.cty_path = Some(PathBuf::from(path.trim()));
        }
        if let Some(path) = lookup(ENV_AWARDS).filter(|v| !v.trim().is_empty()) {
            self.awards_path = Some(PathBuf::from(path.trim()));
        }
        if let Some(raw) = lookup(ENV_CONDENSED_FALLBACK) {
            match parse_flag(&raw) {
                Some(flag) => self.condensed_fallback = flag,
                None => log::warn!("Ignoring {}={:?}: expected true or false", ENV_CONDENSED_FALLBACK, raw),
            }
        }
        self
    }

    /// Where the prefix table is read from
    pub fn cty_source(&self) -> PathBuf {
        self.cty_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CTY_FILE))
    }

    /// Build the resolver; a missing prefix source gives an empty table
    pub fn build_resolver(&self) -> CallsignResolver {
        CallsignResolver::new(PrefixTable::load(&self.cty_source()))
            .with_condensed_fallback(self.condensed_fallback)
    }

    /// The configured award catalog, or the built-in one
    pub fn load_catalog(&self) -> Result<AwardCatalog> {
        match &self.awards_path {
            Some(path) => AwardCatalog::load(path),
            None => Ok(AwardCatalog::builtin()),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
