// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Detection configuration system

use crate::intersect::DEFAULT_CUTOFF;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// File picked up by [`DetectionConfig::load`] from the working directory
pub const CONFIG_FILE: &str = "meshcheck.toml";

/// Predicate implementation used by the narrow phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KernelKind {
    /// Filtered exact predicates
    #[default]
    Exact,
    /// Plain floating-point predicates
    Float,
}

impl FromStr for KernelKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exact" => Ok(KernelKind::Exact),
            "float" | "floating" => Ok(KernelKind::Float),
            other => Err(format!("unknown kernel '{other}', expected 'exact' or 'float'")),
        }
    }
}

impl fmt::Display for KernelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelKind::Exact => write!(f, "exact"),
            KernelKind::Float => write!(f, "float"),
        }
    }
}

/// Detection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Box count from which the broad phase runs in parallel
    pub cutoff: usize,
    pub kernel: KernelKind,
    /// Worker threads for the parallel broad phase, rayon's default when unset
    pub threads: Option<usize>,
    /// Maximum number of pairs printed by the CLI
    pub report_limit: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_CUTOFF,
            kernel: KernelKind::Exact,
            threads: None,
            report_limit: 20,
        }
    }
}

impl DetectionConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: DetectionConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load `meshcheck.toml` if present, then apply environment overrides
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load an explicit file (or `meshcheck.toml` if present), then apply
    /// environment overrides
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(CONFIG_FILE).exists() => Self::from_file(CONFIG_FILE)?,
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `MESHCHECK_CUTOFF`, `MESHCHECK_KERNEL` and `MESHCHECK_THREADS`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(cutoff) = lookup("MESHCHECK_CUTOFF") {
            self.cutoff = cutoff
                .trim()
                .parse()
                .with_context(|| format!("Invalid MESHCHECK_CUTOFF: {cutoff:?}"))?;
        }

        if let Some(kernel) = lookup("MESHCHECK_KERNEL") {
            self.kernel = match kernel.parse() {
                Ok(kind) => kind,
                Err(message) => bail!("Invalid MESHCHECK_KERNEL: {message}"),
            };
        }

        if let Some(threads) = lookup("MESHCHECK_THREADS") {
            let threads: usize = threads
                .trim()
                .parse()
                .with_context(|| format!("Invalid MESHCHECK_THREADS: {threads:?}"))?;
            self.threads = (threads > 0).then_some(threads);
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }
}
