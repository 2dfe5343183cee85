use anyhow::{anyhow, Context, Result};
use log::debug;
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::core::domain::{validate_dots, Dot, Site};

fn preview(json_str: &str) -> String {
    match json_str.char_indices().nth(200) {
        Some((cut, _)) => format!("{}...", &json_str[..cut]),
        None => json_str.to_string(),
    }
}

/// Parses a JSON array of `T`, reporting the JSON path of the first bad entry.
fn parse_array<T: DeserializeOwned>(json_str: &str, what: &str) -> Result<Vec<T>> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .with_context(|| format!("Invalid JSON syntax. First 200 chars: {}", preview(json_str)))?;

    if !json_value.is_array() {
        anyhow::bail!("Expected a JSON array of {}, found {}", what, kind_of(&json_value));
    }

    serde_path_to_error::deserialize(json_value)
        .map_err(|e| anyhow!("Invalid {} entry at '{}': {}", what, e.path(), e.inner()))
}

fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read JSON file: {}", path.display()))
}

/// Loads dot series from JSON.
pub struct DotLoader;

impl DotLoader {
    /// Parse and validate a JSON array of dots
    pub fn load_from_str(json_str: &str) -> Result<Vec<Dot>> {
        let dots: Vec<Dot> = parse_array(json_str, "dots")?;
        validate_dots(&dots).context("Dot series failed validation")?;

        debug!("Loaded {} dots", dots.len());
        Ok(dots)
    }

    /// Parse and validate a JSON file holding an array of dots
    pub fn load_from_file(path: &Path) -> Result<Vec<Dot>> {
        let content = read_file(path)?;
        Self::load_from_str(&content).with_context(|| format!("Failed to load dots from {}", path.display()))
    }
}

/// Loads sites, with their dots and packages, from JSON.
pub struct SiteLoader;

impl SiteLoader {
    /// Parse and validate a JSON array of sites
    pub fn load_from_str(json_str: &str) -> Result<Vec<Site>> {
        let sites: Vec<Site> = parse_array(json_str, "sites")?;

        for site in &sites {
            validate_dots(&site.site_speed)
                .with_context(|| format!("Site {} has an invalid dot series", site.id))?;
            for package in &site.traffic {
                package
                    .speed()
                    .with_context(|| format!("Site {} has an invalid traffic package", site.id))?;
            }
        }

        debug!("Loaded {} sites", sites.len());
        Ok(sites)
    }

    /// Parse and validate a JSON file holding an array of sites
    pub fn load_from_file(path: &Path) -> Result<Vec<Site>> {
        let content = read_file(path)?;
        Self::load_from_str(&content).with_context(|| format!("Failed to load sites from {}", path.display()))
    }
}
