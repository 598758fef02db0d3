// 🏷️ Brand UPC Policy - Rules as Data
// Allowed prefixes, curated corrections and product-name prefix overrides per brand

use crate::gs1::{self, UPC_A_LENGTH};
use anyhow::{Context as AnyhowContext, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

// ============================================================================
// PREFIX MAPPING
// ============================================================================

/// Serialized form of a prefix mapping, as stored in the brand catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PrefixMappingRecord {
    name_pattern: String,
    prefix: String,
}

/// Product-name based prefix override.
///
/// The pattern is compiled once, case-insensitive and anchored at the start
/// of the product name. A pattern that does not compile is kept so the
/// override lookup can report it, but it never matches anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "PrefixMappingRecord", into = "PrefixMappingRecord")]
pub struct PrefixMapping {
    name_pattern: String,
    prefix: String,
    regex: Option<Regex>,
}

impl PrefixMapping {
    pub fn new(name_pattern: &str, prefix: &str) -> Self {
        let regex = match compile_name_pattern(name_pattern) {
            Ok(regex) => Some(regex),
            Err(e) => {
                warn!(pattern = name_pattern, error = %e, "prefix mapping pattern does not compile");
                None
            }
        };

        PrefixMapping {
            name_pattern: name_pattern.to_string(),
            prefix: prefix.to_string(),
            regex,
        }
    }

    pub fn name_pattern(&self) -> &str {
        &self.name_pattern
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Compiled matcher, `None` when the pattern is malformed
    pub fn regex(&self) -> Option<&Regex> {
        self.regex.as_ref()
    }
}

impl From<PrefixMappingRecord> for PrefixMapping {
    fn from(record: PrefixMappingRecord) -> Self {
        PrefixMapping::new(&record.name_pattern, &record.prefix)
    }
}

impl From<PrefixMapping> for PrefixMappingRecord {
    fn from(mapping: PrefixMapping) -> Self {
        PrefixMappingRecord {
            name_pattern: mapping.name_pattern,
            prefix: mapping.prefix,
        }
    }
}

fn compile_name_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&format!("^(?:{})", pattern))
        .case_insensitive(true)
        .build()
}

// ============================================================================
// BRAND CONFIG
// ============================================================================

/// One brand's UPC policy, passed whole into every normalization call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrandUpcConfig {
    /// Single-digit prefixes, in priority order (first match wins)
    #[serde(default, deserialize_with = "deserialize_prefixes")]
    pub allowed_prefixes: Vec<String>,

    /// Curated bad → actual UPC corrections, trusted as-is
    #[serde(default)]
    pub corrections: HashMap<String, String>,

    /// Name pattern → prefix overrides, first match wins
    #[serde(default)]
    pub prefix_mappings: Vec<PrefixMapping>,
}

fn deserialize_prefixes<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Vec<String> = Vec::deserialize(deserializer)?;
    Ok(dedup_ordered(raw))
}

fn dedup_ordered<I: IntoIterator<Item = String>>(items: I) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

impl BrandUpcConfig {
    /// Create a config with the given prefixes (duplicates dropped, order kept)
    pub fn new<I, S>(allowed_prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        BrandUpcConfig {
            allowed_prefixes: dedup_ordered(allowed_prefixes.into_iter().map(Into::into)),
            corrections: HashMap::new(),
            prefix_mappings: Vec::new(),
        }
    }

    /// Builder pattern: add a known bad → actual correction
    pub fn with_correction(mut self, bad_upc: &str, actual_upc: &str) -> Self {
        self.corrections
            .insert(bad_upc.to_string(), actual_upc.to_string());
        self
    }

    /// Builder pattern: append a name-pattern prefix override
    pub fn with_prefix_mapping(mut self, name_pattern: &str, prefix: &str) -> Self {
        self.prefix_mappings
            .push(PrefixMapping::new(name_pattern, prefix));
        self
    }

    /// Look up a curated correction for an (already trimmed) raw UPC
    pub fn correction_for(&self, raw_upc: &str) -> Option<&str> {
        self.corrections.get(raw_upc).map(String::as_str)
    }

    /// True when `upc` starts with one of the allowed prefixes
    pub fn allows_prefix_of(&self, upc: &str) -> bool {
        self.allowed_prefixes
            .iter()
            .any(|p| !p.is_empty() && upc.starts_with(p.as_str()))
    }

    /// Check the policy itself: prefixes, corrections and mappings.
    ///
    /// Reports every problem found rather than stopping at the first one.
    pub fn validate(&self) -> ConfigValidation {
        let mut issues = Vec::new();

        for prefix in &self.allowed_prefixes {
            if !is_single_digit(prefix) {
                issues.push(ConfigIssue::new(
                    "allowed_prefixes",
                    format!("Prefix {:?} must be a single digit", prefix),
                ));
            }
        }

        let mut bad_upcs: Vec<&String> = self.corrections.keys().collect();
        bad_upcs.sort();

        for bad_upc in bad_upcs {
            let actual = &self.corrections[bad_upc];
            let field = format!("corrections[{}]", bad_upc);

            if actual.len() != UPC_A_LENGTH || !gs1::is_numeric(actual) {
                issues.push(ConfigIssue::new(
                    &field,
                    format!(
                        "Actual UPC {:?} is missing or invalid length (should be {})",
                        actual, UPC_A_LENGTH
                    ),
                ));
                continue;
            }

            if !self.allows_prefix_of(actual) {
                issues.push(ConfigIssue::new(
                    &field,
                    format!(
                        "Actual UPC {:?} does not start with an allowed prefix: {:?}",
                        actual, self.allowed_prefixes
                    ),
                ));
            }

            if !gs1::validate_gs1(actual) {
                let expected = gs1::compute_check_digit(&actual[..UPC_A_LENGTH - 1])
                    .unwrap_or_default();
                issues.push(ConfigIssue::new(
                    &field,
                    format!(
                        "Bad check digit. Expected {}, got {}",
                        expected,
                        &actual[UPC_A_LENGTH - 1..]
                    ),
                ));
            }
        }

        for (idx, mapping) in self.prefix_mappings.iter().enumerate() {
            let field = format!("prefix_mappings[{}]", idx);

            if !is_single_digit(mapping.prefix()) {
                issues.push(ConfigIssue::new(
                    &field,
                    format!("Prefix {:?} must be a single digit", mapping.prefix()),
                ));
            }

            if mapping.regex().is_none() {
                issues.push(ConfigIssue::new(
                    &field,
                    format!("Pattern {:?} does not compile", mapping.name_pattern()),
                ));
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

fn is_single_digit(s: &str) -> bool {
    s.len() == 1 && gs1::is_numeric(s)
}

// ============================================================================
// CONFIG VALIDATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    fn new(field: &str, message: String) -> Self {
        ConfigIssue {
            field: field.to_string(),
            message,
        }
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub type ConfigValidation = std::result::Result<(), Vec<ConfigIssue>>;

// ============================================================================
// BRAND CATALOG
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandEntry {
    pub name: String,
    #[serde(flatten)]
    pub config: BrandUpcConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    brands: Vec<BrandEntry>,
}

/// Every brand policy known to the host, keyed by brand name
#[derive(Debug, Clone, Default)]
pub struct BrandCatalog {
    brands: Vec<BrandEntry>,
}

impl BrandCatalog {
    pub fn new() -> Self {
        BrandCatalog { brands: Vec::new() }
    }

    /// Load brand policies from a JSON catalog file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read brand catalog: {:?}", path.as_ref()))?;

        let catalog = BrandCatalog::from_json(&content)?;
        info!(
            brands = catalog.len(),
            path = %path.as_ref().display(),
            "loaded brand catalog"
        );

        Ok(catalog)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let file: CatalogFile =
            serde_json::from_str(content).context("Failed to parse brand catalog JSON")?;

        let mut catalog = BrandCatalog::new();
        for entry in file.brands {
            catalog.insert(&entry.name, entry.config);
        }

        Ok(catalog)
    }

    /// Add or replace a brand
    pub fn insert(&mut self, name: &str, config: BrandUpcConfig) {
        match self.brands.iter_mut().find(|b| b.name.eq_ignore_ascii_case(name)) {
            Some(existing) => existing.config = config,
            None => self.brands.push(BrandEntry {
                name: name.to_string(),
                config,
            }),
        }
    }

    /// Brand lookup, case-insensitive on the name
    pub fn get(&self, name: &str) -> Option<&BrandUpcConfig> {
        self.brands
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(name))
            .map(|b| &b.config)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.brands.iter().map(|b| b.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.brands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brands.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        let file = CatalogFile {
            brands: self.brands.clone(),
        };
        serde_json::to_string_pretty(&file).context("Failed to serialize brand catalog")
    }
}

// ============================================================================
// TESTS
// ============================================================================
