// 🧮 UPC Normalizer - Raw barcode → canonical 12-digit UPC-A
// Corrections table, product-name prefix overrides, multi-length reconstruction

use crate::brand::{BrandUpcConfig, PrefixMapping};
use crate::gs1::{self, PAYLOAD_LENGTH, UPC_A_LENGTH};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

// ============================================================================
// CORE TYPES
// ============================================================================

/// One raw barcode as received from an ingestion path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawUpcInput {
    #[serde(rename = "upc", alias = "raw_value")]
    pub raw_value: String,

    #[serde(rename = "name", alias = "associated_product_name", default)]
    #[serde(deserialize_with = "empty_as_none")]
    pub associated_product_name: Option<String>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

impl RawUpcInput {
    pub fn new(raw_value: &str) -> Self {
        RawUpcInput {
            raw_value: raw_value.to_string(),
            associated_product_name: None,
        }
    }

    /// Builder pattern: attach the product display name
    pub fn with_product_name(mut self, name: &str) -> Self {
        self.associated_product_name = Some(name.to_string());
        self
    }
}

/// A validated 12-digit UPC-A
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedUpc {
    value: String,
}

impl NormalizedUpc {
    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

impl std::fmt::Display for NormalizedUpc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

impl AsRef<str> for NormalizedUpc {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

/// Why a raw UPC could not be normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum NormalizationFailure {
    #[error("brand has no allowed UPC prefixes")]
    NoAllowedPrefixes,

    #[error("UPC length is not 10, 11 or 12 digits")]
    UnsupportedLength,

    #[error("no candidate passed the prefix and check digit rules")]
    PrefixOrChecksumMismatch,
}

// ============================================================================
// PREFIX OVERRIDE
// ============================================================================

/// Prefix forced on a product by the first mapping whose name pattern matches.
///
/// Malformed patterns degrade to `None`: overrides narrow the search, the
/// default prefixes still apply without them.
pub fn get_override_prefix(product_name: &str, prefix_mappings: &[PrefixMapping]) -> Option<String> {
    for mapping in prefix_mappings {
        let Some(regex) = mapping.regex() else {
            warn!(
                pattern = mapping.name_pattern(),
                "prefix mapping pattern is malformed, ignoring overrides"
            );
            return None;
        };

        if regex.is_match(product_name) {
            debug!(product_name, prefix = mapping.prefix(), "prefix override matched");
            return Some(mapping.prefix().to_string());
        }
    }

    None
}

// ============================================================================
// CANDIDATE RECONSTRUCTION
// ============================================================================

/// Recover a brand-compliant UPC-A from a 10, 11 or 12 digit raw value.
///
/// Prefixes are tried in order and the first validating candidate wins.
/// A `main_prefix` is tried before `allowed_prefixes` and every accepted
/// candidate must start with it.
///
/// Order of attempts:
/// - 12 digits (13 with one leading `0`, 14 with `00` are stripped first):
///   accepted as-is if it validates and carries an allowed prefix.
/// - 11 digits: `prefix + raw` per prefix; then `raw + check digit`; then
///   the 10-digit path on `raw` minus its last digit.
/// - 10 digits: `prefix + raw + check digit` per prefix.
pub fn reconstruct_upc(
    raw: &str,
    allowed_prefixes: &[String],
    main_prefix: Option<&str>,
) -> Option<String> {
    let raw = strip_export_zeros(raw.trim());

    if !gs1::is_numeric(raw) {
        debug!(raw, "raw UPC is not numeric");
        return None;
    }

    let prefixes = PrefixSet::new(allowed_prefixes, main_prefix);

    let candidate = match raw.len() {
        UPC_A_LENGTH => from_full_length(raw, &prefixes),
        PAYLOAD_LENGTH => from_missing_check_digit(raw, &prefixes),
        10 => from_missing_prefix_and_check_digit(raw, &prefixes),
        _ => None,
    };

    if candidate.is_none() {
        debug!(raw, prefixes = ?prefixes.ordered, "no prefix match found");
    }

    candidate
}

/// Point-of-sale exports sometimes pad a UPC-A to EAN-13 or GTIN-14
fn strip_export_zeros(raw: &str) -> &str {
    match raw.len() {
        13 if raw.starts_with('0') => &raw[1..],
        14 if raw.starts_with("00") => &raw[2..],
        _ => raw,
    }
}

/// Effective prefixes for one reconstruction: main prefix first, then the
/// brand defaults.
struct PrefixSet<'a> {
    ordered: Vec<&'a str>,
    main: Option<&'a str>,
}

impl<'a> PrefixSet<'a> {
    fn new(allowed: &'a [String], main: Option<&'a str>) -> Self {
        let main = main.filter(|p| !p.is_empty());
        let mut ordered: Vec<&str> = Vec::with_capacity(allowed.len() + 1);

        for prefix in main.into_iter().chain(allowed.iter().map(String::as_str)) {
            if !prefix.is_empty() && !ordered.contains(&prefix) {
                ordered.push(prefix);
            }
        }

        PrefixSet { ordered, main }
    }

    /// Starts with an effective prefix and honours the main prefix
    fn admits(&self, candidate: &str) -> bool {
        let main_ok = self.main.map_or(true, |m| candidate.starts_with(m));
        main_ok && self.ordered.iter().any(|p| candidate.starts_with(p))
    }

    fn accepts(&self, candidate: &str) -> bool {
        gs1::validate_gs1(candidate) && self.admits(candidate)
    }
}

fn from_full_length(raw: &str, prefixes: &PrefixSet) -> Option<String> {
    prefixes.accepts(raw).then(|| raw.to_string())
}

fn from_missing_check_digit(raw: &str, prefixes: &PrefixSet) -> Option<String> {
    for prefix in &prefixes.ordered {
        let candidate = format!("{}{}", prefix, raw);
        if prefixes.accepts(&candidate) {
            return Some(candidate);
        }
    }

    // The raw value may be a full payload whose check digit got dropped
    let check = gs1::compute_check_digit(raw).ok()?;
    let candidate = format!("{}{}", raw, check);
    if prefixes.accepts(&candidate) {
        return Some(candidate);
    }

    // ...or a 10-digit body plus check digit with the prefix lost
    from_missing_prefix_and_check_digit(&raw[..raw.len() - 1], prefixes)
}

fn from_missing_prefix_and_check_digit(raw: &str, prefixes: &PrefixSet) -> Option<String> {
    for prefix in &prefixes.ordered {
        let payload = format!("{}{}", prefix, raw);
        let Ok(check) = gs1::compute_check_digit(&payload) else {
            continue;
        };

        let candidate = payload + &check;
        if prefixes.accepts(&candidate) {
            return Some(candidate);
        }
    }

    None
}

// ============================================================================
// NORMALIZER
// ============================================================================

/// Turn one raw barcode into a validated UPC-A under a brand's policy.
///
/// A curated correction for the trimmed value is returned as-is, without
/// any further checks.
pub fn normalize_upc(
    raw: &str,
    product_name: Option<&str>,
    config: &BrandUpcConfig,
) -> Result<NormalizedUpc, NormalizationFailure> {
    let raw = raw.trim();

    if let Some(actual) = config.correction_for(raw) {
        debug!(raw, actual, "UPC resolved from corrections table");
        return Ok(NormalizedUpc {
            value: actual.to_string(),
        });
    }

    if config.allowed_prefixes.is_empty() {
        return Err(NormalizationFailure::NoAllowedPrefixes);
    }

    let main_prefix =
        product_name.and_then(|name| get_override_prefix(name, &config.prefix_mappings));

    let length = strip_export_zeros(raw).len();
    if !matches!(length, 10 | PAYLOAD_LENGTH | UPC_A_LENGTH) {
        return Err(NormalizationFailure::UnsupportedLength);
    }

    let candidate = reconstruct_upc(raw, &config.allowed_prefixes, main_prefix.as_deref())
        .ok_or(NormalizationFailure::PrefixOrChecksumMismatch)?;

    let prefixes = PrefixSet::new(&config.allowed_prefixes, main_prefix.as_deref());
    if !prefixes.accepts(&candidate) {
        return Err(NormalizationFailure::PrefixOrChecksumMismatch);
    }

    Ok(NormalizedUpc { value: candidate })
}

/// Same as [`normalize_upc`], taking the caller's record directly
pub fn normalize_input(
    input: &RawUpcInput,
    config: &BrandUpcConfig,
) -> Result<NormalizedUpc, NormalizationFailure> {
    normalize_upc(
        &input.raw_value,
        input.associated_product_name.as_deref(),
        config,
    )
}

// ============================================================================
// TESTS
// ============================================================================
