// 🗂️ Planogram Parser - OCR text dump → (name, UPC, location) rows
// Line-oriented grammar; bad lines are reported, never fatal

use crate::natural::natural_cmp;
use crate::ocr::{repair_location_code, UnrepairableLocationCode};
use anyhow::{Context as AnyhowContext, Result};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// `<name> <12-digit upc> [<single char>] <2-3 char location> [<trailing columns>]`
static LINE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"^(.+?)[ \t]+([0-9]{12})(?:[ \t]+\w)?[ \t]+([[:alnum:]]{2,3})(?:[ \t]+.*)?$")
        .case_insensitive(true)
        .build()
        .expect("planogram line pattern compiles")
});

// ============================================================================
// CORE TYPES
// ============================================================================

/// One product row recovered from a planogram
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedPlanogramLine {
    pub product_name: String,
    pub upc: String,
    pub location: String,
}

impl ParsedPlanogramLine {
    pub fn new(product_name: &str, upc: &str, location: &str) -> Self {
        ParsedPlanogramLine {
            product_name: product_name.to_string(),
            upc: upc.to_string(),
            location: location.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Line does not follow the planogram grammar
    NoGrammarMatch,
    /// Grammar matched but the location code could not be repaired
    UnrepairableLocation(String),
}

/// A line that produced no product, with where it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedLine {
    /// 1-based line number in the dump
    pub line_number: usize,
    pub text: String,
    pub reason: RejectReason,
}

/// Everything one parse produced
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanogramParse {
    /// Sorted by location, natural order, descending
    pub products: Vec<ParsedPlanogramLine>,
    /// In dump order
    pub rejected: Vec<RejectedLine>,
}

impl PlanogramParse {
    pub fn unmatched_lines(&self) -> Vec<String> {
        self.rejected.iter().map(|r| r.text.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanogramError {
    #[error("upc duplicate found: {upc} (lines {first_line} and {line})")]
    DuplicateUpc {
        upc: String,
        first_line: usize,
        line: usize,
    },

    #[error("location duplicate found: {location} (lines {first_line} and {line})")]
    DuplicateLocation {
        location: String,
        first_line: usize,
        line: usize,
    },
}

// ============================================================================
// PARSER
// ============================================================================

/// Planogram parser; uniqueness checks are opt-in
#[derive(Debug, Clone, Default)]
pub struct PlanogramParser {
    pub enforce_unique_upcs: bool,
    pub enforce_unique_locations: bool,
}

impl PlanogramParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: fail the parse on a repeated UPC
    pub fn with_unique_upcs(mut self, enforce: bool) -> Self {
        self.enforce_unique_upcs = enforce;
        self
    }

    /// Builder pattern: fail the parse on a repeated location
    pub fn with_unique_locations(mut self, enforce: bool) -> Self {
        self.enforce_unique_locations = enforce;
        self
    }

    /// Parse a whole text dump.
    ///
    /// Only the uniqueness checks can fail the parse; every other problem
    /// stays local to its line and ends up in `rejected`.
    pub fn parse(&self, dump: &str) -> Result<PlanogramParse, PlanogramError> {
        let (parsed, rejected) = scan_lines(dump);

        if self.enforce_unique_upcs {
            check_unique(&parsed, |p| &p.upc).map_err(|(upc, first_line, line)| {
                PlanogramError::DuplicateUpc {
                    upc,
                    first_line,
                    line,
                }
            })?;
            info!("validated as unique all upc values");
        }

        if self.enforce_unique_locations {
            check_unique(&parsed, |p| &p.location).map_err(|(location, first_line, line)| {
                PlanogramError::DuplicateLocation {
                    location,
                    first_line,
                    line,
                }
            })?;
            info!("validated as unique all location values");
        }

        Ok(finish(parsed, rejected))
    }

    /// Read and parse a planogram text file
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<PlanogramParse> {
        let dump = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read planogram file: {:?}", path.as_ref()))?;

        self.parse(&dump)
            .with_context(|| format!("Failed to parse planogram file: {:?}", path.as_ref()))
    }
}

fn scan_lines(dump: &str) -> (Vec<(usize, ParsedPlanogramLine)>, Vec<RejectedLine>) {
    let mut parsed = Vec::new();
    let mut rejected = Vec::new();

    for (idx, raw_line) in dump.lines().enumerate() {
        let line_number = idx + 1;
        let text = raw_line.trim();
        if text.is_empty() {
            continue;
        }

        match parse_line(text) {
            Ok(product) => parsed.push((line_number, product)),
            Err(reason) => {
                warn!(line_number, line = text, reason = ?reason, "planogram line not parsed");
                rejected.push(RejectedLine {
                    line_number,
                    text: text.to_string(),
                    reason,
                });
            }
        }
    }

    (parsed, rejected)
}

fn finish(parsed: Vec<(usize, ParsedPlanogramLine)>, rejected: Vec<RejectedLine>) -> PlanogramParse {
    let mut products: Vec<ParsedPlanogramLine> =
        parsed.into_iter().map(|(_, product)| product).collect();
    products.sort_by(|a, b| natural_cmp(&b.location, &a.location));

    info!(
        products = products.len(),
        rejected = rejected.len(),
        "planogram parsed"
    );

    PlanogramParse { products, rejected }
}

fn parse_line(text: &str) -> Result<ParsedPlanogramLine, RejectReason> {
    let caps = LINE_PATTERN
        .captures(text)
        .ok_or(RejectReason::NoGrammarMatch)?;

    let location = repair_location_code(&caps[3])
        .map_err(|e: UnrepairableLocationCode| RejectReason::UnrepairableLocation(e.to_string()))?;

    Ok(ParsedPlanogramLine {
        product_name: caps[1].trim().to_string(),
        upc: caps[2].to_string(),
        location,
    })
}

/// First repeated key as (value, first line, repeat line)
fn check_unique<F>(
    parsed: &[(usize, ParsedPlanogramLine)],
    key: F,
) -> Result<(), (String, usize, usize)>
where
    F: Fn(&ParsedPlanogramLine) -> &String,
{
    let mut seen: HashMap<&str, usize> = HashMap::new();

    for (line_number, product) in parsed {
        let value = key(product);
        if let Some(first_line) = seen.insert(value.as_str(), *line_number) {
            return Err((value.clone(), first_line, *line_number));
        }
    }

    Ok(())
}

/// Parse with the default parser (no uniqueness checks).
///
/// Returns the products, sorted by location descending, and the raw text
/// of every line that produced no product.
pub fn parse_planogram_text(dump: &str) -> (Vec<ParsedPlanogramLine>, Vec<String>) {
    let (parsed, rejected) = scan_lines(dump);
    let parse = finish(parsed, rejected);
    let unmatched = parse.unmatched_lines();

    (parse.products, unmatched)
}

// ============================================================================
// TESTS
// ============================================================================
