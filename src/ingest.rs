// 📥 Batch Ingestion - normalize many incoming product records at once
// One bad UPC never stops its siblings; every skip is reported

use crate::brand::BrandUpcConfig;
use crate::upc::{normalize_input, NormalizationFailure, RawUpcInput};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

// ============================================================================
// REPORT TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub raw_upc: String,
    pub upc: String,
    pub name: Option<String>,
    /// Resolved through the brand's corrections table
    pub corrected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRecord {
    pub raw_upc: String,
    pub name: Option<String>,
    pub reason: NormalizationFailure,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub corrected: usize,
}

impl BatchSummary {
    pub fn summary(&self) -> String {
        format!(
            "{} records: {} accepted ({} corrected), {} rejected",
            self.total, self.accepted, self.corrected, self.rejected
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub accepted: Vec<NormalizedRecord>,
    pub rejected: Vec<RejectedRecord>,
    pub summary: BatchSummary,
}

impl BatchReport {
    /// Sorted, deduplicated list of accepted UPCs
    pub fn upcs(&self) -> Vec<String> {
        let mut upcs: Vec<String> = self.accepted.iter().map(|r| r.upc.clone()).collect();
        upcs.sort();
        upcs.dedup();
        upcs
    }
}

// ============================================================================
// BATCH NORMALIZATION
// ============================================================================

/// Normalize every record under one brand policy
pub fn normalize_batch(records: &[RawUpcInput], config: &BrandUpcConfig) -> BatchReport {
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();
    let mut corrected = 0;

    for record in records {
        let raw_upc = record.raw_value.trim().to_string();

        match normalize_input(record, config) {
            Ok(upc) => {
                let was_corrected = config.correction_for(&raw_upc).is_some();
                if was_corrected {
                    corrected += 1;
                }
                accepted.push(NormalizedRecord {
                    raw_upc,
                    upc: upc.into_string(),
                    name: record.associated_product_name.clone(),
                    corrected: was_corrected,
                });
            }
            Err(reason) => {
                info!(raw_upc = %raw_upc, reason = %reason, "Invalid UPC. Skipping");
                rejected.push(RejectedRecord {
                    raw_upc,
                    name: record.associated_product_name.clone(),
                    reason,
                });
            }
        }
    }

    let summary = BatchSummary {
        total: records.len(),
        accepted: accepted.len(),
        rejected: rejected.len(),
        corrected,
    };
    info!("{}", summary.summary());

    BatchReport {
        run_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        accepted,
        rejected,
        summary,
    }
}

// ============================================================================
// CSV INPUT / OUTPUT
// ============================================================================

/// Load raw records from a CSV file with an `upc,name` header
pub fn load_records(csv_path: &Path) -> Result<Vec<RawUpcInput>> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open CSV file: {}", csv_path.display()))?;

    read_records(file)
}

pub fn read_records<R: Read>(reader: R) -> Result<Vec<RawUpcInput>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Fields)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();

    for (idx, result) in rdr.deserialize().enumerate() {
        // header is line 1
        let record: RawUpcInput =
            result.with_context(|| format!("Failed to deserialize record on line {}", idx + 2))?;
        records.push(record);
    }

    Ok(records)
}

#[derive(Serialize)]
struct AcceptedRow<'a> {
    raw_upc: &'a str,
    upc: &'a str,
    name: &'a str,
}

/// Write accepted records as `raw_upc,upc,name`
pub fn write_accepted_csv<W: Write>(report: &BatchReport, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    for record in &report.accepted {
        wtr.serialize(AcceptedRow {
            raw_upc: &record.raw_upc,
            upc: &record.upc,
            name: record.name.as_deref().unwrap_or(""),
        })
        .context("Failed to write CSV row")?;
    }

    wtr.flush().context("Failed to flush CSV output")?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BrandUpcConfig {
        BrandUpcConfig::new(["0"]).with_correction("99", "044600320649")
    }

    #[test]
    fn test_batch_keeps_going_after_failures() {
        let records = vec![
            RawUpcInput::new("4460032064").with_product_name("Beans"),
            RawUpcInput::new("123"),
            RawUpcInput::new(" 99 "),
            RawUpcInput::new("744600320649"),
        ];

        let report = normalize_batch(&records, &config());

        assert_eq!(
            report.summary,
            BatchSummary {
                total: 4,
                accepted: 2,
                rejected: 2,
                corrected: 1,
            }
        );
        assert_eq!(report.accepted[0].upc, "044600320649");
        assert_eq!(report.accepted[0].name.as_deref(), Some("Beans"));
        assert!(!report.accepted[0].corrected);
        assert!(report.accepted[1].corrected);
        assert_eq!(report.accepted[1].raw_upc, "99");

        assert_eq!(report.rejected[0].reason, NormalizationFailure::UnsupportedLength);
        assert_eq!(
            report.rejected[1].reason,
            NormalizationFailure::PrefixOrChecksumMismatch
        );

        assert_eq!(report.upcs(), vec!["044600320649".to_string()]);
    }

    #[test]
    fn test_summary_text() {
        let summary = BatchSummary {
            total: 3,
            accepted: 2,
            rejected: 1,
            corrected: 1,
        };
        assert_eq!(summary.summary(), "3 records: 2 accepted (1 corrected), 1 rejected");
    }

    #[test]
    fn test_read_records_optional_name() {
        let csv = "upc,name\n4460032064,Beans\n 044600320649 ,\n";
        let records = read_records(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].raw_value, "4460032064");
        assert_eq!(records[0].associated_product_name.as_deref(), Some("Beans"));
        assert_eq!(records[1].raw_value, "044600320649");
        assert_eq!(records[1].associated_product_name, None);
    }

    #[test]
    fn test_read_records_without_name_column() {
        let records = read_records("upc\n4460032064\n".as_bytes()).unwrap();
        assert_eq!(records[0].associated_product_name, None);
    }

    #[test]
    fn test_write_accepted_csv() {
        let records = vec![RawUpcInput::new("4460032064").with_product_name("Beans")];
        let report = normalize_batch(&records, &config());

        let mut out = Vec::new();
        write_accepted_csv(&report, &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "raw_upc,upc,name\n4460032064,044600320649,Beans\n"
        );
    }
}
