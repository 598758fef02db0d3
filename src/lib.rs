// UPC Normalizer - Core Library
// Barcode normalization and planogram OCR parsing for ingestion handlers

pub mod gs1;
pub mod brand;
pub mod upc;
pub mod policy;
pub mod ocr;
pub mod natural;
pub mod planogram;
pub mod ingest;

// Re-export commonly used types
pub use gs1::{compute_check_digit, validate_gs1, Gs1Error, UPC_A_LENGTH};
pub use brand::{
    BrandCatalog, BrandEntry, BrandUpcConfig, ConfigIssue, ConfigValidation, PrefixMapping,
};
pub use upc::{
    get_override_prefix, normalize_input, normalize_upc, reconstruct_upc,
    NormalizationFailure, NormalizedUpc, RawUpcInput,
};
pub use policy::{audit_product_upc, is_valid_product_upc, AuditResult, PolicyViolation};
pub use ocr::{repair_location_code, UnrepairableLocationCode, OCR_CHAR_FIXES};
pub use natural::natural_cmp;
pub use planogram::{
    parse_planogram_text, ParsedPlanogramLine, PlanogramError, PlanogramParse,
    PlanogramParser, RejectReason, RejectedLine,
};
pub use ingest::{
    load_records, normalize_batch, read_records, write_accepted_csv,
    BatchReport, BatchSummary, NormalizedRecord, RejectedRecord,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
