//! Integration tests for file-backed flows: brand catalog, CSV batches, planogram dumps

use std::io::Write;
use tempfile::NamedTempFile;
use upc_normalizer::{
    load_records, normalize_batch, normalize_upc, BrandCatalog, NormalizationFailure,
    PlanogramParser,
};

const CATALOG: &str = r#"{
    "brands": [
        {
            "name": "Sunrise Beverages",
            "allowed_prefixes": ["7", "3"],
            "corrections": { "7123456789": "712345678904" },
            "prefix_mappings": [
                { "name_pattern": "sparkling", "prefix": "3" }
            ]
        },
        {
            "name": "No Policy Foods",
            "allowed_prefixes": []
        }
    ]
}"#;

fn write_temp(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_catalog_file_drives_normalization() {
    let catalog_file = write_temp(CATALOG);
    let catalog = BrandCatalog::from_file(catalog_file.path()).unwrap();

    let sunrise = catalog.get("sunrise beverages").unwrap();
    assert!(sunrise.validate().is_ok());

    assert_eq!(
        normalize_upc("1234567890", Some("Still Water"), sunrise)
            .unwrap()
            .as_str(),
        "712345678904"
    );
    assert_eq!(
        normalize_upc("1234567890", Some("Sparkling Water"), sunrise)
            .unwrap()
            .as_str(),
        "312345678906"
    );
    assert_eq!(
        normalize_upc("7123456789", None, sunrise).unwrap().as_str(),
        "712345678904"
    );

    let no_policy = catalog.get("No Policy Foods").unwrap();
    assert_eq!(
        normalize_upc("712345678904", None, no_policy),
        Err(NormalizationFailure::NoAllowedPrefixes)
    );
}

#[test]
fn test_missing_catalog_file_is_an_error() {
    let err = BrandCatalog::from_file("/definitely/not/here/brands.json").unwrap_err();
    assert!(err.to_string().contains("Failed to read brand catalog"));
}

#[test]
fn test_csv_batch_end_to_end() {
    let catalog = BrandCatalog::from_json(CATALOG).unwrap();
    let sunrise = catalog.get("Sunrise Beverages").unwrap();

    let csv_file = write_temp(
        "upc,name\n\
         1234567890,Still Water\n\
         1234567890,Sparkling Water\n\
         7123456789,\n\
         12,Broken\n",
    );

    let records = load_records(csv_file.path()).unwrap();
    assert_eq!(records.len(), 4);

    let report = normalize_batch(&records, sunrise);
    assert_eq!(report.summary.accepted, 3);
    assert_eq!(report.summary.rejected, 1);
    assert_eq!(report.summary.corrected, 1);
    assert_eq!(
        report.upcs(),
        vec!["312345678906".to_string(), "712345678904".to_string()]
    );
}

#[test]
fn test_planogram_file() {
    let dump = write_temp(
        "PLANOGRAM 3277 - AISLE 4\n\
         COLA 12PK   712345678904   A1\n\
         LIME SPARKLING   312345678906 x Bl2\n\
         ~~ smudge ~~\n",
    );

    let parse = PlanogramParser::new().parse_file(dump.path()).unwrap();

    assert_eq!(parse.products.len(), 2);
    assert_eq!(parse.products[0].location, "B12");
    assert_eq!(parse.products[0].product_name, "LIME SPARKLING");
    assert_eq!(parse.products[1].location, "A1");
    assert_eq!(
        parse.unmatched_lines(),
        vec![
            "PLANOGRAM 3277 - AISLE 4".to_string(),
            "~~ smudge ~~".to_string()
        ]
    );
}
