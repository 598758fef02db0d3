// 📐 Product UPC Policy Audit
// Checks a stored UPC against its brand's policy without reconstructing anything

use crate::brand::BrandUpcConfig;
use crate::gs1::{self, PAYLOAD_LENGTH, UPC_A_LENGTH};
use crate::upc::get_override_prefix;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyViolation {
    NotNumeric,
    WrongLength { length: usize },
    BadCheckDigit { expected: String, found: String },
    NoAllowedPrefixes,
    PrefixNotAllowed { prefix: String, allowed: Vec<String> },
    MappedPrefixMismatch { expected: String, found: String },
}

impl std::fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyViolation::NotNumeric => write!(f, "UPC number must be numeric"),
            PolicyViolation::WrongLength { length } => write!(
                f,
                "UPC number must be {} digits, got {}",
                UPC_A_LENGTH, length
            ),
            PolicyViolation::BadCheckDigit { expected, found } => write!(
                f,
                "The UPC number is invalid. Expected a check digit of {}, got {}",
                expected, found
            ),
            PolicyViolation::NoAllowedPrefixes => write!(f, "Brand has no allowed UPC prefixes"),
            PolicyViolation::PrefixNotAllowed { prefix, allowed } => write!(
                f,
                "UPC prefix {} is not allowed. Allowed prefixes: {:?}",
                prefix, allowed
            ),
            PolicyViolation::MappedPrefixMismatch { expected, found } => write!(
                f,
                "Expected UPC prefix {} for this product name, but got {}",
                expected, found
            ),
        }
    }
}

impl std::error::Error for PolicyViolation {}

pub type AuditResult = Result<(), Vec<PolicyViolation>>;

/// Audit a stored UPC for a product.
///
/// Format problems (numeric, length, check digit, missing prefixes) end the
/// audit at the first failure; the two prefix rules are both reported.
pub fn audit_product_upc(upc: &str, product_name: Option<&str>, config: &BrandUpcConfig) -> AuditResult {
    if !gs1::is_numeric(upc) {
        return Err(vec![PolicyViolation::NotNumeric]);
    }

    if upc.len() != UPC_A_LENGTH {
        return Err(vec![PolicyViolation::WrongLength { length: upc.len() }]);
    }

    if !gs1::validate_gs1(upc) {
        // numeric and 12 long, so the payload is always computable
        let expected = gs1::compute_check_digit(&upc[..PAYLOAD_LENGTH]).unwrap_or_default();
        return Err(vec![PolicyViolation::BadCheckDigit {
            expected,
            found: upc[PAYLOAD_LENGTH..].to_string(),
        }]);
    }

    if config.allowed_prefixes.is_empty() {
        return Err(vec![PolicyViolation::NoAllowedPrefixes]);
    }

    let mut violations = Vec::new();
    let prefix = &upc[..1];

    if !config.allowed_prefixes.iter().any(|p| p == prefix) {
        violations.push(PolicyViolation::PrefixNotAllowed {
            prefix: prefix.to_string(),
            allowed: config.allowed_prefixes.clone(),
        });
    }

    let mapped = get_override_prefix(product_name.unwrap_or(""), &config.prefix_mappings);
    if let Some(expected) = mapped {
        if expected != prefix {
            violations.push(PolicyViolation::MappedPrefixMismatch {
                expected,
                found: prefix.to_string(),
            });
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Convenience wrapper for ingestion paths that only need a yes/no
pub fn is_valid_product_upc(upc: &str, product_name: Option<&str>, config: &BrandUpcConfig) -> bool {
    audit_product_upc(upc, product_name, config).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BrandUpcConfig {
        BrandUpcConfig::new(["0", "3"]).with_prefix_mapping("sparkling", "3")
    }

    #[test]
    fn test_valid_upc_passes() {
        assert!(audit_product_upc("044600320649", Some("Beans"), &config()).is_ok());
        assert!(is_valid_product_upc("044600320649", None, &config()));
    }

    #[test]
    fn test_structural_failures_stop_early() {
        assert_eq!(
            audit_product_upc("04460032064X", None, &config()),
            Err(vec![PolicyViolation::NotNumeric])
        );
        assert_eq!(
            audit_product_upc("04460032064", None, &config()),
            Err(vec![PolicyViolation::WrongLength { length: 11 }])
        );
        assert_eq!(
            audit_product_upc("044600320648", None, &config()),
            Err(vec![PolicyViolation::BadCheckDigit {
                expected: "9".to_string(),
                found: "8".to_string(),
            }])
        );
        assert_eq!(
            audit_product_upc("044600320649", None, &BrandUpcConfig::default()),
            Err(vec![PolicyViolation::NoAllowedPrefixes])
        );
    }

    #[test]
    fn test_prefix_rules_both_reported() {
        // 7-prefixed and mapped to 3
        let violations = audit_product_upc("712345678904", Some("Sparkling Water"), &config())
            .unwrap_err();

        assert_eq!(violations.len(), 2);
        assert!(matches!(violations[0], PolicyViolation::PrefixNotAllowed { .. }));
        assert_eq!(
            violations[1],
            PolicyViolation::MappedPrefixMismatch {
                expected: "3".to_string(),
                found: "7".to_string(),
            }
        );
    }

    #[test]
    fn test_mapped_prefix_mismatch_alone() {
        let violations = audit_product_upc("044600320649", Some("SPARKLING lime"), &config())
            .unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].to_string(),
            "Expected UPC prefix 3 for this product name, but got 0"
        );
    }
}
