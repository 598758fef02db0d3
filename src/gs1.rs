// 🔢 GS1 Check Digit - UPC-A / EAN checksum math
// Single source of truth for every candidate reconstruction path

use thiserror::Error;

/// Length of a UPC-A code, check digit included
pub const UPC_A_LENGTH: usize = 12;

/// Length of the UPC-A payload the check digit is computed over
pub const PAYLOAD_LENGTH: usize = UPC_A_LENGTH - 1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Gs1Error {
    /// Check digit requested for something that is not 11 ASCII digits
    #[error("check digit input must be 11 digits, got {input:?}")]
    InvalidInput { input: String },
}

// ============================================================================
// CHECK DIGIT
// ============================================================================

/// Compute the GS1 check digit for an 11-digit UPC-A payload.
///
/// Digits are weighted ×3/×1 alternately starting from the rightmost one,
/// summed, and the check digit is whatever brings the sum up to the next
/// multiple of 10.
///
/// ```
/// use upc_normalizer::gs1::compute_check_digit;
/// assert_eq!(compute_check_digit("04460032064").unwrap(), "9");
/// ```
pub fn compute_check_digit(digits11: &str) -> Result<String, Gs1Error> {
    if digits11.len() != PAYLOAD_LENGTH || !is_numeric(digits11) {
        return Err(Gs1Error::InvalidInput {
            input: digits11.to_string(),
        });
    }

    Ok(check_digit_of(digits11).to_string())
}

/// Validate a full 12-digit code against its own check digit.
///
/// Wrong length or non-numeric input is simply invalid, never an error.
pub fn validate_gs1(code: &str) -> bool {
    if code.len() != UPC_A_LENGTH || !is_numeric(code) {
        return false;
    }

    let (payload, check) = code.split_at(PAYLOAD_LENGTH);
    let expected = check_digit_of(payload);

    check.as_bytes()[0] == b'0' + expected
}

/// True when the string is non-empty and every byte is an ASCII digit
pub fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

// Caller guarantees ASCII digits only.
fn check_digit_of(payload: &str) -> u8 {
    let total: u32 = payload
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 0 { digit * 3 } else { digit }
        })
        .sum();

    ((10 - total % 10) % 10) as u8
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN_UPCS: [&str; 4] = ["044600320649", "036000291452", "012345678905", "000000000000"];

    #[test]
    fn test_known_check_digit() {
        assert_eq!(compute_check_digit("04460032064").unwrap(), "9");
        assert_eq!(compute_check_digit("03600029145").unwrap(), "2");
    }

    #[test]
    fn test_check_digit_zero_when_sum_is_multiple_of_ten() {
        // 0+4+6+0+0+3+2+0+6+4+9 weighted sums to 80
        assert_eq!(compute_check_digit("04600320649").unwrap(), "0");
    }

    #[test]
    fn test_check_digit_rejects_bad_input() {
        assert!(matches!(
            compute_check_digit("0446003206"),
            Err(Gs1Error::InvalidInput { .. })
        ));
        assert!(compute_check_digit("044600320649").is_err());
        assert!(compute_check_digit("0446003206A").is_err());
        assert!(compute_check_digit("").is_err());
    }

    #[test]
    fn test_round_trip_on_known_upcs() {
        for upc in KNOWN_UPCS {
            assert_eq!(compute_check_digit(&upc[..11]).unwrap(), &upc[11..]);
            assert!(validate_gs1(upc), "{} should validate", upc);
        }
    }

    #[test]
    fn test_validate_rejects_wrong_check_digit() {
        assert!(!validate_gs1("044600320648"));
        assert!(!validate_gs1("036000291453"));
    }

    #[test]
    fn test_validate_rejects_malformed() {
        assert!(!validate_gs1("04460032064"));
        assert!(!validate_gs1("0044600320649"));
        assert!(!validate_gs1("04460032064X"));
        assert!(!validate_gs1(" 44600320649"));
        assert!(!validate_gs1(""));
    }
}
