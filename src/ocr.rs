// 🔤 OCR Location-Code Repair
// Shelf locations are <letter><digit>[<digit>]; OCR mixes up look-alike glyphs

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Digit → letters OCR commonly reads in its place.
///
/// The first alias is the preferred letter when a digit shows up where a
/// letter belongs. `B` is listed under both 3 and 8; lookups go in table
/// order, so a `B` in a digit slot becomes 3.
pub static OCR_CHAR_FIXES: [(char, &[char]); 10] = [
    ('0', &['O', 'o']),
    ('1', &['I', 'l', 'i']),
    ('2', &['Z', 'z']),
    ('3', &['B']),
    ('4', &['A']),
    ('5', &['S', 's']),
    ('6', &['G']),
    ('7', &['T']),
    ('8', &['B']),
    ('9', &['g', 'q']),
];

static LOCATION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][0-9]{1,2}$").expect("location pattern compiles"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnrepairableLocationCode {
    #[error("location code {code:?} must be 2 or 3 characters")]
    BadLength { code: String },

    #[error("no digit found for {ch:?} while repairing location code {code:?}")]
    NoDigitAlias { code: String, ch: char },
}

/// True when the code already reads as `<letter><digit>{1,2}`
pub fn is_canonical_location(code: &str) -> bool {
    LOCATION_PATTERN.is_match(code)
}

/// Preferred letter for a digit read in the letter slot
pub fn letter_for_digit(digit: char) -> Option<char> {
    OCR_CHAR_FIXES
        .iter()
        .find(|(d, _)| *d == digit)
        .and_then(|(_, aliases)| aliases.first().copied())
}

/// Digit whose alias set holds this letter (case-sensitive)
pub fn digit_for_letter(letter: char) -> Option<char> {
    OCR_CHAR_FIXES
        .iter()
        .find(|(_, aliases)| aliases.contains(&letter))
        .map(|(d, _)| *d)
}

/// Undo OCR glyph swaps in a shelf location code.
///
/// Canonical codes come back untouched. Otherwise position 0 should be a
/// letter and every later position a digit; characters of the wrong class
/// are swapped through [`OCR_CHAR_FIXES`].
pub fn repair_location_code(code: &str) -> Result<String, UnrepairableLocationCode> {
    if is_canonical_location(code) {
        return Ok(code.to_string());
    }

    let length = code.chars().count();
    if !(2..=3).contains(&length) {
        return Err(UnrepairableLocationCode::BadLength {
            code: code.to_string(),
        });
    }

    let mut repaired = String::with_capacity(code.len());

    for (idx, ch) in code.chars().enumerate() {
        if idx == 0 && ch.is_ascii_digit() {
            repaired.push(letter_for_digit(ch).unwrap_or(ch));
        } else if idx > 0 && ch.is_alphabetic() {
            let digit = digit_for_letter(ch).ok_or_else(|| UnrepairableLocationCode::NoDigitAlias {
                code: code.to_string(),
                ch,
            })?;
            repaired.push(digit);
        } else {
            repaired.push(ch);
        }
    }

    Ok(repaired)
}
