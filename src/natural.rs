// Natural ordering for shelf location codes: "A2" < "A10" < "B1"

use std::cmp::Ordering;

/// Compare two strings chunk by chunk: digit runs by numeric value, other
/// runs case-insensitively. Exact ties fall back to plain byte order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = Chunks::new(a);
    let mut right = Chunks::new(b);

    loop {
        let ordering = match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => compare_chunks(x, y),
        };

        if ordering != Ordering::Equal {
            return ordering;
        }
    }
}

fn compare_chunks(x: &str, y: &str) -> Ordering {
    let x_digits = x.starts_with(|c: char| c.is_ascii_digit());
    let y_digits = y.starts_with(|c: char| c.is_ascii_digit());

    match (x_digits, y_digits) {
        (true, true) => compare_numeric(x, y),
        // numbers sort before words
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => x.to_lowercase().cmp(&y.to_lowercase()),
    }
}

// Arbitrary-length digit runs: drop leading zeros, then longer is bigger.
fn compare_numeric(x: &str, y: &str) -> Ordering {
    let x_trim = x.trim_start_matches('0');
    let y_trim = y.trim_start_matches('0');

    x_trim
        .len()
        .cmp(&y_trim.len())
        .then_with(|| x_trim.cmp(y_trim))
}

/// Splits a string into alternating digit / non-digit runs
struct Chunks<'a> {
    rest: &'a str,
}

impl<'a> Chunks<'a> {
    fn new(s: &'a str) -> Self {
        Chunks { rest: s }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let first = self.rest.chars().next()?;
        let digits = first.is_ascii_digit();

        let end = self
            .rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() != digits)
            .map(|(i, _)| i)
            .unwrap_or(self.rest.len());

        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut items: Vec<&str>) -> Vec<&str> {
        items.sort_by(|a, b| natural_cmp(a, b));
        items
    }

    #[test]
    fn test_numeric_runs_compare_by_value() {
        assert_eq!(
            sorted(vec!["A10", "A2", "A1", "B1", "A9"]),
            vec!["A1", "A2", "A9", "A10", "B1"]
        );
    }

    #[test]
    fn test_letters_case_insensitive() {
        assert_eq!(natural_cmp("a3", "B1"), Ordering::Less);
        assert_eq!(natural_cmp("b1", "A3"), Ordering::Greater);
    }

    #[test]
    fn test_leading_zeros() {
        // equal by value, byte order breaks the tie
        assert_eq!(natural_cmp("A01", "A1"), Ordering::Less);
        assert_eq!(natural_cmp("A02", "A10"), Ordering::Less);
    }

    #[test]
    fn test_prefix_shorter_first() {
        assert_eq!(natural_cmp("A", "A1"), Ordering::Less);
        assert_eq!(natural_cmp("", "A"), Ordering::Less);
        assert_eq!(natural_cmp("A1", "A1"), Ordering::Equal);
    }
}
