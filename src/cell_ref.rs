//! Column label addressing.
//!
//! Columns are addressed by letter labels: `A`..`Z` for the first 26 columns,
//! then two-letter labels where the first letter counts blocks of 26
//! (`AA` = 26, `AZ` = 51, `BA` = 52, ...). Labels stop at two letters; the
//! last addressable column is `ZZ` (701).

/// Label returned for indices that have no column (negative or past `ZZ`).
pub const NO_COLUMN: &str = "-A";

/// Index returned by [`label_to_index`] for labels it does not recognize.
pub const NOT_FOUND: i32 = -1;

/// Row value reported for pointer positions outside every row.
pub const NO_ROW: i32 = -1;

const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Highest index [`index_to_label`] can express.
pub const MAX_LABEL_INDEX: i32 = 27 * 26 - 1;

fn letter(idx: i32) -> Option<char> {
    let idx = usize::try_from(idx).ok()?;
    ALPHABET.get(idx).map(|&b| char::from(b))
}

fn letter_index(ch: char) -> Option<i32> {
    if !ch.is_ascii_uppercase() {
        return None;
    }
    let offset = u32::from(ch) - u32::from('A');
    i32::try_from(offset).ok()
}

/// Convert a 0-based column index to its label.
///
/// Negative indices and indices past [`MAX_LABEL_INDEX`] map to [`NO_COLUMN`].
pub fn index_to_label(idx: i32) -> String {
    if idx < 0 {
        return NO_COLUMN.to_string();
    }
    if idx > 25 {
        let first = letter(idx / 26 - 1);
        let second = letter(idx % 26);
        return match (first, second) {
            (Some(a), Some(b)) => [a, b].iter().collect(),
            _ => NO_COLUMN.to_string(),
        };
    }
    letter(idx).map_or_else(|| NO_COLUMN.to_string(), String::from)
}

/// Convert a column label back to its 0-based index.
///
/// Returns [`NOT_FOUND`] for labels that are not one or two uppercase letters.
pub fn label_to_index(label: &str) -> i32 {
    let mut chars = label.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(a), None, None) => letter_index(a).unwrap_or(NOT_FOUND),
        (Some(a), Some(b), None) => match (letter_index(a), letter_index(b)) {
            (Some(first), Some(second)) => (first + 1) * 26 + second,
            _ => NOT_FOUND,
        },
        _ => NOT_FOUND,
    }
}

/// Convert an unsigned grid column index to its label.
pub fn col_label(col: u32) -> String {
    i32::try_from(col).map_or_else(|_| NO_COLUMN.to_string(), index_to_label)
}

/// Parse a column label into an unsigned grid column index.
pub fn col_index(label: &str) -> Option<u32> {
    u32::try_from(label_to_index(label)).ok()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0, "A")]
    #[test_case(25, "Z")]
    #[test_case(26, "AA")]
    #[test_case(51, "AZ")]
    #[test_case(52, "BA")]
    #[test_case(701, "ZZ")]
    fn index_to_label_known(idx: i32, expected: &str) {
        assert_eq!(index_to_label(idx), expected);
    }

    #[test]
    fn negative_index_is_no_column() {
        assert_eq!(index_to_label(-1), NO_COLUMN);
        assert_eq!(index_to_label(i32::MIN), NO_COLUMN);
    }

    #[test]
    fn index_past_two_letters_is_no_column() {
        assert_eq!(index_to_label(MAX_LABEL_INDEX + 1), NO_COLUMN);
    }

    #[test_case("A", 0)]
    #[test_case("Z", 25)]
    #[test_case("AA", 26)]
    #[test_case("BA", 52)]
    #[test_case("", NOT_FOUND)]
    #[test_case("AAA", NOT_FOUND)]
    #[test_case("a", NOT_FOUND)]
    #[test_case("-A", NOT_FOUND)]
    fn label_to_index_known(label: &str, expected: i32) {
        assert_eq!(label_to_index(label), expected);
    }

    #[test]
    fn every_produced_label_round_trips() {
        for idx in 0..=MAX_LABEL_INDEX {
            let label = index_to_label(idx);
            assert_eq!(label_to_index(&label), idx, "label {label}");
        }
    }

    #[test]
    fn unsigned_helpers_agree() {
        assert_eq!(col_label(27), "AB");
        assert_eq!(col_index("AB"), Some(27));
        assert_eq!(col_index("?"), None);
    }
}
