//! A1-style cell coordinates

use std::fmt;
use std::str::FromStr;

use crate::error::IllustrationError;

/// Hard limits matching the xlsx grid
const MAX_COLS: u32 = 16_384;
const MAX_ROWS: u32 = 1_048_576;

/// A single cell coordinate, 1-based in both dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    col: u32,
    row: u32,
}

impl CellRef {
    /// Build from 1-based column and row indices (A1 = (1, 1))
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }

    /// Parse an A1-style reference such as `G74`
    pub fn parse(s: &str) -> Result<Self, IllustrationError> {
        let trimmed = s.trim();
        let digits_at = trimmed
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| invalid(s))?;
        let (letters, digits) = trimmed.split_at(digits_at);

        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid(s));
        }
        let mut col: u32 = 0;
        for c in letters.chars() {
            let v = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
            col = col * 26 + v;
            if col > MAX_COLS {
                return Err(invalid(s));
            }
        }

        let row: u32 = digits.parse().map_err(|_| invalid(s))?;
        if row == 0 || row > MAX_ROWS {
            return Err(invalid(s));
        }
        Ok(Self { col, row })
    }

    /// 1-based column index
    pub fn col(&self) -> u32 {
        self.col
    }

    /// 1-based row index
    pub fn row(&self) -> u32 {
        self.row
    }

    /// 0-based (row, col) pair as used by range-based readers
    pub fn range_position(&self) -> (u32, u32) {
        (self.row - 1, self.col - 1)
    }

    /// Column letters of this reference ("G" for column 7)
    pub fn column_letters(&self) -> String {
        let mut letters = String::new();
        let mut n = self.col;
        while n > 0 {
            let rem = ((n - 1) % 26) as u8;
            letters.insert(0, (b'A' + rem) as char);
            n = (n - 1) / 26;
        }
        letters
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column_letters(), self.row)
    }
}

impl FromStr for CellRef {
    type Err = IllustrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn invalid(s: &str) -> IllustrationError {
    IllustrationError::Layout(format!("invalid cell reference '{}'", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let cell = CellRef::parse("G74").unwrap();
        assert_eq!(cell.col(), 7);
        assert_eq!(cell.row(), 74);
        assert_eq!(cell.to_string(), "G74");
    }

    #[test]
    fn test_parse_multi_letter_columns() {
        assert_eq!(CellRef::parse("AA1").unwrap().col(), 27);
        assert_eq!(CellRef::parse("AB10").unwrap().col(), 28);
        assert_eq!(CellRef::new(28, 10).to_string(), "AB10");
    }

    #[test]
    fn test_parse_is_case_insensitive_and_trims() {
        assert_eq!(CellRef::parse(" c7 ").unwrap(), CellRef::new(3, 7));
    }

    #[test]
    fn test_range_position_is_zero_based() {
        assert_eq!(CellRef::parse("G74").unwrap().range_position(), (73, 6));
        assert_eq!(CellRef::parse("A1").unwrap().range_position(), (0, 0));
    }

    #[test]
    fn test_rejects_malformed_references() {
        for bad in ["", "74", "G", "G0", "G7X", "7G", "G-1"] {
            assert!(CellRef::parse(bad).is_err(), "accepted '{}'", bad);
        }
    }
}
