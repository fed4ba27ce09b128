// CSV shape validation
//
// Checks that a dataset has a header with at least two columns and that every
// data row has exactly as many comma-separated fields as the header. Cell
// contents are never inspected: quoting, numeric columns and the like pass
// through untouched.

use std::fmt;

/// Minimum number of non-blank lines (header + one data row)
const MIN_LINES: usize = 2;

/// Minimum number of header columns
const MIN_COLUMNS: usize = 2;

/// Why a dataset was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Nothing but whitespace
    Empty,
    /// Fewer than two non-blank lines
    MissingRows { lines: usize },
    /// Header has fewer than two columns
    InvalidHeader { found: usize },
    /// A data row's column count differs from the header's
    ColumnMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },
}

impl ValidationError {
    /// 1-indexed line (header = 1) the error points at, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::InvalidHeader { .. } => Some(1),
            Self::ColumnMismatch { line, .. } => Some(*line),
            _ => None,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty input: data input cannot be empty"),
            Self::MissingRows { lines } => write!(
                f,
                "missing header or data row: need at least {} non-blank lines, found {}",
                MIN_LINES, lines
            ),
            Self::InvalidHeader { found } => write!(
                f,
                "invalid header: need ≥{} columns, found {}",
                MIN_COLUMNS, found
            ),
            Self::ColumnMismatch {
                line,
                expected,
                found,
            } => write!(
                f,
                "column count mismatch at line {}: expected {} columns, found {}",
                line, expected, found
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Shape of a dataset that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvShape {
    pub headers: Vec<String>,
    /// Data rows, header excluded
    pub rows: usize,
}

impl CsvShape {
    pub fn columns(&self) -> usize {
        self.headers.len()
    }
}

/// Non-blank lines of the trimmed input
fn content_lines(csv: &str) -> Vec<&str> {
    csv.trim()
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect()
}

/// Validate the structure of `csv`; the first failing rule wins
pub fn validate(csv: &str) -> Result<(), ValidationError> {
    inspect(csv).map(|_| ())
}

/// Validate and describe `csv`
pub fn inspect(csv: &str) -> Result<CsvShape, ValidationError> {
    if csv.trim().is_empty() {
        return Err(ValidationError::Empty);
    }

    let lines = content_lines(csv);
    if lines.len() < MIN_LINES {
        return Err(ValidationError::MissingRows { lines: lines.len() });
    }

    let headers: Vec<String> = lines[0].split(',').map(|c| c.trim().to_string()).collect();
    if headers.len() < MIN_COLUMNS {
        return Err(ValidationError::InvalidHeader {
            found: headers.len(),
        });
    }

    for (idx, line) in lines.iter().enumerate().skip(1) {
        let found = line.split(',').count();
        if found != headers.len() {
            return Err(ValidationError::ColumnMismatch {
                line: idx + 1,
                expected: headers.len(),
                found,
            });
        }
    }

    Ok(CsvShape {
        headers,
        rows: lines.len() - 1,
    })
}
