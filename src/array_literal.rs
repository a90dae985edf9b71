//! Parsing of the packer's bracketed-tuple array lines
//!
//! The polygon export writes each of its three array fields on a single
//! line, e.g. `"vertices": [[10,0],[52,0],[52,60]],`. These lines are not
//! decoded as JSON; they are split into tuples and every token must be a
//! base-10 integer.

use regex::Regex;
use std::num::ParseIntError;
use std::sync::OnceLock;
use thiserror::Error;

/// Delimiter substituted for the comma between tuples.
const TUPLE_DELIMITER: char = '|';

/// Error type for array literal parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArrayLiteralError {
    /// Prefix and suffix lengths do not leave a valid slice of the line
    #[error(
        "cannot strip {prefix} leading and {suffix} trailing characters from a line of {len} bytes"
    )]
    Truncated { prefix: usize, suffix: usize, len: usize },
    /// An empty tuple such as `[]` inside a non-empty array
    #[error("empty tuple at position {position}")]
    EmptyTuple { position: usize },
    /// A token that is not a base-10 integer
    #[error("invalid integer '{token}': {source}")]
    InvalidToken {
        token: String,
        #[source]
        source: ParseIntError,
    },
}

fn separator_regex() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR
        .get_or_init(|| Regex::new(r"\]\s*,\s*\[").expect("tuple separator pattern is valid"))
}

/// Parse one array field line into integer tuples.
///
/// `prefix_len` bytes are removed from the front of the line (the field
/// label, e.g. `"vertices": `) and `suffix_len` bytes from the end (the
/// trailing `,` when present).
///
/// # Example
/// ```
/// use atlasmesh::array_literal::parse;
///
/// let line = r#""vertices": [[1, 2], [3, 4]],"#;
/// let tuples = parse(line, 12, 1).unwrap();
/// assert_eq!(tuples, vec![vec![1, 2], vec![3, 4]]);
/// ```
pub fn parse(
    line: &str,
    prefix_len: usize,
    suffix_len: usize,
) -> Result<Vec<Vec<i64>>, ArrayLiteralError> {
    let truncated =
        || ArrayLiteralError::Truncated { prefix: prefix_len, suffix: suffix_len, len: line.len() };

    let end = line.len().checked_sub(suffix_len).ok_or_else(truncated)?;
    let body = line.get(prefix_len..end).ok_or_else(truncated)?;

    let delimited = separator_regex().replace_all(body, TUPLE_DELIMITER.to_string().as_str());
    let segments: Vec<&str> = delimited
        .split(TUPLE_DELIMITER)
        .map(|segment| segment.trim_matches(|c: char| c == '[' || c == ']' || c.is_whitespace()))
        .collect();

    // `[]` leaves a single empty segment
    if segments.len() == 1 && segments[0].is_empty() {
        return Ok(Vec::new());
    }

    segments
        .iter()
        .enumerate()
        .map(|(position, segment)| {
            if segment.is_empty() {
                return Err(ArrayLiteralError::EmptyTuple { position });
            }
            segment.split(',').map(parse_token).collect()
        })
        .collect()
}

fn parse_token(token: &str) -> Result<i64, ArrayLiteralError> {
    let token = token.trim();
    token
        .parse::<i64>()
        .map_err(|source| ArrayLiteralError::InvalidToken { token: token.to_string(), source })
}
