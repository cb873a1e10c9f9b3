use ndarray::Array2;

use crate::error::{PhonePoolError, Result};

/// Parses whitespace-delimited numeric rows into a (frames, dims) matrix.
///
/// Blank lines and `#` comments are ignored. Every row must have the same
/// width and at least one row must be present.
pub fn parse_feature_matrix(text: &str) -> Result<Array2<f32>> {
    let mut width: Option<usize> = None;
    let mut rows = 0usize;
    let mut flat = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let content = line.split_once('#').map_or(line, |(data, _)| data).trim();
        if content.is_empty() {
            continue;
        }

        let before = flat.len();
        for token in content.split_whitespace() {
            let value: f32 = token.parse().map_err(|_| {
                PhonePoolError::matrix(idx + 1, format!("invalid number \"{token}\""))
            })?;
            flat.push(value);
        }
        let row_width = flat.len() - before;

        match width {
            None => width = Some(row_width),
            Some(expected) if expected != row_width => {
                return Err(PhonePoolError::matrix(
                    idx + 1,
                    format!("expected {expected} columns, found {row_width}"),
                ));
            }
            Some(_) => {}
        }
        rows += 1;
    }

    let cols = width.ok_or_else(|| PhonePoolError::matrix(0, "no feature rows"))?;
    Array2::from_shape_vec((rows, cols), flat)
        .map_err(|err| PhonePoolError::matrix(0, err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_and_skips_comments() {
        let text = "# frames x dims\n1 2 3\n\n4.5 -5e-1 6 # trailing\n";
        let matrix = parse_feature_matrix(text).unwrap();
        assert_eq!(matrix.dim(), (2, 3));
        assert_eq!(matrix[[1, 0]], 4.5);
        assert_eq!(matrix[[1, 1]], -0.5);
    }

    #[test]
    fn single_row_is_one_frame() {
        let matrix = parse_feature_matrix("0.1 0.2 0.3 0.4").unwrap();
        assert_eq!(matrix.dim(), (1, 4));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = parse_feature_matrix("1 2\n3\n").unwrap_err();
        assert!(err.to_string().contains("line 2"), "unexpected: {err}");
    }

    #[test]
    fn non_numeric_and_empty_inputs_fail() {
        assert!(parse_feature_matrix("1 two 3").is_err());
        assert!(parse_feature_matrix("\n# nothing\n").is_err());
    }
}
