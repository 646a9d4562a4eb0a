//! Positional column references (`GROUP BY 2`, `ORDER BY 1`).

use crate::error::PushdownError;
use crate::plan::{Literal, LiteralKind, ResultColumn};

/// Resolve a 1-based ordinal literal to a 0-based result column index.
///
/// The same rule applies to `ORDER BY` positional references.
pub fn result_from_number(
    result_columns: &[ResultColumn],
    lit: &Literal,
) -> Result<usize, PushdownError> {
    if lit.kind != LiteralKind::Int {
        return Err(PushdownError::InvalidArgument(
            "column number is not an int".into(),
        ));
    }
    let num = parse_int(&lit.val).ok_or_else(|| {
        PushdownError::InvalidArgument(format!("error parsing column number: {}", lit.to_sql()))
    })?;
    if num < 1 || num > result_columns.len() as i64 {
        return Err(PushdownError::InvalidArgument(format!(
            "column number out of range: {num}"
        )));
    }
    Ok((num - 1) as usize)
}

/// Parse an integer literal, accepting `0x` hex and `0` octal spellings.
///
/// At most one leading sign is allowed, and the remaining text must consist
/// only of digits of the chosen radix.
fn parse_int(val: &str) -> Option<i64> {
    let (negative, rest) = match val.as_bytes().first() {
        Some(b'-') => (true, &val[1..]),
        Some(b'+') => (false, &val[1..]),
        _ => (false, val),
    };
    let (radix, digits) = if let Some(hex) = rest
        .strip_prefix("0x")
        .or_else(|| rest.strip_prefix("0X"))
    {
        (16, hex)
    } else if rest.len() > 1 && rest.starts_with('0') {
        (8, &rest[1..])
    } else {
        (10, rest)
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let magnitude = i64::from_str_radix(digits, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
