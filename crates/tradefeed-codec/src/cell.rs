//! Cell representation: a tagged-union value for one column of one row.
//!
//! Resolves the spec's cell-representation open question in favor of
//! a single enum over true SoA columns (see `DESIGN.md`): it keeps
//! `upsert` a wholesale row replace at the cost of per-column
//! vectorization.

use std::fmt;

/// Fixed-scale rational, sufficient for prices and quantities without
/// floating-point drift. Value is `mantissa / 10^scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decimal {
    pub mantissa: i64,
    pub scale: u8,
}

impl Decimal {
    pub const ZERO: Decimal = Decimal {
        mantissa: 0,
        scale: 0,
    };

    /// Parses a decimal text like `"150.25"` or `"-3"`.
    ///
    /// Returns `None` on malformed input; callers coerce to `ZERO`.
    pub fn parse(s: &str) -> Option<Decimal> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        let (neg, s) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let mut parts = s.splitn(2, '.');
        let int_part = parts.next().unwrap_or("");
        let frac_part = parts.next();

        if int_part.is_empty() && frac_part.is_none() {
            return None;
        }
        if !int_part.is_empty() && !int_part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let (scale, digits) = match frac_part {
            Some(frac) => {
                if !frac.bytes().all(|b| b.is_ascii_digit()) || frac.len() > 18 {
                    return None;
                }
                (frac.len() as u8, format!("{int_part}{frac}"))
            }
            None => (0, int_part.to_string()),
        };

        let digits = if digits.is_empty() { "0" } else { &digits };
        let mantissa: i64 = digits.parse().ok()?;
        Some(Decimal {
            mantissa: if neg { -mantissa } else { mantissa },
            scale,
        })
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.mantissa);
        }
        let neg = self.mantissa < 0;
        let abs = self.mantissa.unsigned_abs();
        let scale = self.scale as usize;
        let digits = abs.to_string();
        let digits = if digits.len() <= scale {
            format!("{:0>width$}", digits, width = scale + 1)
        } else {
            digits
        };
        let split_at = digits.len() - scale;
        let (int_part, frac_part) = digits.split_at(split_at);
        if neg {
            write!(f, "-{int_part}.{frac_part}")
        } else {
            write!(f, "{int_part}.{frac_part}")
        }
    }
}

/// A single cell's runtime type and value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Null,
    Text(String),
    Int(i64),
    Decimal(Decimal),
    /// Milliseconds since the Unix epoch.
    Timestamp(i64),
}

impl Cell {
    /// Renders the cell as lower-cased text for substring search . Nulls render as the empty string so they never match a
    /// non-empty needle.
    pub fn to_lower_text(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Text(s) => s.to_lowercase(),
            Cell::Int(v) => v.to_string(),
            Cell::Decimal(d) => d.to_string(),
            Cell::Timestamp(ms) => ms.to_string(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => write!(f, ""),
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Int(v) => write!(f, "{v}"),
            Cell::Decimal(d) => write!(f, "{d}"),
            Cell::Timestamp(ms) => write!(f, "{ms}"),
        }
    }
}
