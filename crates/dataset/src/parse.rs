//! Lenient cell parsing for spreadsheet exports.

use chrono::{NaiveDate, NaiveDateTime};

/// A date layout applied to a whole column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFormat {
    pattern: &'static str,
    with_time: bool,
}

impl DateFormat {
    const fn date(pattern: &'static str) -> Self {
        Self { pattern, with_time: false }
    }

    const fn datetime(pattern: &'static str) -> Self {
        Self { pattern, with_time: true }
    }

    pub fn pattern(&self) -> &'static str {
        self.pattern
    }

    /// Parses one cell, discarding any time-of-day component.
    pub fn parse(&self, raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        if self.with_time {
            NaiveDateTime::parse_from_str(raw, self.pattern).ok().map(|dt| dt.date())
        } else {
            NaiveDate::parse_from_str(raw, self.pattern).ok()
        }
    }
}

/// Candidate layouts in order of preference. Month-first precedes day-first.
const DATE_FORMATS: [DateFormat; 10] = [
    DateFormat::date("%Y-%m-%d"),
    DateFormat::date("%Y/%m/%d"),
    DateFormat::date("%m/%d/%Y"),
    DateFormat::date("%d/%m/%Y"),
    DateFormat::date("%m-%d-%Y"),
    DateFormat::date("%d-%m-%Y"),
    DateFormat::datetime("%Y-%m-%d %H:%M:%S"),
    DateFormat::datetime("%Y-%m-%dT%H:%M:%S"),
    DateFormat::datetime("%Y-%m-%d %H:%M:%S%.f"),
    DateFormat::datetime("%Y-%m-%dT%H:%M:%S%.f"),
];

/// Cells that spreadsheets use for "no value".
const NULL_TOKENS: [&str; 8] = ["nan", "null", "none", "n/a", "na", "#n/a", "-", "--"];

/// Picks the first layout that parses every non-empty cell of a column.
///
/// Returns `None` for a column with no non-empty cells or one that mixes
/// layouts; callers then fall back to `parse_date` cell by cell.
pub fn detect_date_format<'a, I>(cells: I) -> Option<DateFormat>
where
    I: IntoIterator<Item = &'a str>,
{
    let cells: Vec<&str> = cells.into_iter().map(str::trim).filter(|c| !c.is_empty()).collect();
    if cells.is_empty() {
        return None;
    }
    DATE_FORMATS
        .into_iter()
        .find(|fmt| cells.iter().all(|cell| fmt.parse(cell).is_some()))
}

/// Parses a single date cell with the first layout that accepts it.
///
/// Month-first forms are tried before day-first, so `03/04/2024` is the 4th
/// of March.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DATE_FORMATS.iter().find_map(|fmt| fmt.parse(raw))
}

/// The outcome of coercing a numeric cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coerced {
    Value(f64),
    /// Empty or an explicit null marker.
    Null,
    /// Text that is not a finite number.
    Invalid,
}

impl Coerced {
    pub fn value(self) -> Option<f64> {
        match self {
            Coerced::Value(v) => Some(v),
            Coerced::Null | Coerced::Invalid => None,
        }
    }
}

/// Coerces a cell to `f64`.
///
/// Commas are accepted only as thousands separators (`1,234.5`); any other
/// comma, such as a decimal comma in `1,5`, makes the cell invalid.
pub fn coerce_number(raw: &str) -> Coerced {
    let raw = raw.trim();
    if raw.is_empty() || NULL_TOKENS.iter().any(|t| raw.eq_ignore_ascii_case(t)) {
        return Coerced::Null;
    }

    let cleaned;
    let candidate = if raw.contains(',') {
        if !has_thousands_grouping(raw) {
            return Coerced::Invalid;
        }
        cleaned = raw.replace(',', "");
        cleaned.as_str()
    } else {
        raw
    };

    match candidate.parse::<f64>() {
        Ok(v) if v.is_finite() => Coerced::Value(v),
        _ => Coerced::Invalid,
    }
}

/// True for `-?d{1,3}(,ddd)+(.d+)?`.
fn has_thousands_grouping(raw: &str) -> bool {
    let unsigned = raw.strip_prefix('-').unwrap_or(raw);
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };
    if fraction.is_some_and(|f| f.is_empty() || !f.bytes().all(|b| b.is_ascii_digit())) {
        return false;
    }

    let mut groups = integer.split(',');
    let leading_ok = groups
        .next()
        .is_some_and(|g| (1..=3).contains(&g.len()) && g.bytes().all(|b| b.is_ascii_digit()));
    leading_ok && groups.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_common_date_layouts() {
        assert_eq!(parse_date("2024-03-04"), Some(ymd(2024, 3, 4)));
        assert_eq!(parse_date("2024/03/04"), Some(ymd(2024, 3, 4)));
        // Ambiguous cells read month-first.
        assert_eq!(parse_date("03-04-2024"), Some(ymd(2024, 3, 4)));
        assert_eq!(parse_date("03/04/2024"), Some(ymd(2024, 3, 4)));
        // Only valid day-first.
        assert_eq!(parse_date("31/12/2024"), Some(ymd(2024, 12, 31)));
        assert_eq!(parse_date(" 2024-03-04 00:00:00 "), Some(ymd(2024, 3, 4)));
        assert_eq!(parse_date("2024-03-04T16:30:00.250"), Some(ymd(2024, 3, 4)));
    }

    #[test]
    fn rejects_unparseable_dates() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("2024-13-01"), None);
    }

    #[test]
    fn coerces_numbers_leniently() {
        assert_eq!(coerce_number("1,234.5"), Coerced::Value(1234.5));
        assert_eq!(coerce_number(" -0.0125 "), Coerced::Value(-0.0125));
        assert_eq!(coerce_number(""), Coerced::Null);
        assert_eq!(coerce_number("NaN"), Coerced::Null);
        assert_eq!(coerce_number("#N/A"), Coerced::Null);
        assert_eq!(coerce_number("abc"), Coerced::Invalid);
        assert_eq!(coerce_number("inf"), Coerced::Invalid);
        assert_eq!(coerce_number("abc").value(), None);
    }

    #[test]
    fn commas_only_count_as_thousands_separators() {
        assert_eq!(coerce_number("12,345,678"), Coerced::Value(12_345_678.0));
        assert_eq!(coerce_number("-1,000.25"), Coerced::Value(-1000.25));
        assert_eq!(coerce_number("1,5"), Coerced::Invalid);
        assert_eq!(coerce_number("1,50"), Coerced::Invalid);
        assert_eq!(coerce_number("1234,567"), Coerced::Invalid);
        assert_eq!(coerce_number("1,234."), Coerced::Invalid);
        assert_eq!(coerce_number(",123"), Coerced::Invalid);
    }

    #[test]
    fn detects_one_layout_per_column() {
        let us = ["12/31/2023", "01/02/2024", "01/03/2024"];
        let fmt = detect_date_format(us).unwrap();
        assert_eq!(fmt.pattern(), "%m/%d/%Y");
        let dates: Vec<_> = us.iter().map(|c| fmt.parse(c).unwrap()).collect();
        assert_eq!(dates, vec![ymd(2023, 12, 31), ymd(2024, 1, 2), ymd(2024, 1, 3)]);

        let eu = ["02/01/2024", "31/01/2024", ""];
        assert_eq!(detect_date_format(eu).unwrap().pattern(), "%d/%m/%Y");

        assert_eq!(
            detect_date_format(["2024-01-02 09:30:00", "2024-01-03 16:00:00"]).unwrap().pattern(),
            "%Y-%m-%d %H:%M:%S"
        );
    }

    #[test]
    fn mixed_or_empty_columns_have_no_layout() {
        assert_eq!(detect_date_format(["2024-01-02", "01/03/2024"]), None);
        assert_eq!(detect_date_format(["", "  "]), None);
    }
}
