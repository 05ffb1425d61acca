use crate::derive::derive_columns;
use crate::error::DatasetError;
use crate::loader::{MACRO_SOURCE, PRICE_SOURCE};
use crate::parse::{Coerced, DateFormat, coerce_number, detect_date_format, parse_date};
use chrono::NaiveDate;
use configuration::MergeParams;
use core_types::{CoreError, MacroRow, PriceRow, TimeSeriesRow};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A numeric cell that could not be parsed and was replaced by null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoercionWarning {
    pub source_name: String,
    /// One-based data row (the header is not counted).
    pub row: usize,
    pub column: String,
    pub value: String,
}

/// Bookkeeping about how the two inputs combined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    pub price_rows: usize,
    pub macro_rows: usize,
    pub joined_rows: usize,
    /// Distinct price dates with no macro row.
    pub unmatched_price_dates: usize,
    /// Distinct macro dates with no price row.
    pub unmatched_macro_dates: usize,
    /// Joined dates that appear more than once in either input.
    pub duplicate_dates: usize,
    pub coercion_warnings: Vec<CoercionWarning>,
}

/// The joined, sorted and derived series together with its merge report.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedDataset {
    pub rows: Vec<TimeSeriesRow>,
    pub report: MergeReport,
}

/// Joins the two raw datasets with the default window parameters.
///
/// Fails with a `ParseError` if any date cell cannot be parsed; bad numeric
/// cells degrade to null.
pub fn merge(prices: &[PriceRow], macros: &[MacroRow]) -> Result<Vec<TimeSeriesRow>, DatasetError> {
    Ok(DatasetMerger::default().merge(prices, macros)?.rows)
}

/// A stateless joiner of price and macro rows.
#[derive(Debug, Clone, Default)]
pub struct DatasetMerger {
    params: MergeParams,
}

impl DatasetMerger {
    pub fn new(params: MergeParams) -> Self {
        Self { params }
    }

    /// Inner-joins on date, sorts ascending and computes the derived columns.
    ///
    /// When a date repeats, every price row for it is paired with every macro
    /// row for it, in input order.
    pub fn merge(&self, prices: &[PriceRow], macros: &[MacroRow]) -> Result<MergedDataset, DatasetError> {
        let price_dates = date_format(PRICE_SOURCE, prices.iter().map(|r| r.date.as_str()));
        let macro_dates = date_format(MACRO_SOURCE, macros.iter().map(|r| r.date.as_str()));

        let mut warnings = Vec::new();
        let typed_prices = prices
            .iter()
            .enumerate()
            .map(|(i, row)| TypedPrice::parse(i + 1, row, price_dates, &mut warnings))
            .collect::<Result<Vec<_>, _>>()?;
        let typed_macros = macros
            .iter()
            .enumerate()
            .map(|(i, row)| TypedMacro::parse(i + 1, row, macro_dates, &mut warnings))
            .collect::<Result<Vec<_>, _>>()?;

        let mut macros_by_date: BTreeMap<NaiveDate, Vec<&TypedMacro>> = BTreeMap::new();
        for m in &typed_macros {
            macros_by_date.entry(m.date).or_default().push(m);
        }

        let mut rows = Vec::new();
        let mut price_counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for p in &typed_prices {
            *price_counts.entry(p.date).or_default() += 1;
            if let Some(matches) = macros_by_date.get(&p.date) {
                rows.extend(matches.iter().map(|m| join(p, m)));
            }
        }
        // Stable, so duplicate-date rows keep their pairing order.
        rows.sort_by_key(|r| r.date);

        derive_columns(&mut rows, &self.params)?;

        let joined_dates: HashSet<NaiveDate> = rows.iter().map(|r| r.date).collect();
        let report = MergeReport {
            price_rows: prices.len(),
            macro_rows: macros.len(),
            joined_rows: rows.len(),
            unmatched_price_dates: price_counts.keys().filter(|d| !joined_dates.contains(*d)).count(),
            unmatched_macro_dates: macros_by_date.keys().filter(|d| !joined_dates.contains(*d)).count(),
            duplicate_dates: joined_dates
                .iter()
                .filter(|d| price_counts[*d] > 1 || macros_by_date[*d].len() > 1)
                .count(),
            coercion_warnings: warnings,
        };

        if report.duplicate_dates > 0 {
            tracing::warn!(
                duplicate_dates = report.duplicate_dates,
                "Inputs repeat dates; joined rows were multiplied."
            );
        }
        tracing::info!(
            price_rows = report.price_rows,
            macro_rows = report.macro_rows,
            joined_rows = report.joined_rows,
            coercion_warnings = report.coercion_warnings.len(),
            "Merged datasets."
        );

        Ok(MergedDataset { rows, report })
    }
}

/// Detects the date layout of one source's date column.
fn date_format<'a>(source_name: &str, cells: impl Iterator<Item = &'a str>) -> Option<DateFormat> {
    let cells: Vec<&str> = cells.collect();
    let format = detect_date_format(cells.iter().copied());
    match format {
        Some(fmt) => tracing::debug!(source = source_name, pattern = fmt.pattern(), "Detected date layout."),
        None if cells.iter().any(|c| !c.trim().is_empty()) => {
            tracing::warn!(source = source_name, "Date column mixes layouts; parsing cell by cell.")
        }
        None => {}
    }
    format
}

struct TypedPrice {
    date: NaiveDate,
    gold_close: Option<f64>,
    silver_close: Option<f64>,
    gold_returns: Option<f64>,
    silver_returns: Option<f64>,
}

impl TypedPrice {
    fn parse(
        row: usize,
        raw: &PriceRow,
        date_format: Option<DateFormat>,
        warnings: &mut Vec<CoercionWarning>,
    ) -> Result<Self, CoreError> {
        let mut cells = Cells { source_name: PRICE_SOURCE, row, date_format, warnings };
        Ok(Self {
            date: cells.date(&raw.date)?,
            gold_close: cells.number("Gold_Price", &raw.gold_price),
            silver_close: cells.number("Silver_Price", &raw.silver_price),
            gold_returns: cells.number("Gold_Returns", &raw.gold_returns),
            silver_returns: cells.number("Silver_Returns", &raw.silver_returns),
        })
    }
}

struct TypedMacro {
    date: NaiveDate,
    india_cpi: Option<f64>,
    dxy: Option<f64>,
    us10y_yield: Option<f64>,
    googletrends_gold: Option<f64>,
    googletrends_silver: Option<f64>,
}

impl TypedMacro {
    fn parse(
        row: usize,
        raw: &MacroRow,
        date_format: Option<DateFormat>,
        warnings: &mut Vec<CoercionWarning>,
    ) -> Result<Self, CoreError> {
        let mut cells = Cells { source_name: MACRO_SOURCE, row, date_format, warnings };
        Ok(Self {
            date: cells.date(&raw.date)?,
            india_cpi: cells.number("India_CPI", &raw.india_cpi),
            dxy: cells.number("DXY", &raw.dxy),
            us10y_yield: cells.number("US10Y_Yield", &raw.us10y_yield),
            googletrends_gold: cells.number("GoogleTrends_Gold", &raw.googletrends_gold),
            googletrends_silver: cells.number("GoogleTrends_Silver", &raw.googletrends_silver),
        })
    }
}

/// Parses the cells of one source row, recording coercion warnings.
struct Cells<'a> {
    source_name: &'static str,
    row: usize,
    date_format: Option<DateFormat>,
    warnings: &'a mut Vec<CoercionWarning>,
}

impl Cells<'_> {
    fn date(&self, raw: &str) -> Result<NaiveDate, CoreError> {
        let parsed = match self.date_format {
            Some(fmt) => fmt.parse(raw),
            None => parse_date(raw),
        };
        parsed.ok_or_else(|| CoreError::ParseError {
            source_name: self.source_name.to_string(),
            row: self.row,
            value: raw.to_string(),
        })
    }

    fn number(&mut self, column: &str, raw: &str) -> Option<f64> {
        let coerced = coerce_number(raw);
        if coerced == Coerced::Invalid {
            tracing::warn!(
                source = self.source_name,
                row = self.row,
                column,
                value = raw,
                "Unparseable numeric value replaced with null."
            );
            self.warnings.push(CoercionWarning {
                source_name: self.source_name.to_string(),
                row: self.row,
                column: column.to_string(),
                value: raw.to_string(),
            });
        }
        coerced.value()
    }
}

fn join(p: &TypedPrice, m: &TypedMacro) -> TimeSeriesRow {
    TimeSeriesRow {
        date: p.date,
        gold_close: p.gold_close,
        silver_close: p.silver_close,
        gold_returns: p.gold_returns,
        silver_returns: p.silver_returns,
        dxy: m.dxy,
        us10y_yield: m.us10y_yield,
        india_cpi: m.india_cpi,
        googletrends_gold: m.googletrends_gold,
        googletrends_silver: m.googletrends_silver,
        ..TimeSeriesRow::empty(p.date)
    }
}
