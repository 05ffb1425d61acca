use crate::error::DatasetError;
use calamine::{Data, Range, Reader, open_workbook_auto};
use core_types::{MacroRow, PriceRow};
use csv::StringRecord;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

pub const PRICE_SOURCE: &str = "prices";
pub const MACRO_SOURCE: &str = "macro";

const PRICE_COLUMNS: [&str; 5] = ["Date", "Gold_Price", "Silver_Price", "Gold_Returns", "Silver_Returns"];
const MACRO_COLUMNS: [&str; 5] = ["Date", "India_CPI", "DXY", "US10Y_Yield", "GoogleTrends_Gold"];
const MACRO_OPTIONAL: &str = "GoogleTrends_Silver";
const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Header lookup, case-insensitive and whitespace-trimmed.
struct ColumnMap {
    source_name: &'static str,
    index: HashMap<String, usize>,
}

impl ColumnMap {
    fn new(source_name: &'static str, headers: &StringRecord) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (normalize(h), i))
            .collect();
        Self { source_name, index }
    }

    fn require(&self, column: &str) -> Result<usize, DatasetError> {
        self.optional(column).ok_or_else(|| DatasetError::MissingColumn {
            source_name: self.source_name.to_string(),
            column: column.to_string(),
        })
    }

    fn optional(&self, column: &str) -> Option<usize> {
        self.index.get(&normalize(column)).copied()
    }
}

fn normalize(header: &str) -> String {
    header.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn cell(record: &StringRecord, index: Option<usize>) -> String {
    index
        .and_then(|i| record.get(i))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn open(path: &Path) -> Result<BufReader<File>, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(BufReader::new(file))
}

/// Reads the gold/silver price export.
///
/// Requires `Date`, `Gold_Price`, `Silver_Price`, `Gold_Returns` and
/// `Silver_Returns` columns; any others are ignored.
pub fn read_price_rows<R: Read>(reader: R) -> Result<Vec<PriceRow>, DatasetError> {
    let mut rdr = csv_reader(reader);
    let headers = rdr.headers()?.clone();
    price_rows(&headers, rdr.records().map(|r| r.map_err(DatasetError::from)))
}

/// Reads the macro indicator export.
///
/// Requires `Date`, `India_CPI`, `DXY`, `US10Y_Yield` and `GoogleTrends_Gold`;
/// `GoogleTrends_Silver` is read when present.
pub fn read_macro_rows<R: Read>(reader: R) -> Result<Vec<MacroRow>, DatasetError> {
    let mut rdr = csv_reader(reader);
    let headers = rdr.headers()?.clone();
    macro_rows(&headers, rdr.records().map(|r| r.map_err(DatasetError::from)))
}

fn price_rows<I>(headers: &StringRecord, records: I) -> Result<Vec<PriceRow>, DatasetError>
where
    I: Iterator<Item = Result<StringRecord, DatasetError>>,
{
    let columns = ColumnMap::new(PRICE_SOURCE, headers);
    let [date, gold, silver, gold_ret, silver_ret] = PRICE_COLUMNS.map(|c| columns.require(c));
    let (date, gold, silver, gold_ret, silver_ret) = (date?, gold?, silver?, gold_ret?, silver_ret?);

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        rows.push(PriceRow {
            date: cell(&record, Some(date)),
            gold_price: cell(&record, Some(gold)),
            silver_price: cell(&record, Some(silver)),
            gold_returns: cell(&record, Some(gold_ret)),
            silver_returns: cell(&record, Some(silver_ret)),
        });
    }

    tracing::debug!(rows = rows.len(), "Read price rows.");
    Ok(rows)
}

fn macro_rows<I>(headers: &StringRecord, records: I) -> Result<Vec<MacroRow>, DatasetError>
where
    I: Iterator<Item = Result<StringRecord, DatasetError>>,
{
    let columns = ColumnMap::new(MACRO_SOURCE, headers);
    let [date, cpi, dxy, yield_10y, trends_gold] = MACRO_COLUMNS.map(|c| columns.require(c));
    let (date, cpi, dxy, yield_10y, trends_gold) = (date?, cpi?, dxy?, yield_10y?, trends_gold?);
    let trends_silver = columns.optional(MACRO_OPTIONAL);

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        rows.push(MacroRow {
            date: cell(&record, Some(date)),
            india_cpi: cell(&record, Some(cpi)),
            dxy: cell(&record, Some(dxy)),
            us10y_yield: cell(&record, Some(yield_10y)),
            googletrends_gold: cell(&record, Some(trends_gold)),
            googletrends_silver: cell(&record, trends_silver),
        });
    }

    tracing::debug!(rows = rows.len(), silver_trends = trends_silver.is_some(), "Read macro rows.");
    Ok(rows)
}

/// True for spreadsheet workbooks, judged by file extension.
fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| WORKBOOK_EXTENSIONS.iter().any(|w| ext.eq_ignore_ascii_case(w)))
}

/// Reads the first worksheet as a header record plus data records.
fn read_first_sheet(path: &Path) -> Result<(StringRecord, Vec<StringRecord>), DatasetError> {
    let workbook_error = |source| DatasetError::Workbook {
        path: path.display().to_string(),
        source,
    };
    let mut workbook = open_workbook_auto(path).map_err(workbook_error)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DatasetError::EmptyWorkbook(path.display().to_string()))?
        .map_err(workbook_error)?;
    sheet_records(&range).ok_or_else(|| DatasetError::EmptyWorkbook(path.display().to_string()))
}

/// Splits a worksheet range into headers and records, dropping blank rows.
/// `None` when the sheet has no header row.
fn sheet_records(range: &Range<Data>) -> Option<(StringRecord, Vec<StringRecord>)> {
    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<StringRecord>());
    let headers = rows.next()?;
    let records = rows.filter(|r| r.iter().any(|c| !c.trim().is_empty())).collect();
    Some((headers, records))
}

/// Renders a worksheet cell the way a CSV export would.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        Data::Bool(v) => v.to_string(),
        // Serial dates become ISO dates; the time of day is never used.
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|dt| dt.date().format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| dt.as_f64().to_string()),
        Data::Error(e) => e.to_string(),
    }
}

/// Loads the price export from a CSV file or the first sheet of a workbook.
pub fn load_price_rows(path: &Path) -> Result<Vec<PriceRow>, DatasetError> {
    tracing::info!(path = %path.display(), "Loading price dataset.");
    if is_workbook(path) {
        let (headers, records) = read_first_sheet(path)?;
        price_rows(&headers, records.into_iter().map(Ok))
    } else {
        read_price_rows(open(path)?)
    }
}

/// Loads the macro export from a CSV file or the first sheet of a workbook.
pub fn load_macro_rows(path: &Path) -> Result<Vec<MacroRow>, DatasetError> {
    tracing::info!(path = %path.display(), "Loading macro dataset.");
    if is_workbook(path) {
        let (headers, records) = read_first_sheet(path)?;
        macro_rows(&headers, records.into_iter().map(Ok))
    } else {
        read_macro_rows(open(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_price_columns_by_name_in_any_order() {
        let data = "\
Silver_Returns,Date,gold_price,Silver_Price,Gold_Returns,Volume
0.01,2024-01-02,2050.5,23.1,0.002,100
,2024-01-03,2041.0,22.9,-0.004,200
";
        let rows = read_price_rows(data.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, "2024-01-02");
        assert_eq!(rows[0].gold_price, "2050.5");
        assert_eq!(rows[0].silver_returns, "0.01");
        assert_eq!(rows[1].silver_returns, "");
    }

    #[test]
    fn missing_required_column_is_reported() {
        let data = "Date,Gold_Price,Silver_Price,Gold_Returns\n2024-01-02,1,2,3\n";
        let err = read_price_rows(data.as_bytes()).unwrap_err();

        match err {
            DatasetError::MissingColumn { source_name, column } => {
                assert_eq!(source_name, "prices");
                assert_eq!(column, "Silver_Returns");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn optional_silver_trends_defaults_to_empty() {
        let data = "Date,India_CPI,DXY,US10Y_Yield,GoogleTrends_Gold\n2024-01-02,5.1,101.2,4.0,55\n";
        let rows = read_macro_rows(data.as_bytes()).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].dxy, "101.2");
        assert_eq!(rows[0].googletrends_silver, "");
    }

    #[test]
    fn loads_from_disk_and_reports_missing_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Date,India_CPI,DXY,US10Y_Yield,GoogleTrends_Gold,GoogleTrends_Silver").unwrap();
        writeln!(file, "2024-01-02,5.1,101.2,4.0,55,40").unwrap();

        let rows = load_macro_rows(file.path()).unwrap();
        assert_eq!(rows[0].googletrends_silver, "40");

        let err = load_macro_rows(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }

    fn sheet(cells: &[&[Data]]) -> Range<Data> {
        let width = cells.iter().map(|r| r.len()).max().unwrap_or(0) as u32;
        let mut range = Range::new((0, 0), (cells.len() as u32 - 1, width - 1));
        for (r, row) in cells.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                range.set_value((r as u32, c as u32), value.clone());
            }
        }
        range
    }

    #[test]
    fn worksheet_cells_render_like_csv_text() {
        let s = |v: &str| Data::String(v.to_string());
        let range = sheet(&[
            &[s("Date"), s("Gold_Price"), s("Silver_Price"), s("Gold_Returns"), s("Silver_Returns")],
            &[s("2024-01-02"), Data::Float(2050.5), Data::Int(23), Data::Float(0.002), Data::Empty],
            &[Data::Empty, Data::Empty, Data::Empty, Data::Empty, Data::Empty],
            &[s("2024-01-03"), s("n/a"), Data::Float(22.9), Data::Float(-0.004), Data::Float(0.01)],
        ]);

        let (headers, records) = sheet_records(&range).unwrap();
        let rows = price_rows(&headers, records.into_iter().map(Ok)).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].gold_price, "2050.5");
        assert_eq!(rows[0].silver_price, "23");
        assert_eq!(rows[0].silver_returns, "");
        assert_eq!(rows[1].date, "2024-01-03");
        assert_eq!(rows[1].gold_price, "n/a");
    }

    #[test]
    fn workbook_extensions_are_recognised() {
        assert!(is_workbook(Path::new("data/Gold_Silver.xlsx")));
        assert!(is_workbook(Path::new("macro.XLS")));
        assert!(!is_workbook(Path::new("macro.csv")));
        assert!(!is_workbook(Path::new("macro")));
    }

    #[test]
    fn missing_workbook_is_a_workbook_error() {
        let err = load_price_rows(Path::new("/definitely/not/here.xlsx")).unwrap_err();
        assert!(matches!(err, DatasetError::Workbook { .. }));
    }
}
