use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Failed to parse date '{value}' in {source_name} row {row}")]
    ParseError {
        source_name: String,
        row: usize,
        value: String,
    },
}
