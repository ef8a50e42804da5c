#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConsolidateError {
    #[error("input has no header row")]
    EmptyTable,
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("sheet not found: {0}")]
    SheetNotFound(String),
    #[error("unsupported file type: {0}")]
    UnsupportedExtension(String),
}
