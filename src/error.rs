/// Errors raised while loading a dataset or computing a render.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to fetch dataset: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("dataset header is missing required column `{column}`")]
    MissingColumn { column: String },

    #[error("dataset contains no records")]
    EmptyDataset,

    #[error("unknown field `{field}`")]
    UnknownField { field: String },

    #[error("record {row} has a missing or non-numeric value for `{field}`")]
    NonNumericValue { field: String, row: usize },

    #[error("no record has numeric values for both `{x_field}` and `{y_field}`")]
    NoPlottableRecords { x_field: String, y_field: String },

    #[error("invalid tick format `{0}`, expected [,][.precision](s|f|d)")]
    InvalidTickFormat(String),

    #[error("invalid selection change `{0}`, expected AT_MS:AXIS=FIELD")]
    InvalidChange(String),

    #[error("change at {at_ms} ms lies past the last sampled frame at {limit_ms} ms")]
    ScheduleTooLong { at_ms: f64, limit_ms: f64 },

    #[error("dataset has no numeric column to plot")]
    NoNumericFields,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
