use thiserror::Error;

/// Rejected bookmark input. The session is left untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("place name must not be empty")]
    EmptyName,

    #[error("latitude {0} is outside -90..90")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside -180..180")]
    LongitudeOutOfRange(f64),

    #[error("{field} is not a number: {value:?}")]
    NotANumber { field: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum PopulationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file is neither UTF-8 nor CP949 encoded")]
    Encoding,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing column: {0}")]
    MissingColumn(String),

    #[error("non-numeric value {value:?} in column {column:?} for region {region:?}")]
    NotNumeric {
        region: String,
        column: String,
        value: String,
    },

    #[error("table has no regions")]
    Empty,
}

#[derive(Error, Debug)]
pub enum StockError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned status {0}")]
    Status(u16),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("malformed provider response: {0}")]
    Malformed(String),
}
