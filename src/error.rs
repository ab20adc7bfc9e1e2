use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing API key or unreadable settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection failed, timeout
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response or empty completion
    #[error("API error: {0}")]
    Api(String),

    /// Payload was not usable JSON
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
