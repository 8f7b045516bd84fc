use thiserror::Error;

use crate::cli::CLIError;

pub type Result<T> = std::result::Result<T, Error>;

/// Every error the library can produce, on either side of the wire
#[derive(Debug, Error)]
pub enum Error {
    #[error("No response from server")]
    NoResponse,

    /// The peer closed the connection before a full message was read
    #[error("Connection reset by peer")]
    ConnectionReset,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed HTTP message: {0}")]
    Http(#[from] httparse::Error),

    /// Raised when registering a path in the router fails. This is a programming error.
    #[error("Invalid route: {0}")]
    Route(#[from] matchit::InsertError),

    #[error(transparent)]
    Cli(#[from] CLIError),
}

impl Error {
    /// HTTP status code matching this error when it escapes a request handler
    pub fn status_code(&self) -> u16 {
        match self {
            Error::NotFound(_) => 404,
            Error::BadRequest(_) | Error::Json(_) | Error::Http(_) => 400,
            _ => 500,
        }
    }
}
