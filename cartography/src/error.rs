use thiserror::Error;

#[derive(Error, Debug)]
pub enum CartographyError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Hub error: {0}")]
    Hub(String),

    #[error("Hub request failed with status {status}: {body}")]
    HubStatus { status: u16, body: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, CartographyError>;
