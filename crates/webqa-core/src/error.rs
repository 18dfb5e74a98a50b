use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Network, I/O or parse failure while fetching one source. Recoverable per URL.
    #[error("Failed to acquire content from {url}: {message}")]
    Acquisition { url: String, message: String },

    /// A strategy could not load its model or resources.
    #[error("Failed to initialize {model}: {message}")]
    Initialization { model: String, message: String },

    #[error("Scoring failed: {0}")]
    Scoring(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    pub fn acquisition(url: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Acquisition { url: url.into(), message: message.to_string() }
    }

    pub fn initialization(model: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Initialization { model: model.into(), message: message.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
