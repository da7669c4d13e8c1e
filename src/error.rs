use thiserror::Error;

#[derive(Error, Debug)]
pub enum TodoError {
    #[error("Invalid period selection: {0}")]
    InvalidPeriodSelection(String),

    #[error("Title cannot be empty")]
    EmptyTitle,

    #[error("Title is {len} characters long, the limit is {max}")]
    TitleTooLong { len: usize, max: usize },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Could not encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Store returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Store returned no rows")]
    EmptyResponse,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),

    #[error("Could not read config file")]
    Io(#[from] std::io::Error),

    #[error("Malformed config file: {0}")]
    Toml(#[from] toml::de::Error),
}
