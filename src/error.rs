use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    ConfigValidation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("input parse error: {0}")]
    InputParse(String),

    #[error("input validation error: {0}")]
    InputValidation(String),

    #[error("audit write error: {0}")]
    Audit(String),

    #[error("output write error: {0}")]
    Output(String),
}

pub type Result<T> = std::result::Result<T, Error>;
