use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Failure to obtain a JSON document from a supply source.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Request never produced a body (DNS, refused connection, TLS, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Body arrived but was not JSON
    #[error("Parse error: {0}")]
    Parse(String),
}
