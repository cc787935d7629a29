use thiserror::Error;

/// Errors surfaced by models, layers and services.
///
/// Every variant carries a human-readable message. Nothing in this crate
/// retries; errors are returned to the immediate caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Invalid construction parameters (zero dimension, zero hidden width).
    #[error("invalid config: {0}")]
    Config(String),
    /// A vector or matrix length does not match the configured shape.
    #[error("invalid dimension: {0}")]
    Dimension(String),
    /// A label or range argument lies outside its required domain.
    #[error("invalid domain: {0}")]
    Domain(String),
    /// An operation was called out of sequence (backward before forward).
    #[error("invalid state: {0}")]
    State(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn dimension(what: &str, expected: usize, got: usize) -> Self {
        Error::Dimension(format!("{what} has len {got}, expected {expected}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_the_error_kind() {
        let err = Error::Config("dim must be > 0".to_owned());
        assert_eq!(err.to_string(), "invalid config: dim must be > 0");

        let err = Error::dimension("x", 2, 3);
        assert_eq!(err.to_string(), "invalid dimension: x has len 3, expected 2");
    }
}
