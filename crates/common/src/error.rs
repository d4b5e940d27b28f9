//! Configuration loading errors

use thiserror::Error;

/// Errors raised while reading and validating configuration
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result alias using common Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_context() {
        let config_err = Error::Config("client_id must not be empty".into());
        assert_eq!(
            config_err.to_string(),
            "Configuration error: client_id must not be empty"
        );

        let io_err = Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "qq-oauth.toml",
        ));
        assert!(
            io_err.to_string().starts_with("I/O error:"),
            "got: {}",
            io_err
        );
    }

    #[test]
    fn toml_errors_convert() {
        let parse_err = toml::from_str::<toml::Table>("[client").unwrap_err();
        let err: Error = parse_err.into();
        assert!(matches!(err, Error::Toml(_)), "got: {err:?}");
        assert!(err.to_string().starts_with("TOML parse error:"));
    }
}
