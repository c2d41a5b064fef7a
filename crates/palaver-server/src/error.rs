use thiserror::Error;
use tokio_util::codec::LinesCodecError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line codec error: {0}")]
    Codec(LinesCodecError),
}

/// Transport failures unwrap to `Io`; only protocol-level framing
/// problems (an oversized line) stay `Codec`.
impl From<LinesCodecError> for ServerError {
    fn from(e: LinesCodecError) -> Self {
        match e {
            LinesCodecError::Io(e) => ServerError::Io(e),
            e => ServerError::Codec(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_failure_routes_to_io() {
        let e = LinesCodecError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "peer gone",
        ));
        assert!(matches!(ServerError::from(e), ServerError::Io(_)));
    }

    #[test]
    fn test_oversized_line_routes_to_codec() {
        let e = LinesCodecError::MaxLineLengthExceeded;
        assert!(matches!(ServerError::from(e), ServerError::Codec(_)));
    }
}
