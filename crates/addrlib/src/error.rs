use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unsupported database format: {0}")]
    UnsupportedFormat(i32),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Unknown {field} encoding selector: {selector}")]
    UnknownEncoding { field: &'static str, selector: u8 },

    #[error("Identifier not found: {0}")]
    IdNotFound(u64),

    #[error("Address not found: {0:#x}")]
    AddressNotFound(u64),

    #[error("Invalid signature pattern: {0}")]
    PatternFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a failed index lookup
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::IdNotFound(_) | Error::AddressNotFound(_))
    }

    /// Check if this error was caused by the stream ending early
    pub fn is_truncated(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_not_found() {
        assert!(Error::IdNotFound(42).is_not_found());
        assert!(Error::AddressNotFound(0x1000).is_not_found());
        assert!(!Error::UnsupportedFormat(2).is_not_found());
    }

    #[test]
    fn test_error_is_truncated() {
        let eof = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read");
        assert!(Error::Io(eof).is_truncated());

        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(!Error::Io(denied).is_truncated());
        assert!(!Error::InvalidData("bad".to_string()).is_truncated());
    }

    #[test]
    fn test_error_messages() {
        let err = Error::UnknownEncoding {
            field: "identifier",
            selector: 9,
        };
        assert_eq!(err.to_string(), "Unknown identifier encoding selector: 9");
        assert_eq!(
            Error::AddressNotFound(0xFCFE0).to_string(),
            "Address not found: 0xfcfe0"
        );
    }
}
