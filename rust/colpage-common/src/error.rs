use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_format(element: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidFormat {
                element: element.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        Error(ErrorKind::InvalidOperation { name: name.into() }.into())
    }

    /// The requested decoding is not available for the column's physical type,
    /// or has been excluded by configuration.
    pub fn unsupported(message: impl Into<String>) -> Error {
        Error(
            ErrorKind::Unsupported {
                message: message.into(),
            }
            .into(),
        )
    }

    /// The page yielded fewer values than the caller asked for.
    pub fn decode_count_mismatch(expected: usize, actual: usize) -> Error {
        Error(ErrorKind::DecodeCountMismatch { expected, actual }.into())
    }

    pub fn unexpected_eof(element: impl Into<String>) -> Error {
        Error(
            ErrorKind::UnexpectedEof {
                element: element.into(),
            }
            .into(),
        )
    }

    /// Returns `true` for errors caused by corrupt or truncated page content.
    pub fn is_corrupt_data(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidFormat { .. }
                | ErrorKind::UnexpectedEof { .. }
                | ErrorKind::DecodeCountMismatch { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    #[error("unsupported: {message}")]
    Unsupported { message: String },

    #[error("number of values decoded ({actual}) did not match the expected count ({expected})")]
    DecodeCountMismatch { expected: usize, actual: usize },

    #[error("invalid page format for '{element}': {message}")]
    InvalidFormat { element: String, message: String },

    #[error("unexpected end of page data while reading '{element}'")]
    UnexpectedEof { element: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}
