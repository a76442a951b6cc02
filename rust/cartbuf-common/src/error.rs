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

    pub fn invalid_config(message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidConfig {
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn allocation_failed(bytes: usize, alignment: usize) -> Error {
        Error(ErrorKind::AllocationFailed { bytes, alignment }.into())
    }

    pub fn layout_overflow(what: impl Into<String>) -> Error {
        Error(ErrorKind::LayoutOverflow { what: what.into() }.into())
    }

    pub fn transfer_failed(direction: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::Transfer {
                direction: direction.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    /// Returns `true` if this is an `InvalidArgument` error.
    pub fn is_invalid_arg(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidArgument { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("failed to allocate {bytes} bytes with alignment {alignment}")]
    AllocationFailed { bytes: usize, alignment: usize },

    #[error("size computation overflow for '{what}'")]
    LayoutOverflow { what: String },

    #[error("memcopy {direction} failed: {message}")]
    Transfer { direction: String, message: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::alloc::LayoutError> for Error {
    fn from(_: std::alloc::LayoutError) -> Self {
        Error::layout_overflow("memory layout")
    }
}
