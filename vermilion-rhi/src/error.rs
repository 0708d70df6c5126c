use std::sync::Arc;

pub type VermilionResult<T> = Result<T, VermilionError>;

/// Generic error that contains all the different kinds of errors that may occur when
/// using the RHI
#[derive(Debug, Clone)]
pub enum VermilionError {
    StringError(String),
    IoError(Arc<std::io::Error>),
    /// The operation is not provided by the active graphics backend
    Unsupported(&'static str),
    /// A handle did not resolve to a live resource of the expected kind
    InvalidHandle,
    /// A map/update touched memory outside the resource's bounds
    OutOfBounds,
    /// The render graph contains a dependency cycle; the payload names a node on it
    GraphCycle(String),
    /// A serialized blob declared a version this build does not understand
    UnsupportedVersion(u32),
    /// A serialized blob declared a compression mode byte this build does not know
    UnknownCompressionMode(u8),
    /// A known compression mode that was not compiled into this build
    CompressionNotCompiledIn(&'static str),
}

impl std::error::Error for VermilionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            VermilionError::IoError(ref e) => Some(&**e),
            _ => None,
        }
    }
}

impl core::fmt::Display for VermilionError {
    fn fmt(
        &self,
        fmt: &mut core::fmt::Formatter,
    ) -> core::fmt::Result {
        match *self {
            VermilionError::StringError(ref e) => e.fmt(fmt),
            VermilionError::IoError(ref e) => e.fmt(fmt),
            VermilionError::Unsupported(what) => write!(fmt, "unsupported operation: {}", what),
            VermilionError::InvalidHandle => write!(fmt, "invalid resource handle"),
            VermilionError::OutOfBounds => write!(fmt, "access out of resource bounds"),
            VermilionError::GraphCycle(ref node) => {
                write!(fmt, "render graph cycle involving node '{}'", node)
            }
            VermilionError::UnsupportedVersion(version) => {
                write!(fmt, "unsupported descriptor version {}", version)
            }
            VermilionError::UnknownCompressionMode(mode) => {
                write!(fmt, "unknown compression mode byte {}", mode)
            }
            VermilionError::CompressionNotCompiledIn(what) => {
                write!(fmt, "compression mode {} is not compiled in", what)
            }
        }
    }
}

impl From<&str> for VermilionError {
    fn from(str: &str) -> Self {
        VermilionError::StringError(str.to_string())
    }
}

impl From<String> for VermilionError {
    fn from(string: String) -> Self {
        VermilionError::StringError(string)
    }
}

impl From<std::io::Error> for VermilionError {
    fn from(error: std::io::Error) -> Self {
        VermilionError::IoError(Arc::new(error))
    }
}
