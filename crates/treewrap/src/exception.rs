use std::fmt;

use strum::{Display, EnumString, IntoStaticStr};

use crate::resource::ResourceError;

/// Result type alias for wrapper operations.
pub type WrapResult<T> = Result<T, WrapError>;

/// Script-visible exception types raised by this crate.
///
/// Uses strum derives for automatic `Display`, `FromStr`, and `Into<&'static str>` implementations.
/// The string representation matches the variant name exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum ExcType {
    AttributeError,
    MemoryError,
    /// Raised for broken internal contracts; the embedding layer should abort.
    SystemError,
    TypeError,
}

/// Errors produced by the wrapper factories and accessors.
///
/// Everything except [`WrapError::UnregisteredKindTag`] is recoverable and is
/// meant to surface as an exception in script code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WrapError {
    /// The heap refused to allocate a wrapper or an intermediate object.
    Allocation(ResourceError),
    /// An expected attribute could not be retrieved.
    Attribute { type_name: &'static str, attr: String },
    /// An accessor was applied to an object of the wrong type.
    WrongType { expected: &'static str, found: &'static str },
    /// The host produced a tree code the kind table has no entry for.
    ///
    /// This means the kind table is out of sync with the host's code
    /// enumeration. It is a contract violation, not a per-call failure.
    UnregisteredKindTag { code: u16 },
}

impl WrapError {
    pub(crate) fn attribute(type_name: &'static str, attr: impl Into<String>) -> Self {
        Self::Attribute {
            type_name,
            attr: attr.into(),
        }
    }

    /// Returns the exception type this error raises in script code.
    #[must_use]
    pub fn exc_type(&self) -> ExcType {
        match self {
            Self::Allocation(_) => ExcType::MemoryError,
            Self::Attribute { .. } => ExcType::AttributeError,
            Self::WrongType { .. } => ExcType::TypeError,
            Self::UnregisteredKindTag { .. } => ExcType::SystemError,
        }
    }

    /// True when the error reports a broken contract rather than a runtime failure.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::UnregisteredKindTag { .. })
    }

    /// Converts this error into the exception raised in script code.
    #[must_use]
    pub fn into_exception(self) -> Exception {
        Exception::new(self.exc_type(), Some(self.to_string()))
    }
}

impl fmt::Display for WrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allocation(err) => write!(f, "{err}"),
            Self::Attribute { type_name, attr } => {
                write!(f, "'{type_name}' object has no attribute '{attr}'")
            }
            Self::WrongType { expected, found } => {
                write!(f, "expected '{expected}' object, got '{found}'")
            }
            Self::UnregisteredKindTag { code } => {
                write!(f, "no wrapper type registered for tree code {code}")
            }
        }
    }
}

impl std::error::Error for WrapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Allocation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for WrapError {
    fn from(err: ResourceError) -> Self {
        Self::Allocation(err)
    }
}

/// An exception as the scripting environment sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exception {
    exc_type: ExcType,
    message: Option<String>,
}

impl Exception {
    #[must_use]
    pub fn new(exc_type: ExcType, message: Option<String>) -> Self {
        Self { exc_type, message }
    }

    #[must_use]
    pub fn exc_type(&self) -> ExcType {
        self.exc_type
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {message}", self.exc_type),
            None => write!(f, "{}", self.exc_type),
        }
    }
}

impl std::error::Error for Exception {}
