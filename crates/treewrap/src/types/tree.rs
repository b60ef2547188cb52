use std::fmt::{self, Write};

use crate::{
    exception::{WrapError, WrapResult},
    host::Host,
    native::NativeNodeHandle,
    types::{TreeClass, WrapperTrait, WrapperType},
};

/// Wrapper around a native tree node.
///
/// Holds the handle and the raw code it was classified from. The node itself
/// stays owned by the host; the wrapper never frees or mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TreeWrapper {
    handle: NativeNodeHandle,
    code: u16,
    wrapper_type: WrapperType,
}

impl TreeWrapper {
    #[must_use]
    pub fn new(handle: NativeNodeHandle, code: u16, wrapper_type: WrapperType) -> Self {
        Self {
            handle,
            code,
            wrapper_type,
        }
    }

    #[must_use]
    pub fn handle(&self) -> NativeNodeHandle {
        self.handle
    }

    #[must_use]
    pub fn code(&self) -> u16 {
        self.code
    }

    #[must_use]
    pub fn is_declaration(&self) -> bool {
        self.wrapper_type.class() == Some(TreeClass::Declaration)
    }

    /// Returns the declaration's name as read from the host.
    ///
    /// Fails with `WrongType` on non-declarations and `Attribute` when the
    /// declaration is anonymous.
    pub fn declaration_name_str<'h>(&self, host: &'h impl Host) -> WrapResult<&'h str> {
        if !self.is_declaration() {
            return Err(WrapError::WrongType {
                expected: "Declaration",
                found: self.wrapper_type.name(),
            });
        }
        host.decl_name(self.handle)
            .ok_or_else(|| WrapError::attribute(self.wrapper_type.name(), "name"))
    }

    /// Writes the generic repr, `<TypeName object at 0x...>`.
    ///
    /// Declarations are rendered by the session, which needs the heap to
    /// build their name.
    pub fn repr_fmt(&self, f: &mut impl Write) -> fmt::Result {
        write!(f, "<{} object at {}>", self.wrapper_type.name(), self.handle)
    }
}

impl WrapperTrait for TreeWrapper {
    fn wrapper_type(&self) -> WrapperType {
        self.wrapper_type
    }
}
