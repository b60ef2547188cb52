use std::fmt::{self, Write};

use crate::{
    host::Host,
    native::NativeLocation,
    types::{WrapperTrait, WrapperType},
};

/// Immutable wrapper around a copied source location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LocationWrapper {
    loc: NativeLocation,
}

impl LocationWrapper {
    #[must_use]
    pub fn new(loc: NativeLocation) -> Self {
        Self { loc }
    }

    #[must_use]
    pub fn loc(self) -> NativeLocation {
        self.loc
    }

    /// `Location(file='<file>', line=<line>)`
    pub fn repr_fmt(self, f: &mut impl Write, host: &impl Host) -> fmt::Result {
        write!(
            f,
            "Location(file='{}', line={})",
            host.location_file(self.loc),
            self.loc.line
        )
    }

    /// `<file>:<line>`
    pub fn str_fmt(self, f: &mut impl Write, host: &impl Host) -> fmt::Result {
        write!(f, "{}:{}", host.location_file(self.loc), self.loc.line)
    }
}

impl WrapperTrait for LocationWrapper {
    fn wrapper_type(&self) -> WrapperType {
        WrapperType::Location
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::host::InMemoryHost;

    #[test]
    fn formats_file_and_line() {
        let mut host = InMemoryHost::new();
        let wrapper = LocationWrapper::new(host.location("foo.c", 42));

        let mut repr = String::new();
        wrapper.repr_fmt(&mut repr, &host).unwrap();
        assert_eq!(repr, "Location(file='foo.c', line=42)");

        let mut display = String::new();
        wrapper.str_fmt(&mut display, &host).unwrap();
        assert_eq!(display, "foo.c:42");
    }

    #[test]
    fn file_names_are_not_escaped() {
        let mut host = InMemoryHost::new();
        let wrapper = LocationWrapper::new(host.location("it's.c", 1));

        let mut repr = String::new();
        wrapper.repr_fmt(&mut repr, &host).unwrap();
        assert_eq!(repr, "Location(file='it's.c', line=1)");
    }
}
