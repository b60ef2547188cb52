use std::fmt::{self, Write};

use crate::types::{WrapperTrait, WrapperType};

/// String object handed to scripts by attribute accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Str(String);

impl Str {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Writes the quoted form of the string, escaping as a script literal.
    ///
    /// Only the repr of a string object goes through here. Declaration and
    /// location reprs put the raw name or file name between single quotes.
    pub fn repr_fmt(&self, f: &mut impl Write) -> fmt::Result {
        string_repr_fmt(&self.0, f)
    }
}

impl From<&str> for Str {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl WrapperTrait for Str {
    fn wrapper_type(&self) -> WrapperType {
        WrapperType::Str
    }

    fn estimate_size(&self) -> usize {
        std::mem::size_of::<Self>() + self.0.len()
    }
}

/// Writes `s` in single quotes, switching to double quotes when that avoids escaping.
pub(crate) fn string_repr_fmt(s: &str, f: &mut impl Write) -> fmt::Result {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    f.write_char(quote)?;
    for c in s.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c == quote => {
                f.write_char('\\')?;
                f.write_char(c)?;
            }
            c => f.write_char(c)?,
        }
    }
    f.write_char(quote)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repr(s: &str) -> String {
        let mut out = String::new();
        string_repr_fmt(s, &mut out).unwrap();
        out
    }

    #[test]
    fn quoting() {
        assert_eq!(repr("x"), "'x'");
        assert_eq!(repr("it's"), "\"it's\"");
        assert_eq!(repr("a'b\"c"), "'a\\'b\"c'");
        assert_eq!(repr("tab\there"), "'tab\\there'");
    }
}
