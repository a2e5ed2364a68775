use std::{borrow::Cow, fmt};

/// Hex dump of a MIDI byte stream, for logs and error messages.
#[derive(Clone, Debug, PartialEq)]
pub struct Displayable<'a>(Cow<'a, [u8]>);

impl<'a> From<&'a [u8]> for Displayable<'a> {
    fn from(buf: &'a [u8]) -> Self {
        Self(Cow::Borrowed(buf))
    }
}

impl From<Box<[u8]>> for Displayable<'static> {
    fn from(buf: Box<[u8]>) -> Self {
        Self(Cow::Owned(buf.into()))
    }
}

impl<'a> Displayable<'a> {
    pub fn to_owned(&self) -> Displayable<'static> {
        Displayable(Cow::Owned(self.0.to_vec()))
    }
}

impl<'a> fmt::Display for Displayable<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.0.iter();

        match iter.next() {
            Some(first) => write!(f, "[{first:02x}")?,
            None => return f.write_str("[]"),
        };

        for val in iter {
            write!(f, " {val:02x}")?;
        }

        f.write_str("]")
    }
}
