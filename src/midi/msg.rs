use super::Error;
use crate::bytes;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Msg(Box<[u8]>);

impl Msg {
    pub fn inner(&self) -> &[u8] {
        self.0.as_ref()
    }

    pub fn display(&self) -> bytes::Displayable<'_> {
        bytes::Displayable::from(self.0.as_ref())
    }

    /// Builds a sysex frame from a header, a payload and the end tag.
    ///
    /// `header` must start with the sysex tag.
    pub fn new_sysex(header: &[u8], payload: &[u8]) -> Self {
        use super::sysex;

        let mut buf = Vec::with_capacity(header.len() + payload.len() + 1);

        buf.extend(header);
        buf.extend(payload);
        buf.push(sysex::END_TAG);

        Self(buf.into())
    }

    pub fn is_sysex(&self) -> bool {
        self.0.first() == Some(&super::sysex::TAG)
    }

    /// Returns the bytes between the sysex tags.
    pub fn parse_sysex(&self) -> Result<&[u8], Error> {
        use super::sysex;

        if self.0.len() < 2 {
            return Err(Error::InvalidSysExSize(self.display().to_owned()));
        }

        if self.0[0] != sysex::TAG {
            return Err(Error::InvalidSysExInitTag(self.display().to_owned()));
        }

        if self.0[self.0.len() - 1] != sysex::END_TAG {
            return Err(Error::InvalidSysExFinalTag(self.display().to_owned()));
        }

        Ok(&self.0[1..self.0.len() - 1])
    }
}

impl<const S: usize> From<[u8; S]> for Msg {
    fn from(buf: [u8; S]) -> Self {
        Self(buf.into())
    }
}

impl From<&[u8]> for Msg {
    fn from(buf: &[u8]) -> Self {
        Self(buf.into())
    }
}

impl From<Vec<u8>> for Msg {
    fn from(buf: Vec<u8>) -> Self {
        Self(buf.into())
    }
}

impl std::ops::Deref for Msg {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sysex_framing() {
        let msg = Msg::new_sysex(&[0xf0, 0x00, 0x20], &[0x01, 0x02]);
        assert_eq!(msg.inner(), &[0xf0, 0x00, 0x20, 0x01, 0x02, 0xf7]);
        assert!(msg.is_sysex());
        assert_eq!(msg.parse_sysex().unwrap(), &[0x00, 0x20, 0x01, 0x02]);
    }

    #[test]
    fn invalid_sysex() {
        assert!(matches!(
            Msg::from([0xf0]).parse_sysex(),
            Err(Error::InvalidSysExSize(_))
        ));
        assert!(matches!(
            Msg::from([0xb0, 0x01, 0xf7]).parse_sysex(),
            Err(Error::InvalidSysExInitTag(_))
        ));
        assert!(matches!(
            Msg::from([0xf0, 0x01, 0x02]).parse_sysex(),
            Err(Error::InvalidSysExFinalTag(_))
        ));
    }
}
