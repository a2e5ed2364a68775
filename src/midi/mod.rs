mod error;
pub use error::Error;

mod io;

pub mod msg;
pub use msg::Msg;

pub mod port;
pub use port::{DirectionalPorts, PortsIn, PortsOut};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Tag(u8);

impl Tag {
    pub const fn from(byte: u8) -> Self {
        Self(byte & 0xf0)
    }
}

impl From<Tag> for u8 {
    fn from(tag: Tag) -> u8 {
        tag.0
    }
}

impl PartialEq<u8> for Tag {
    fn eq(&self, byte: &u8) -> bool {
        self.0 == *byte
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Channel(u8);

impl Channel {
    pub const fn from(byte: u8) -> Self {
        Self(byte & 0x0f)
    }
}

impl From<Channel> for u8 {
    fn from(chan: Channel) -> u8 {
        chan.0
    }
}

impl std::ops::BitOr<Channel> for Tag {
    type Output = u8;

    fn bitor(self, chan: Channel) -> Self::Output {
        self.0 | chan.0
    }
}

pub mod sysex {
    pub const TAG: u8 = 0xf0;
    pub const END_TAG: u8 = 0xf7;
}

pub mod control_change {
    use super::Tag;

    pub const TAG: Tag = Tag::from(0xb0);
}

/// Relative encoders in two's complement mode.
pub mod relative {
    /// Converts a 7-bit two's complement value into a signed step count.
    #[inline]
    pub fn to_steps(value: u8) -> i8 {
        let value = value & 0x7f;
        if value < 0x40 {
            value as i8
        } else {
            (value as i16 - 0x80) as i8
        }
    }
}
