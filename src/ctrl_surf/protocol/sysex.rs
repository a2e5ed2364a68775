//! OP-1 sysex frames.
//!
//! Every frame is a fixed header followed by an optional body and the
//! sysex end tag. Only the identity reply needs decoding.

use crate::midi;

pub const IDENTIFY_REQUEST: [u8; 6] = [0xf0, 0x7e, 0x7f, 0x06, 0x01, 0xf7];
pub const ENABLE_REMOTE_MODE: [u8; 8] = [0xf0, 0x00, 0x20, 0x76, 0x00, 0x01, 0x02, 0xf7];
pub const DISABLE_REMOTE_MODE: [u8; 8] = [0xf0, 0x00, 0x20, 0x76, 0x00, 0x01, 0x00, 0xf7];

pub const TEXT_HEADER: [u8; 6] = [0xf0, 0x00, 0x20, 0x76, 0x00, 0x03];
pub const COLOR_HEADER: [u8; 6] = [0xf0, 0x00, 0x20, 0x76, 0x00, 0x04];

/// Bytes found at offsets 6 & 7 of the OP-1 identity reply.
pub const IDENTITY_SIGNATURE: [u8; 2] = [32, 118];
const IDENTITY_OFFSET: usize = 6;

const MAX_DATA: usize = 0x7f;

/// A display color, each channel in `0..=0x7f`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    /// Halves a `0x00RRGGBB` host color to the device 7 bits depth.
    pub fn from_clip_color(color: u32) -> Self {
        Self {
            r: ((color >> 16) & 0xff) as u8 >> 1,
            g: ((color >> 8) & 0xff) as u8 >> 1,
            b: (color & 0xff) as u8 >> 1,
        }
    }
}

pub fn identify_request() -> midi::Msg {
    IDENTIFY_REQUEST.into()
}

pub fn enable_remote_mode() -> midi::Msg {
    ENABLE_REMOTE_MODE.into()
}

pub fn disable_remote_mode() -> midi::Msg {
    DISABLE_REMOTE_MODE.into()
}

/// Encodes a text frame.
///
/// Surrounding whitespace is dropped, non ASCII chars are sent as spaces.
pub fn encode_text(content: &str) -> midi::Msg {
    let mut body = Vec::with_capacity(content.len() + 1);
    body.push(0);
    body.extend(
        content
            .trim()
            .chars()
            .take(MAX_DATA)
            .map(|c| if c.is_ascii() { c as u8 } else { b' ' }),
    );
    body[0] = (body.len() - 1) as u8;

    midi::Msg::new_sysex(&TEXT_HEADER, &body)
}

/// Encodes a color frame, one entry per track.
pub fn encode_color_frame(colors: &[Rgb]) -> midi::Msg {
    let colors = &colors[..colors.len().min(MAX_DATA)];

    let mut body = Vec::with_capacity(1 + 3 * colors.len());
    body.push(colors.len() as u8);
    for color in colors {
        body.extend([color.r & 0x7f, color.g & 0x7f, color.b & 0x7f]);
    }

    midi::Msg::new_sysex(&COLOR_HEADER, &body)
}

/// Checks whether `buf` is the OP-1 identity reply.
pub fn is_identify_response(buf: &[u8]) -> bool {
    buf.get(IDENTITY_OFFSET..IDENTITY_OFFSET + IDENTITY_SIGNATURE.len())
        == Some(IDENTITY_SIGNATURE.as_slice())
}
