pub mod cc;
pub use cc::{Button, Control, Encoder};

pub mod sysex;
pub use sysex::Rgb;
