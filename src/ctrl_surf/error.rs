use crate::{bytes, midi};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid sysex from device: {}", .0)]
    InvalidSysEx(#[from] midi::Error),

    #[error("Unexpected device message: {}", .0)]
    UnexpectedDeviceMsg(bytes::Displayable<'static>),

    #[error("No identity reply from device after {attempts} attempts")]
    NoIdentifyResponse { attempts: usize },
}
