use super::{CtrlSurfEvent, Error};
use crate::midi;

#[derive(Debug)]
pub enum Msg {
    ToApp(CtrlSurfEvent),
    ToDevice(midi::Msg),
    ConnectionStatus(ConnectionStatus),
}

#[derive(Debug)]
pub enum ConnectionStatus {
    InProgress,
    Result(Result<(), Error>),
}

impl Msg {
    pub fn none() -> Vec<Msg> {
        Vec::with_capacity(0)
    }
}

impl CtrlSurfEvent {
    pub fn to_app(self) -> Msg {
        Msg::ToApp(self)
    }
}

impl midi::Msg {
    pub fn to_device(self) -> Msg {
        Msg::ToDevice(self)
    }
}

impl From<Msg> for Vec<Msg> {
    fn from(msg: Msg) -> Vec<Msg> {
        vec![msg]
    }
}

impl<T: Into<CtrlSurfEvent>> From<T> for Msg {
    fn from(event: T) -> Self {
        Self::ToApp(event.into())
    }
}

impl From<midi::Msg> for Msg {
    fn from(msg: midi::Msg) -> Self {
        Self::ToDevice(msg)
    }
}

impl From<ConnectionStatus> for Msg {
    fn from(status: ConnectionStatus) -> Self {
        Self::ConnectionStatus(status)
    }
}
