use crossbeam_channel as channel;
use std::sync::Arc;

use super::{Error, Msg};

/// Input side: incoming messages are forwarded to the bridge loop.
pub type MidiIn = Connection<midir::MidiInput, midir::MidiInputConnection<Feed>, Feed>;
pub type MidiOut = Connection<midir::MidiOutput, midir::MidiOutputConnection, ()>;

/// Data handed over to the midir input callback.
#[derive(Clone)]
pub struct Feed(channel::Sender<Msg>);

pub enum Connection<IO: midir::MidiIO, C, D> {
    Connected(C),
    Disconnected((IO, D)),
    None,
}

impl<IO: midir::MidiIO, C, D> Default for Connection<IO, C, D> {
    fn default() -> Self {
        Self::None
    }
}

impl<IO: midir::MidiIO, C, D> Connection<IO, C, D> {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_))
    }
}

impl MidiIn {
    pub fn try_new(client_name: &str, msg_tx: channel::Sender<Msg>) -> Result<Self, Error> {
        let mut midi_input = midir::MidiInput::new(client_name)?;
        // Device identity replies are sysex
        midi_input.ignore(midir::Ignore::TimeAndActiveSense);

        Ok(Self::Disconnected((midi_input, Feed(msg_tx))))
    }

    pub fn connect(
        &mut self,
        port_name: Arc<str>,
        port: &midir::MidiInputPort,
        client_port_name: &str,
    ) -> Result<(), Error> {
        self.disconnect();
        match std::mem::take(self) {
            Self::Disconnected((midi_input, feed)) => {
                let callback = |_ts: u64, buf: &[u8], feed: &mut Feed| {
                    if feed.0.send(Msg::from(buf)).is_err() {
                        log::trace!("MIDI In: bridge loop is gone");
                    }
                };

                match midi_input.connect(port, client_port_name, callback, feed.clone()) {
                    Ok(conn) => *self = Self::Connected(conn),
                    Err(err) => {
                        *self = Self::Disconnected((err.into_inner(), feed));
                        let err = Error::Connection(port_name);
                        log::error!("{err}");
                        return Err(err);
                    }
                }
            }
            _ => return Err(Error::PortConnection),
        }

        Ok(())
    }

    pub fn disconnect(&mut self) {
        if self.is_connected() {
            if let Self::Connected(conn) = std::mem::take(self) {
                let (io, feed) = conn.close();
                *self = Self::Disconnected((io, feed));
            }
        }
    }
}

impl MidiOut {
    pub fn try_new(client_name: &str) -> Result<Self, Error> {
        Ok(Self::Disconnected((midir::MidiOutput::new(client_name)?, ())))
    }

    pub fn connect(
        &mut self,
        port_name: Arc<str>,
        port: &midir::MidiOutputPort,
        client_port_name: &str,
    ) -> Result<(), Error> {
        self.disconnect();
        match std::mem::take(self) {
            Self::Disconnected((midi_output, ())) => {
                match midi_output.connect(port, client_port_name) {
                    Ok(conn) => *self = Self::Connected(conn),
                    Err(err) => {
                        *self = Self::Disconnected((err.into_inner(), ()));
                        let err = Error::Connection(port_name);
                        log::error!("{err}");
                        return Err(err);
                    }
                }
            }
            _ => return Err(Error::PortConnection),
        }

        Ok(())
    }

    pub fn send(&mut self, msg: &Msg) -> Result<(), Error> {
        match self {
            Self::Connected(conn) => {
                conn.send(msg).inspect_err(|err| {
                    log::error!("Failed to send MIDI msg {}: {err}", msg.display());
                })?;
            }
            _ => {
                log::warn!("Dropping {}: MIDI Out is not connected", msg.display());
                return Err(Error::NotConnected);
            }
        }

        Ok(())
    }

    pub fn disconnect(&mut self) {
        if self.is_connected() {
            if let Self::Connected(conn) = std::mem::take(self) {
                *self = Self::Disconnected((conn.close(), ()));
            }
        }
    }
}
