use crossbeam_channel as channel;
use std::{collections::BTreeMap, fmt, sync::Arc};

use super::{io, Error, Msg};

pub type PortsIn = DirectionalPorts<midir::MidiInput, io::MidiIn>;
pub type PortsOut = DirectionalPorts<midir::MidiOutput, io::MidiOut>;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Direction {
    In,
    Out,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::In => "In Port",
            Direction::Out => "Out Port",
        })
    }
}

pub struct DirectionalPorts<IO: midir::MidiIO, Conn> {
    map: BTreeMap<Arc<str>, IO::Port>,
    cur: Option<Arc<str>>,
    midi_conn: Conn,
    client_name: Arc<str>,
}

impl<IO: midir::MidiIO, Conn> DirectionalPorts<IO, Conn> {
    pub fn list(&self) -> impl Iterator<Item = Arc<str>> + '_ {
        self.map.keys().cloned()
    }

    pub fn cur(&self) -> Option<Arc<str>> {
        self.cur.as_ref().cloned()
    }

    /// Finds the first port which name starts with `hint`.
    ///
    /// Backends usually decorate the device name, e.g.
    /// `OP-1 Midi Device:OP-1 Midi Device MIDI 1 20:0`.
    pub fn find(&self, hint: &str) -> Option<Arc<str>> {
        if let Some((name, _)) = self.map.get_key_value(hint) {
            return Some(name.clone());
        }

        self.map
            .keys()
            .find(|name| name.starts_with(hint))
            .cloned()
    }

    fn refresh_from(&mut self, conn: IO) -> Result<(), Error> {
        self.map.clear();

        for port in conn.ports().iter() {
            let name = conn.port_name(port)?;
            // Skip our own ports
            if !name.starts_with(self.client_name.as_ref()) {
                self.map.insert(name.into(), port.clone());
            }
        }

        if let Some(cur) = self.cur.as_ref() {
            if !self.map.contains_key(cur) {
                log::warn!("Port {cur} vanished");
                self.cur = None;
            }
        }

        Ok(())
    }

    fn port(&self, port_name: &Arc<str>) -> Result<IO::Port, Error> {
        self.map
            .get(port_name)
            .cloned()
            .ok_or_else(|| Error::PortNotFound(port_name.clone()))
    }
}

impl PortsIn {
    pub fn try_new(client_name: Arc<str>, msg_tx: channel::Sender<Msg>) -> Result<Self, Error> {
        Ok(Self {
            map: BTreeMap::new(),
            cur: None,
            midi_conn: io::MidiIn::try_new(&client_name, msg_tx)?,
            client_name,
        })
    }

    pub fn is_connected(&self) -> bool {
        self.midi_conn.is_connected()
    }

    pub fn refresh(&mut self) -> Result<(), Error> {
        let temp_conn = midir::MidiInput::new(&format!("{} refresh In ports", self.client_name))?;

        self.refresh_from(temp_conn)
    }

    pub fn connect(&mut self, port_name: Arc<str>) -> Result<(), Error> {
        let port = self.port(&port_name)?;

        self.midi_conn
            .connect(port_name.clone(), &port, &self.client_name)
            .map_err(|_| {
                self.cur = None;
                Error::PortConnection
            })?;

        log::info!("Connected for {} to {port_name}", Direction::In);
        self.cur = Some(port_name);

        Ok(())
    }

    pub fn disconnect(&mut self) {
        self.midi_conn.disconnect();

        if let Some(cur) = self.cur.take() {
            log::debug!("Disconnected {} from {cur}", Direction::In);
        }
    }
}

impl PortsOut {
    pub fn try_new(client_name: Arc<str>) -> Result<Self, Error> {
        Ok(Self {
            map: BTreeMap::new(),
            cur: None,
            midi_conn: io::MidiOut::try_new(&client_name)?,
            client_name,
        })
    }

    pub fn is_connected(&self) -> bool {
        self.midi_conn.is_connected()
    }

    pub fn refresh(&mut self) -> Result<(), Error> {
        let temp_conn = midir::MidiOutput::new(&format!("{} refresh Out ports", self.client_name))?;

        self.refresh_from(temp_conn)
    }

    pub fn connect(&mut self, port_name: Arc<str>) -> Result<(), Error> {
        let port = self.port(&port_name)?;

        self.midi_conn
            .connect(port_name.clone(), &port, &self.client_name)
            .map_err(|_| {
                self.cur = None;
                Error::PortConnection
            })?;

        log::info!("Connected for {} to {port_name}", Direction::Out);
        self.cur = Some(port_name);

        Ok(())
    }

    pub fn send(&mut self, msg: &Msg) -> Result<(), Error> {
        self.midi_conn.send(msg)
    }

    pub fn disconnect(&mut self) {
        self.midi_conn.disconnect();

        if let Some(cur) = self.cur.take() {
            log::debug!("Disconnected {} from {cur}", Direction::Out);
        }
    }
}

/// Connects the device in & out ports matching the given names.
pub struct InOutManager {
    pub ins: PortsIn,
    pub outs: PortsOut,
}

impl InOutManager {
    pub fn try_new(client_name: Arc<str>, msg_tx: channel::Sender<Msg>) -> Result<Self, Error> {
        let ins = PortsIn::try_new(client_name.clone(), msg_tx)?;
        let outs = PortsOut::try_new(client_name)?;

        Ok(Self { ins, outs })
    }

    pub fn refresh(&mut self) -> Result<(), Error> {
        self.ins.refresh()?;
        self.outs.refresh()?;

        Ok(())
    }

    pub fn connect(&mut self, direction: Direction, hint: &str) -> Result<(), Error> {
        use Direction::*;
        match direction {
            In => {
                let name = self
                    .ins
                    .find(hint)
                    .ok_or_else(|| Error::PortNotFound(hint.into()))?;
                self.ins.connect(name)
            }
            Out => {
                let name = self
                    .outs
                    .find(hint)
                    .ok_or_else(|| Error::PortNotFound(hint.into()))?;
                self.outs.connect(name)
            }
        }
    }

    pub fn are_connected(&self) -> bool {
        self.ins.is_connected() && self.outs.is_connected()
    }

    pub fn send(&mut self, msg: &Msg) -> Result<(), Error> {
        self.outs.send(msg)
    }

    pub fn disconnect(&mut self) {
        self.ins.disconnect();
        self.outs.disconnect();
    }
}
